//! Hardware-free capture backend.

use super::{CaptureBackend, Permission};
use crate::device::{DeviceInfo, DeviceKind};
use crate::error::{MediaError, Result};
use crate::profile::Resolution;
use crate::track::{MediaTrack, TrackKind};
use std::cell::RefCell;
use std::rc::Rc;

/// Every track a [`VirtualBackend`] has handed out, in order. Clones of the
/// tracks share liveness with the originals.
pub type IssuedTracks = Rc<RefCell<Vec<MediaTrack>>>;

/// Backend with configurable virtual cameras and microphones.
///
/// ```
/// use media::{CaptureBackend, Permission, VirtualBackend};
///
/// let backend = VirtualBackend::new()
///     .with_camera("Desk camera", 1280, 720)
///     .with_microphone("Headset");
/// assert_eq!(backend.devices().len(), 2);
/// assert_eq!(backend.permission(), Permission::Granted);
/// ```
#[derive(Debug, Clone)]
pub struct VirtualBackend {
    devices: Vec<DeviceInfo>,
    permission: Permission,
    failing: Vec<String>,
    next_track: u64,
    issued: IssuedTracks,
}

impl Default for VirtualBackend {
    /// One 1920x1080 camera and one microphone.
    fn default() -> Self {
        Self::new()
            .with_camera("Virtual Camera", 1920, 1080)
            .with_microphone("Virtual Microphone")
    }
}

impl VirtualBackend {
    /// Backend with no devices and permission granted.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            permission: Permission::Granted,
            failing: Vec::new(),
            next_track: 0,
            issued: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_camera(mut self, label: &str, max_width: u32, max_height: u32) -> Self {
        let id = format!("camera-{}", self.count(DeviceKind::Camera));
        self.devices.push(DeviceInfo::camera(
            id,
            label,
            Resolution::new(max_width, max_height),
        ));
        self
    }

    pub fn with_microphone(mut self, label: &str) -> Self {
        let id = format!("microphone-{}", self.count(DeviceKind::Microphone));
        self.devices.push(DeviceInfo::microphone(id, label));
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Makes `open_track` fail for the device labelled `label`.
    pub fn with_failing_device(mut self, label: &str) -> Self {
        self.failing.push(label.to_string());
        self
    }

    /// Shared view of the tracks opened so far.
    pub fn issued_tracks(&self) -> IssuedTracks {
        Rc::clone(&self.issued)
    }

    fn count(&self, kind: DeviceKind) -> usize {
        self.devices.iter().filter(|d| d.kind == kind).count()
    }
}

impl CaptureBackend for VirtualBackend {
    fn name(&self) -> &str {
        "virtual"
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }

    fn open_track(
        &mut self,
        device: &DeviceInfo,
        resolution: Option<Resolution>,
    ) -> Result<MediaTrack> {
        if !self.devices.iter().any(|d| d.id == device.id) {
            return Err(MediaError::DeviceNotFound(device.label.clone()));
        }
        if self.failing.contains(&device.label) {
            return Err(MediaError::Unavailable(format!(
                "could not start {} '{}'",
                device.kind, device.label
            )));
        }

        let kind = match device.kind {
            DeviceKind::Camera => TrackKind::Video,
            DeviceKind::Microphone => TrackKind::Audio,
        };
        self.next_track += 1;
        let track = MediaTrack::new(
            format!("{}-track-{}", kind, self.next_track),
            kind,
            device.label.clone(),
            resolution,
        );
        self.issued.borrow_mut().push(track.clone());
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_camera_and_microphone() {
        let backend = VirtualBackend::default();
        let kinds: Vec<DeviceKind> = backend.devices().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DeviceKind::Camera, DeviceKind::Microphone]);
    }

    #[test]
    fn test_open_track_records_issued() {
        let mut backend = VirtualBackend::new().with_camera("cam", 640, 480);
        let issued = backend.issued_tracks();
        let device = backend.devices().remove(0);

        let track = backend
            .open_track(&device, Some(Resolution::new(640, 480)))
            .unwrap();
        assert_eq!(track.kind(), TrackKind::Video);
        assert_eq!(issued.borrow().len(), 1);

        track.stop();
        assert!(!issued.borrow()[0].is_live());
    }

    #[test]
    fn test_open_track_failures() {
        let mut backend = VirtualBackend::new()
            .with_camera("broken", 640, 480)
            .with_failing_device("broken");
        let device = backend.devices().remove(0);
        assert!(matches!(
            backend.open_track(&device, None),
            Err(MediaError::Unavailable(_))
        ));

        let stranger = DeviceInfo::microphone("elsewhere", "ghost");
        assert_eq!(
            backend.open_track(&stranger, None).unwrap_err(),
            MediaError::DeviceNotFound("ghost".to_string())
        );
    }
}
