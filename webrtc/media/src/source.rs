//! Media acquisition.

use crate::backend::{CaptureBackend, Permission};
use crate::device::DeviceKind;
use crate::error::{MediaError, Result};
use crate::profile::{MediaProfile, Resolution};
use crate::track::{MediaTrack, TrackKind};
use logging::Logger;
use std::rc::Rc;

/// Resolution aimed for when a profile has no ideal.
const DEFAULT_TARGET: Resolution = Resolution::new(640, 480);

/// A captured stream: one video track and, if requested, one audio track.
///
/// Cheap to clone. The tracks are stopped when the last clone is dropped,
/// or earlier through [`CaptureHandle::stop`].
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    inner: Rc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: String,
    tracks: Vec<MediaTrack>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

impl CaptureHandle {
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                id: id.into(),
                tracks,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.inner.tracks
    }

    pub fn video_track(&self) -> Option<&MediaTrack> {
        self.track_of(TrackKind::Video)
    }

    pub fn audio_track(&self) -> Option<&MediaTrack> {
        self.track_of(TrackKind::Audio)
    }

    fn track_of(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.inner.tracks.iter().find(|t| t.kind() == kind)
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.video_track().and_then(MediaTrack::resolution)
    }

    /// True while every track is live.
    pub fn is_live(&self) -> bool {
        !self.inner.tracks.is_empty() && self.inner.tracks.iter().all(MediaTrack::is_live)
    }

    /// Stops every track for every holder of this handle.
    pub fn stop(&self) {
        for track in &self.inner.tracks {
            track.stop();
        }
    }

    /// Both handles refer to the same capture.
    pub fn same_as(&self, other: &CaptureHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Turns profiles into capture handles through a backend.
pub struct MediaSource {
    backend: Box<dyn CaptureBackend>,
    logger: Logger,
    next_handle: u64,
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("backend", &self.backend.name())
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

impl MediaSource {
    pub fn new(backend: Box<dyn CaptureBackend>, logger: Logger) -> Self {
        Self {
            backend,
            logger,
            next_handle: 0,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Captures a stream satisfying `profile`.
    ///
    /// The video resolution is the profile's ideal (or 640x480 without
    /// one) clamped to what the camera can do, and never below the minimum.
    /// Either every track is open when this returns, or none is.
    ///
    /// # Errors
    /// `MediaError::Config` for an invalid profile; `MediaError::Unavailable`
    /// when permission is denied, no camera reaches the minimum, audio is
    /// requested without a microphone, or a device fails to open.
    pub fn acquire(&mut self, profile: &MediaProfile) -> Result<CaptureHandle> {
        profile.validate()?;
        self.logger
            .info(&format!("Requesting local stream ({})", profile));

        if self.backend.permission() == Permission::Denied {
            self.logger.warn("Capture permission denied");
            return Err(MediaError::Unavailable("permission denied".to_string()));
        }

        let devices = self.backend.devices();
        let camera = devices
            .iter()
            .find(|d| d.kind == DeviceKind::Camera && d.supports(profile.min()))
            .ok_or_else(|| {
                MediaError::Unavailable(format!("no camera supports {}", profile.min()))
            })?;
        let microphone = if profile.audio() {
            let mic = devices
                .iter()
                .find(|d| d.kind == DeviceKind::Microphone)
                .ok_or_else(|| MediaError::Unavailable("no microphone available".to_string()))?;
            Some(mic)
        } else {
            None
        };

        let target = Self::choose_resolution(profile, camera.max_resolution);
        let mut requests = vec![(camera, Some(target))];
        if let Some(mic) = microphone {
            requests.push((mic, None));
        }

        let mut tracks = Vec::with_capacity(requests.len());
        for (device, resolution) in requests {
            match self.backend.open_track(device, resolution) {
                Ok(track) => tracks.push(track),
                Err(err) => {
                    for track in &tracks {
                        track.stop();
                    }
                    self.logger.warn(&format!(
                        "Capture failed, released {} track(s): {}",
                        tracks.len(),
                        err
                    ));
                    return Err(match err {
                        MediaError::Unavailable(_) => err,
                        other => MediaError::Unavailable(other.to_string()),
                    });
                }
            }
        }

        self.next_handle += 1;
        let handle = CaptureHandle::new(
            format!("{}-stream-{}", self.backend.name(), self.next_handle),
            tracks,
        );
        self.logger.info(&format!(
            "Received local stream {} at {}",
            handle.id(),
            target
        ));
        Ok(handle)
    }

    fn choose_resolution(profile: &MediaProfile, max: Option<Resolution>) -> Resolution {
        let ideal = profile.ideal().unwrap_or(DEFAULT_TARGET);
        let min = profile.min();
        let max = max.unwrap_or(ideal);
        Resolution::new(
            ideal.width.min(max.width).max(min.width),
            ideal.height.min(max.height).max(min.height),
        )
    }
}
