//! Local preview sink.

use crate::error::Result;
use crate::profile::{MediaProfile, Resolution};
use crate::source::{CaptureHandle, MediaSource};

/// Renderable sink for the local stream.
///
/// Owns at most one capture. Showing a different capture stops the tracks
/// of the previous one first, so a device is never held twice.
#[derive(Debug, Default)]
pub struct Preview {
    current: Option<CaptureHandle>,
}

impl Preview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, handle: CaptureHandle) {
        if let Some(previous) = self.current.take() {
            if !previous.same_as(&handle) {
                previous.stop();
            }
        }
        self.current = Some(handle);
    }

    /// Stops the current stream, acquires one for `profile` and shows it.
    ///
    /// The old stream is released before the new one is requested. On
    /// error the preview is left empty.
    pub fn switch_profile(
        &mut self,
        source: &mut MediaSource,
        profile: &MediaProfile,
    ) -> Result<CaptureHandle> {
        self.clear();
        let handle = source.acquire(profile)?;
        self.current = Some(handle.clone());
        Ok(handle)
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.stop();
        }
    }

    pub fn current(&self) -> Option<&CaptureHandle> {
        self.current.as_ref()
    }

    /// Size of the video currently shown.
    pub fn dimensions(&self) -> Option<Resolution> {
        self.current.as_ref().and_then(CaptureHandle::resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Permission, VirtualBackend};
    use logging::Logger;

    fn source() -> MediaSource {
        MediaSource::new(Box::new(VirtualBackend::default()), Logger::disabled())
    }

    #[test]
    fn test_show_stops_previous_stream() {
        let mut source = source();
        let mut preview = Preview::new();

        let first = source.acquire(&MediaProfile::LOW).unwrap();
        preview.show(first.clone());
        let second = source.acquire(&MediaProfile::STANDARD).unwrap();
        preview.show(second.clone());

        assert!(!first.is_live());
        assert!(second.is_live());
        assert_eq!(preview.dimensions(), Some(Resolution::new(640, 480)));
    }

    #[test]
    fn test_show_same_handle_keeps_it_live() {
        let mut source = source();
        let mut preview = Preview::new();
        let handle = source.acquire(&MediaProfile::LOW).unwrap();

        preview.show(handle.clone());
        preview.show(handle.clone());
        assert!(handle.is_live());
    }

    #[test]
    fn test_switch_profile_releases_before_acquiring() {
        let mut source = source();
        let mut preview = Preview::new();

        let low = preview.switch_profile(&mut source, &MediaProfile::LOW).unwrap();
        let high = preview.switch_profile(&mut source, &MediaProfile::HIGH).unwrap();

        assert!(!low.is_live());
        assert!(high.is_live());
        assert_eq!(preview.dimensions(), Some(Resolution::new(1280, 960)));
    }

    #[test]
    fn test_switch_profile_failure_leaves_preview_empty() {
        let mut denied = MediaSource::new(
            Box::new(VirtualBackend::default().with_permission(Permission::Denied)),
            Logger::disabled(),
        );
        let mut preview = Preview::new();
        let shown = source().acquire(&MediaProfile::LOW).unwrap();
        preview.show(shown.clone());

        assert!(preview.switch_profile(&mut denied, &MediaProfile::LOW).is_err());
        assert!(preview.current().is_none());
        assert!(!shown.is_live());
    }

    #[test]
    fn test_clear_stops_stream() {
        let mut source = source();
        let mut preview = Preview::new();
        let handle = source.acquire(&MediaProfile::LOW).unwrap();
        preview.show(handle.clone());

        preview.clear();
        assert!(!handle.is_live());
        assert!(preview.dimensions().is_none());
    }
}
