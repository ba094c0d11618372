//! Capture backends.
//!
//! A backend is the only thing that knows how to reach capture devices.
//! It is chosen once at startup and handed to [`MediaSource`](crate::MediaSource).

mod virtual_backend;

pub use virtual_backend::{IssuedTracks, VirtualBackend};

use crate::device::DeviceInfo;
use crate::error::Result;
use crate::profile::Resolution;
use crate::track::MediaTrack;

/// Outcome of asking the user for capture permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait CaptureBackend {
    /// Human-readable backend name, used in logs and handle ids.
    fn name(&self) -> &str;

    fn permission(&self) -> Permission;

    /// Devices currently present.
    fn devices(&self) -> Vec<DeviceInfo>;

    /// Opens `device`. `resolution` is set for cameras and `None` for
    /// microphones.
    ///
    /// # Errors
    /// `MediaError::DeviceNotFound` if the device vanished, or
    /// `MediaError::Unavailable` if it cannot be opened.
    fn open_track(&mut self, device: &DeviceInfo, resolution: Option<Resolution>)
    -> Result<MediaTrack>;
}
