//! Error types for media operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediaError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Capture cannot satisfy the request: permission denied, no suitable
    /// device, or a device failed to open.
    #[error("media unavailable: {0}")]
    Unavailable(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("track ended: {0}")]
    TrackEnded(String),
}
