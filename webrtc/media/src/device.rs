//! Capture device descriptions.

use crate::profile::Resolution;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Camera => write!(f, "camera"),
            DeviceKind::Microphone => write!(f, "microphone"),
        }
    }
}

/// A device a backend can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub kind: DeviceKind,
    pub label: String,
    /// Largest frame a camera can produce. `None` for microphones.
    pub max_resolution: Option<Resolution>,
}

impl DeviceInfo {
    pub fn camera(id: impl Into<String>, label: impl Into<String>, max: Resolution) -> Self {
        Self {
            id: id.into(),
            kind: DeviceKind::Camera,
            label: label.into(),
            max_resolution: Some(max),
        }
    }

    pub fn microphone(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: DeviceKind::Microphone,
            label: label.into(),
            max_resolution: None,
        }
    }

    /// Whether this camera can deliver at least `min` in both dimensions.
    pub fn supports(&self, min: Resolution) -> bool {
        self.max_resolution
            .is_some_and(|max| max.width >= min.width && max.height >= min.height)
    }
}
