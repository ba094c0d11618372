use media::{Permission, Preset, VirtualBackend};
use serde::Deserialize;

/// One virtual camera
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraConfig {
    pub label: String,
    pub max_width: u32,
    pub max_height: u32,
}

/// Media configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Profile used by `start` until `preset` picks another one
    pub preset: Preset,
    pub permission_granted: bool,
    pub cameras: Vec<CameraConfig>,
    pub microphones: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            preset: Preset::CallDefault,
            permission_granted: true,
            cameras: vec![CameraConfig {
                label: "Virtual Camera".to_string(),
                max_width: 1920,
                max_height: 1080,
            }],
            microphones: vec!["Virtual Microphone".to_string()],
        }
    }
}

impl MediaConfig {
    /// Capture backend with the configured devices.
    pub fn backend(&self) -> VirtualBackend {
        let permission = if self.permission_granted {
            Permission::Granted
        } else {
            Permission::Denied
        };

        let backend = self
            .cameras
            .iter()
            .fold(VirtualBackend::new(), |backend, camera| {
                backend.with_camera(&camera.label, camera.max_width, camera.max_height)
            });
        self.microphones
            .iter()
            .fold(backend, |backend, label| backend.with_microphone(label))
            .with_permission(permission)
    }
}
