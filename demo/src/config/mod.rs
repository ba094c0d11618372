//! Demo configuration

pub mod demo_config;
pub mod logging_config;
pub mod media_config;
pub mod signaling_config;

pub use demo_config::{CONFIG_FILE_NAME, DemoConfig};
pub use logging_config::LoggingConfig;
pub use media_config::{CameraConfig, MediaConfig};
pub use signaling_config::SignalingConfig;
