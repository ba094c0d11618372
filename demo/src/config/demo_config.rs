use crate::config::{LoggingConfig, MediaConfig, SignalingConfig};
use config_loader::ConfigError;
use rtcpeer::EndpointConfig;
use serde::Deserialize;
use std::path::Path;

/// File looked up by [`config_loader::find_config_file`] when no path is given.
pub const CONFIG_FILE_NAME: &str = "loopback.json";

/// Loopback demo configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub logging: LoggingConfig,
    pub media: MediaConfig,
    pub endpoint: EndpointConfig,
    pub signaling: SignalingConfig,
}

impl DemoConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        config_loader::load_json_file(path)
    }

    /// Parse configuration held in a string, e.g. the `CONFIG` variable
    pub fn from_json_str(source_name: &str, json: &str) -> Result<Self, ConfigError> {
        config_loader::parse_json(source_name, json)
    }
}
