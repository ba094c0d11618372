use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
    pub enable_file: bool,
    /// Prefix lines with seconds since start instead of wall-clock time
    pub elapsed_stamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "loopback-demo.log".to_string(),
            log_level: "info".to_string(),
            enable_console: true,
            enable_file: false,
            elapsed_stamps: true,
        }
    }
}
