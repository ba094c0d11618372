use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating, reading or decoding a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read configuration file: {0}")]
    ReadError(String),

    #[error("invalid configuration in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },
}
