//! Network error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Send attempted on a channel that is not open; carries the label.
    #[error("data channel '{0}' is not open")]
    ChannelNotOpen(String),
    #[error("unknown data channel {0}")]
    UnknownChannel(u16),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// A length-prefixed field does not fit its 16-bit length.
    #[error("{field} is {len} bytes, at most 65535 can be framed")]
    FieldTooLong { field: &'static str, len: usize },
}
