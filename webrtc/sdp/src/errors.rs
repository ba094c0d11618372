//! Error types for SDP parsing and validation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdpError {
    #[error("line must be in format 'type=value'")]
    InvalidLineFormat,
    #[error("failed to parse version")]
    InvalidVersion,
    #[error("SDP version must be 0")]
    InvalidVersionNumber,
    #[error("session name cannot be empty")]
    EmptySessionName,
    #[error("SDP must contain at least one media description")]
    NoMediaSections,
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),
    #[error("media description must have at least one format")]
    NoMediaFormats,
    #[error("network type must be IN")]
    InvalidNetworkType,
    #[error("address type must be IP4 or IP6")]
    InvalidAddressType,
    #[error("session ID cannot be 0")]
    InvalidSessionId,
    #[error("stop time must be greater than or equal to start time")]
    InvalidTiming,
    #[error("invalid origin format")]
    InvalidOriginFormat,
    #[error("invalid timing format")]
    InvalidTimingFormat,
    #[error("invalid media description format")]
    InvalidMediaFormat,
    #[error("invalid port number")]
    InvalidPort,
    #[error("invalid SDP type: {0}")]
    InvalidSdpType(String),
    #[error("duplicate media id: {0}")]
    DuplicateMid(String),
}
