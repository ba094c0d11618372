//! Error types for ICE operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IceError {
    #[error("invalid candidate format")]
    InvalidCandidateFormat,
    #[error("invalid candidate type: {0}")]
    InvalidCandidateType(String),
    #[error("invalid transport protocol")]
    InvalidTransportProtocol,
    #[error("invalid priority value")]
    InvalidPriority,
    #[error("invalid port number")]
    InvalidPort,
    #[error("invalid IP address")]
    InvalidIpAddress,
    #[error("invalid foundation")]
    InvalidFoundation,
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("invalid component ID (must be 1 or 2)")]
    InvalidComponentId,
    #[error("configuration error: {0}")]
    Configuration(String),
}
