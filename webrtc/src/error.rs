//! Errors surfaced by session endpoints and the signaling relay.

use crate::state::SignalingState;
use media::MediaError;
use network::NetworkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RtcError>;

#[derive(Debug, Error)]
pub enum RtcError {
    /// No capture device matched, or permission was denied.
    #[error("media unavailable: {0}")]
    MediaUnavailable(String),

    /// A negotiation step failed; the round was aborted.
    #[error("signaling failure: {0}")]
    SignalingFailure(String),

    #[error("data channel '{0}' is not open")]
    ChannelNotOpen(String),

    #[error("unknown data channel {0}")]
    UnknownChannel(u16),

    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: SignalingState,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("signaling message codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<MediaError> for RtcError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Unavailable(reason) => RtcError::MediaUnavailable(reason),
            other => RtcError::MediaUnavailable(other.to_string()),
        }
    }
}

impl From<NetworkError> for RtcError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::ChannelNotOpen(label) => RtcError::ChannelNotOpen(label),
            NetworkError::UnknownChannel(id) => RtcError::UnknownChannel(id),
            NetworkError::InvalidFrame(reason) => RtcError::SignalingFailure(reason),
            err @ NetworkError::FieldTooLong { .. } => RtcError::Configuration(err.to_string()),
        }
    }
}

impl From<sdp::SdpError> for RtcError {
    fn from(err: sdp::SdpError) -> Self {
        RtcError::SignalingFailure(format!("invalid session description: {}", err))
    }
}

impl From<ice::IceError> for RtcError {
    fn from(err: ice::IceError) -> Self {
        RtcError::SignalingFailure(format!("ICE: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_maps_to_unavailable() {
        let err: RtcError = MediaError::Unavailable("permission denied".to_string()).into();
        assert!(matches!(err, RtcError::MediaUnavailable(ref r) if r == "permission denied"));
    }

    #[test]
    fn test_network_error_mapping() {
        let err: RtcError = NetworkError::ChannelNotOpen("chat".to_string()).into();
        assert_eq!(err.to_string(), "data channel 'chat' is not open");

        let err: RtcError = NetworkError::UnknownChannel(3).into();
        assert!(matches!(err, RtcError::UnknownChannel(3)));
    }

    #[test]
    fn test_invalid_state_message() {
        let err = RtcError::InvalidState {
            operation: "create_offer",
            state: SignalingState::Connected,
        };
        assert_eq!(err.to_string(), "create_offer is not valid in state connected");
    }
}
