//! Signaling state of a session endpoint.

use serde::Serialize;
use std::fmt;

/// ```text
/// Idle -> Offering -> AwaitingAnswer -> Connected
/// Idle -> Answering -> Connected
/// any  -> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalingState {
    #[default]
    Idle,
    /// Local offer being built and applied
    Offering,
    AwaitingAnswer,
    /// Remote offer applied, local answer not yet
    Answering,
    Connected,
    Closed,
}

impl SignalingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalingState::Idle => "idle",
            SignalingState::Offering => "offering",
            SignalingState::AwaitingAnswer => "awaiting_answer",
            SignalingState::Answering => "answering",
            SignalingState::Connected => "connected",
            SignalingState::Closed => "closed",
        }
    }

    pub fn is_closed(&self) -> bool {
        *self == SignalingState::Closed
    }

    /// Local media and data channels may still be attached.
    pub fn accepts_local_setup(&self) -> bool {
        matches!(self, SignalingState::Idle | SignalingState::Offering)
    }
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_setup_states() {
        assert!(SignalingState::Idle.accepts_local_setup());
        assert!(SignalingState::Offering.accepts_local_setup());
        assert!(!SignalingState::AwaitingAnswer.accepts_local_setup());
        assert!(!SignalingState::Closed.accepts_local_setup());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&SignalingState::AwaitingAnswer).unwrap();
        assert_eq!(json, "\"awaiting_answer\"");
    }
}
