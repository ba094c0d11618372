use serde::Deserialize;

/// Signaling configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignalingConfig {
    /// Pass every message through its JSON form
    pub encode_json: bool,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        SignalingConfig { encode_json: true }
    }
}
