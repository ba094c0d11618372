//! Negotiation messages as they travel over signaling.

use sdp::{SdpError, SdpType, SessionDescription};
use serde::{Deserialize, Serialize};

/// `{"type": "offer" | "answer", "sdp": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl RtcSessionDescription {
    pub fn new(sdp_type: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            sdp_type,
            sdp: sdp.into(),
        }
    }

    pub fn offer(sdp: impl Into<String>) -> Self {
        Self::new(SdpType::Offer, sdp)
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::new(SdpType::Answer, sdp)
    }

    pub fn parse(&self) -> Result<SessionDescription, SdpError> {
        SessionDescription::parse(self.sdp_type, &self.sdp)
    }
}

impl From<&SessionDescription> for RtcSessionDescription {
    fn from(session: &SessionDescription) -> Self {
        Self::new(session.sdp_type, session.to_string())
    }
}

/// A trickled candidate: `{"candidate": "...", "sdpMid": "0", "sdpMLineIndex": 0}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IceCandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidateInit {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }

    pub fn with_mid(mut self, mid: impl Into<String>, index: u16) -> Self {
        self.sdp_mid = Some(mid.into());
        self.sdp_m_line_index = Some(index);
        self
    }
}
