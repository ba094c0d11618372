//! ICE candidate types.

use crate::errors::IceError;

/// Candidate type as carried after `typ` in a candidate line.
///
/// Only host candidates are gathered locally; the other kinds are still
/// accepted from the peer and ranked by their type preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CandidateType {
    #[default]
    Host,
    /// Server reflexive
    Srflx,
    Relay,
    /// Peer reflexive
    Prflx,
}

impl CandidateType {
    pub fn parse(s: &str) -> Result<Self, IceError> {
        match s {
            "host" => Ok(CandidateType::Host),
            "srflx" => Ok(CandidateType::Srflx),
            "relay" => Ok(CandidateType::Relay),
            "prflx" => Ok(CandidateType::Prflx),
            _ => Err(IceError::InvalidCandidateType(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateType::Host => "host",
            CandidateType::Srflx => "srflx",
            CandidateType::Relay => "relay",
            CandidateType::Prflx => "prflx",
        }
    }

    /// RFC 5245 §4.1.2.2 recommended type preference.
    pub fn preference(&self) -> u32 {
        match self {
            CandidateType::Host => 126,
            CandidateType::Prflx => 110,
            CandidateType::Srflx => 100,
            CandidateType::Relay => 0,
        }
    }
}

impl std::fmt::Display for CandidateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
