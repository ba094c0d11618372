//! ICE candidate representation and parsing.

use crate::{candidate_type::CandidateType, errors::IceError};
use std::net::{IpAddr, SocketAddr};

/// An ICE candidate (RFC 5245 §15.1).
///
/// ```text
/// candidate:<foundation> <component-id> <transport> <priority> <address> <port> typ <type> [raddr <addr>] [rport <port>]
/// ```
///
/// The transport is stored upper-cased; `udp` and `UDP` are the same
/// candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub foundation: String,
    pub component_id: u32,
    pub transport: String,
    pub priority: u32,
    pub address: IpAddr,
    pub port: u16,
    pub candidate_type: CandidateType,
    pub related_address: Option<IpAddr>,
    pub related_port: Option<u16>,
}

impl Candidate {
    /// Parses a candidate line, with or without the leading `candidate:`
    /// (and `a=candidate:`) prefix.
    pub fn parse(value: &str) -> Result<Self, IceError> {
        let value = value.trim();
        let value = value.strip_prefix("a=").unwrap_or(value);
        let value = value.strip_prefix("candidate:").unwrap_or(value);

        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() < 8 {
            return Err(IceError::InvalidCandidateFormat);
        }

        let component_id: u32 = parts[1].parse().map_err(|_| IceError::InvalidComponentId)?;
        let priority: u32 = parts[3].parse().map_err(|_| IceError::InvalidPriority)?;
        let address: IpAddr = parts[4].parse().map_err(|_| IceError::InvalidIpAddress)?;
        let port: u16 = parts[5].parse().map_err(|_| IceError::InvalidPort)?;

        if parts[6] != "typ" {
            return Err(IceError::InvalidCandidateFormat);
        }
        let candidate_type = CandidateType::parse(parts[7])?;

        let mut related_address = None;
        let mut related_port = None;
        let mut rest = parts[8..].iter();
        while let Some(key) = rest.next() {
            match (*key, rest.next()) {
                ("raddr", Some(v)) => {
                    related_address = Some(v.parse().map_err(|_| IceError::InvalidIpAddress)?);
                }
                ("rport", Some(v)) => {
                    related_port = Some(v.parse().map_err(|_| IceError::InvalidPort)?);
                }
                // generation, ufrag, network-id ... are ignored
                _ => {}
            }
        }

        let candidate = Candidate {
            foundation: parts[0].to_string(),
            component_id,
            transport: parts[2].to_ascii_uppercase(),
            priority,
            address,
            port,
            candidate_type,
            related_address,
            related_port,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    pub fn validate(&self) -> Result<(), IceError> {
        if self.foundation.is_empty() {
            return Err(IceError::InvalidFoundation);
        }
        if self.component_id != 1 && self.component_id != 2 {
            return Err(IceError::InvalidComponentId);
        }
        if self.transport != "UDP" && self.transport != "TCP" {
            return Err(IceError::InvalidTransportProtocol);
        }
        if self.port == 0 {
            return Err(IceError::InvalidPort);
        }
        Ok(())
    }

    /// priority = 2^24 * type_pref + 2^8 * local_pref + (256 - component)
    pub fn calculate_priority(type_pref: u32, local_pref: u32, component_id: u32) -> u32 {
        (type_pref << 24) + (local_pref << 8) + (256 - component_id)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Two candidates describing the same transport address for the same
    /// component are the same candidate, whatever their foundation or
    /// priority say.
    pub fn same_transport_address(&self, other: &Candidate) -> bool {
        self.component_id == other.component_id
            && self.transport == other.transport
            && self.socket_addr() == other.socket_addr()
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component_id,
            self.transport,
            self.priority,
            self.address,
            self.port,
            self.candidate_type
        )?;

        if let Some(raddr) = self.related_address {
            write!(f, " raddr {}", raddr)?;
        }
        if let Some(rport) = self.related_port {
            write!(f, " rport {}", rport)?;
        }

        Ok(())
    }
}
