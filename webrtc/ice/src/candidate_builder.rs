//! Builder for ICE candidates.

use crate::{candidate::Candidate, candidate_type::CandidateType, errors::IceError};
use std::net::IpAddr;

const DEFAULT_LOCAL_PREFERENCE: u32 = 65535;

/// Fluent constructor for local UDP [`Candidate`]s. The priority is derived
/// from the type and local preference.
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    foundation: Option<String>,
    component_id: u32,
    local_preference: u32,
    address: Option<IpAddr>,
    port: Option<u16>,
    candidate_type: CandidateType,
}

impl Default for CandidateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateBuilder {
    pub fn new() -> Self {
        Self {
            foundation: None,
            component_id: 1,
            local_preference: DEFAULT_LOCAL_PREFERENCE,
            address: None,
            port: None,
            candidate_type: CandidateType::Host,
        }
    }

    pub fn foundation(mut self, foundation: impl Into<String>) -> Self {
        self.foundation = Some(foundation.into());
        self
    }

    pub fn component_id(mut self, component_id: u32) -> Self {
        self.component_id = component_id;
        self
    }

    /// Ranks candidates of the same type against each other (0..=65535).
    pub fn local_preference(mut self, local_preference: u32) -> Self {
        self.local_preference = local_preference.min(DEFAULT_LOCAL_PREFERENCE);
        self
    }

    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn candidate_type(mut self, candidate_type: CandidateType) -> Self {
        self.candidate_type = candidate_type;
        self
    }

    pub fn build(self) -> Result<Candidate, IceError> {
        let foundation = self
            .foundation
            .ok_or(IceError::MissingRequiredField("foundation"))?;
        let address = self
            .address
            .ok_or(IceError::MissingRequiredField("address"))?;
        let port = self.port.ok_or(IceError::MissingRequiredField("port"))?;

        let priority = Candidate::calculate_priority(
            self.candidate_type.preference(),
            self.local_preference,
            self.component_id,
        );

        let candidate = Candidate {
            foundation,
            component_id: self.component_id,
            transport: "UDP".to_string(),
            priority,
            address,
            port,
            candidate_type: self.candidate_type,
            related_address: None,
            related_port: None,
        };

        candidate.validate()?;
        Ok(candidate)
    }
}
