//! ICE candidate management for a session endpoint
//!
//! Wraps the [`IceAgent`] with the trickle bookkeeping the endpoint needs:
//! remote candidates that arrive before the remote description are held
//! back and applied once it is set.

use crate::config::EndpointConfig;
use crate::description::IceCandidateInit;
use crate::error::Result;
use ice::{Candidate, IceAgent, RemoteCandidateOutcome};
use logging::Logger;
use std::net::IpAddr;

/// What became of a candidate handed to
/// [`SessionEndpoint::add_remote_candidate`](super::SessionEndpoint::add_remote_candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDisposition {
    /// Added to the remote candidate set
    Applied,
    /// Held until the remote description is set
    Queued,
    Duplicate,
    Malformed,
    /// Endpoint closed, or an end-of-candidates marker
    Ignored,
}

/// Handles all ICE-related operations
pub(super) struct IceHandler {
    pub(super) agent: IceAgent,
    queued: Vec<Candidate>,
    address: IpAddr,
    base_port: u16,
    host_candidates: usize,
    logger: Logger,
}

impl IceHandler {
    pub fn new(config: &EndpointConfig, logger: Logger) -> Self {
        Self {
            agent: IceAgent::new(logger.clone()),
            queued: Vec::new(),
            address: config.loopback_address(),
            base_port: config.base_port(),
            host_candidates: config.host_candidates(),
            logger,
        }
    }

    /// Host candidates of this endpoint, gathered on first use.
    pub fn gather_candidates(&mut self) -> Result<Vec<Candidate>> {
        if self.agent.local_candidates().is_empty() {
            self.logger.info(&format!(
                "Gathering ICE candidates on {} starting at port {}",
                self.address, self.base_port
            ));
            self.agent
                .gather_host_candidates(self.address, self.base_port, self.host_candidates)?;
        }

        for (i, candidate) in self.agent.local_candidates().iter().enumerate() {
            self.logger.debug(&format!(
                "  Candidate {}: {} (type: {})",
                i + 1,
                candidate.socket_addr(),
                candidate.candidate_type
            ));
        }
        Ok(self.agent.local_candidates().to_vec())
    }

    pub fn add_remote_candidate(
        &mut self,
        init: &IceCandidateInit,
        remote_description_set: bool,
    ) -> CandidateDisposition {
        if init.candidate.trim().is_empty() {
            return CandidateDisposition::Ignored;
        }

        let candidate = match Candidate::parse(&init.candidate) {
            Ok(candidate) => candidate,
            Err(e) => {
                self.logger
                    .debug(&format!("Dropping malformed candidate '{}': {}", init.candidate, e));
                return CandidateDisposition::Malformed;
            }
        };

        if remote_description_set {
            return self.apply(candidate);
        }

        if self
            .queued
            .iter()
            .any(|known| known.same_transport_address(&candidate))
        {
            return CandidateDisposition::Duplicate;
        }
        self.logger.debug(&format!(
            "Queueing remote candidate {} until the remote description is set",
            candidate.socket_addr()
        ));
        self.queued.push(candidate);
        CandidateDisposition::Queued
    }

    /// Applies every queued candidate. Returns how many were new.
    pub fn apply_queued(&mut self) -> usize {
        let queued = std::mem::take(&mut self.queued);
        if !queued.is_empty() {
            self.logger.info(&format!(
                "Applying {} queued remote candidate(s)",
                queued.len()
            ));
        }
        queued
            .into_iter()
            .filter(|c| self.apply(c.clone()) == CandidateDisposition::Applied)
            .count()
    }

    fn apply(&mut self, candidate: Candidate) -> CandidateDisposition {
        match self.agent.add_remote_candidate(candidate) {
            Ok(RemoteCandidateOutcome::Added) => CandidateDisposition::Applied,
            Ok(RemoteCandidateOutcome::Duplicate) => CandidateDisposition::Duplicate,
            Err(e) => {
                self.logger.debug(&format!("Dropping invalid candidate: {}", e));
                CandidateDisposition::Malformed
            }
        }
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Forgets the peer: queued candidates, remote credentials, pairs.
    pub fn reset_remote(&mut self) {
        self.queued.clear();
        self.agent.reset_remote();
    }

    pub fn close(&mut self) {
        self.queued.clear();
        self.agent.close();
    }
}
