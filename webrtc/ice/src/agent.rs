//! ICE agent.
//!
//! Owns the local credentials and candidates of one endpoint, the set of
//! candidates the peer trickled in, and the pairs formed from both. The
//! agent never touches the network: the endpoint asks it which pair to
//! check and tells it when the peer answered.

use crate::{
    candidate::Candidate, candidate_builder::CandidateBuilder, candidate_pair::CandidatePair,
    candidate_type::CandidateType, connection_state::ConnectionState, credentials::IceCredentials,
    errors::IceError,
};
use logging::Logger;
use std::net::{IpAddr, SocketAddr};

/// Upper bound on host candidates gathered per endpoint.
pub const MAX_HOST_CANDIDATES: usize = 4;

/// What happened to a remote candidate handed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCandidateOutcome {
    Added,
    /// Same transport address as a candidate already known; dropped.
    Duplicate,
}

#[derive(Debug)]
pub struct IceAgent {
    credentials: IceCredentials,
    remote_ufrag: Option<String>,
    remote_pwd: Option<String>,
    controlling: bool,
    local_candidates: Vec<Candidate>,
    remote_candidates: Vec<Candidate>,
    candidate_pairs: Vec<CandidatePair>,
    selected_pair: Option<CandidatePair>,
    state: ConnectionState,
    logger: Logger,
}

impl IceAgent {
    /// Agent with freshly generated credentials.
    pub fn new(logger: Logger) -> Self {
        Self::with_credentials(IceCredentials::generate(), logger)
    }

    pub fn with_credentials(credentials: IceCredentials, logger: Logger) -> Self {
        Self {
            credentials,
            remote_ufrag: None,
            remote_pwd: None,
            controlling: false,
            local_candidates: Vec::new(),
            remote_candidates: Vec::new(),
            candidate_pairs: Vec::new(),
            selected_pair: None,
            state: ConnectionState::New,
            logger,
        }
    }

    pub fn credentials(&self) -> &IceCredentials {
        &self.credentials
    }

    /// The offerer controls nomination.
    pub fn set_controlling(&mut self, controlling: bool) {
        self.controlling = controlling;
    }

    pub fn set_remote_credentials(&mut self, ufrag: &str, pwd: &str) {
        self.remote_ufrag = Some(ufrag.to_string());
        self.remote_pwd = Some(pwd.to_string());
    }

    pub fn remote_ufrag(&self) -> Option<&str> {
        self.remote_ufrag.as_deref()
    }

    /// Gathers `count` host candidates on `address`, one port each starting
    /// at `base_port`. Replaces whatever was gathered before.
    ///
    /// # Errors
    /// `Configuration` when `count` is 0, exceeds [`MAX_HOST_CANDIDATES`], or
    /// the port range overflows.
    pub fn gather_host_candidates(
        &mut self,
        address: IpAddr,
        base_port: u16,
        count: usize,
    ) -> Result<Vec<Candidate>, IceError> {
        if count == 0 || count > MAX_HOST_CANDIDATES {
            return Err(IceError::Configuration(format!(
                "host candidate count must be between 1 and {}, got {}",
                MAX_HOST_CANDIDATES, count
            )));
        }

        let mut gathered = Vec::with_capacity(count);
        for index in 0..count {
            let offset = u16::try_from(index)
                .map_err(|_| IceError::Configuration("too many host candidates".to_string()))?;
            let port = base_port.checked_add(offset).ok_or_else(|| {
                IceError::Configuration(format!("port range starting at {} overflows", base_port))
            })?;

            let candidate = CandidateBuilder::new()
                .foundation((index + 1).to_string())
                .local_preference(65535 - u32::from(offset))
                .address(address)
                .port(port)
                .candidate_type(CandidateType::Host)
                .build()?;
            gathered.push(candidate);
        }

        self.logger.debug(&format!(
            "Gathered {} host candidate(s) on {}",
            gathered.len(),
            address
        ));
        self.local_candidates = gathered.clone();
        self.form_candidate_pairs();
        Ok(gathered)
    }

    pub fn local_candidates(&self) -> &[Candidate] {
        &self.local_candidates
    }

    pub fn remote_candidates(&self) -> &[Candidate] {
        &self.remote_candidates
    }

    /// Whether `addr` is the transport address of one of our candidates.
    pub fn is_local_address(&self, addr: SocketAddr) -> bool {
        self.local_candidates.iter().any(|c| c.socket_addr() == addr)
    }

    pub fn add_remote_candidate(
        &mut self,
        candidate: Candidate,
    ) -> Result<RemoteCandidateOutcome, IceError> {
        candidate.validate()?;

        if self
            .remote_candidates
            .iter()
            .any(|known| known.same_transport_address(&candidate))
        {
            self.logger.debug(&format!(
                "Dropping duplicate remote candidate {}",
                candidate.socket_addr()
            ));
            return Ok(RemoteCandidateOutcome::Duplicate);
        }

        self.logger.info(&format!(
            "Adding remote candidate: {} (type: {})",
            candidate.socket_addr(),
            candidate.candidate_type
        ));
        self.remote_candidates.push(candidate);
        self.form_candidate_pairs();
        Ok(RemoteCandidateOutcome::Added)
    }

    /// Every local/remote combination with matching component and address
    /// family, highest priority first.
    fn form_candidate_pairs(&mut self) {
        self.candidate_pairs.clear();

        for local in &self.local_candidates {
            for remote in &self.remote_candidates {
                if local.component_id != remote.component_id
                    || local.address.is_ipv4() != remote.address.is_ipv4()
                {
                    continue;
                }
                self.candidate_pairs.push(CandidatePair::new(
                    local.clone(),
                    remote.clone(),
                    self.controlling,
                ));
            }
        }

        self.candidate_pairs
            .sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn candidate_pairs(&self) -> &[CandidatePair] {
        &self.candidate_pairs
    }

    pub fn best_pair(&self) -> Option<&CandidatePair> {
        self.candidate_pairs.first()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Moves to `Checking` and returns the pair to check, if one exists and
    /// no check has started yet.
    pub fn start_checks(&mut self) -> Option<CandidatePair> {
        if self.state != ConnectionState::New {
            return None;
        }
        let pair = self.best_pair()?.clone();
        self.state = ConnectionState::Checking;
        self.logger.info(&format!(
            "Checking pair {} -> {}",
            pair.local.socket_addr(),
            pair.remote.socket_addr()
        ));
        Some(pair)
    }

    /// Records the pair that carried a successful check. Returns false when
    /// the agent was already connected or closed.
    pub fn mark_connected(&mut self, local: SocketAddr, remote: SocketAddr) -> bool {
        if matches!(self.state, ConnectionState::Connected | ConnectionState::Closed) {
            return false;
        }

        let pair = self
            .candidate_pairs
            .iter()
            .find(|p| p.local.socket_addr() == local && p.remote.socket_addr() == remote)
            .cloned();
        if let Some(pair) = pair {
            self.selected_pair = Some(pair);
        }
        self.state = ConnectionState::Connected;
        self.logger
            .info(&format!("ICE connected via {} -> {}", local, remote));
        true
    }

    pub fn selected_pair(&self) -> Option<&CandidatePair> {
        self.selected_pair.as_ref()
    }

    /// Forgets everything learned from the peer; local candidates stay.
    pub fn reset_remote(&mut self) {
        self.remote_ufrag = None;
        self.remote_pwd = None;
        self.remote_candidates.clear();
        self.candidate_pairs.clear();
        self.selected_pair = None;
        if self.state != ConnectionState::Closed {
            self.state = ConnectionState::New;
        }
    }

    pub fn close(&mut self) {
        self.candidate_pairs.clear();
        self.selected_pair = None;
        self.state = ConnectionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn remote(port: u16) -> Candidate {
        Candidate::parse(&format!("1 1 UDP 2130706431 127.0.0.1 {} typ host", port)).unwrap()
    }

    #[test]
    fn test_new_agent_has_credentials_and_no_candidates() {
        let agent = IceAgent::new(Logger::disabled());
        assert_eq!(agent.credentials().ufrag.len(), 8);
        assert!(agent.local_candidates().is_empty());
        assert!(agent.remote_candidates().is_empty());
        assert_eq!(agent.state(), ConnectionState::New);
    }

    #[test]
    fn test_gather_host_candidates_on_consecutive_ports() {
        let mut agent = IceAgent::new(Logger::disabled());
        let gathered = agent.gather_host_candidates(LOOPBACK, 50000, 3).unwrap();
        let ports: Vec<u16> = gathered.iter().map(|c| c.port).collect();
        assert_eq!(ports, vec![50000, 50001, 50002]);
        assert!(gathered[0].priority > gathered[1].priority);
        assert!(agent.is_local_address(SocketAddr::new(LOOPBACK, 50002)));
        assert!(!agent.is_local_address(SocketAddr::new(LOOPBACK, 50003)));
    }

    #[test]
    fn test_gather_host_candidates_replaces_previous() {
        let mut agent = IceAgent::new(Logger::disabled());
        agent.gather_host_candidates(LOOPBACK, 50000, 2).unwrap();
        agent.gather_host_candidates(LOOPBACK, 51000, 1).unwrap();
        assert_eq!(agent.local_candidates().len(), 1);
        assert_eq!(agent.local_candidates()[0].port, 51000);
    }

    #[test]
    fn test_gather_host_candidates_rejects_bad_counts() {
        let mut agent = IceAgent::new(Logger::disabled());
        assert!(matches!(
            agent.gather_host_candidates(LOOPBACK, 50000, 0),
            Err(IceError::Configuration(_))
        ));
        assert!(matches!(
            agent.gather_host_candidates(LOOPBACK, 50000, MAX_HOST_CANDIDATES + 1),
            Err(IceError::Configuration(_))
        ));
        assert!(matches!(
            agent.gather_host_candidates(LOOPBACK, u16::MAX, 2),
            Err(IceError::Configuration(_))
        ));
    }

    #[test]
    fn test_add_remote_candidate_drops_duplicates() {
        let mut agent = IceAgent::new(Logger::disabled());
        assert_eq!(
            agent.add_remote_candidate(remote(50010)),
            Ok(RemoteCandidateOutcome::Added)
        );
        assert_eq!(
            agent.add_remote_candidate(remote(50010)),
            Ok(RemoteCandidateOutcome::Duplicate)
        );
        assert_eq!(agent.remote_candidates().len(), 1);
    }

    #[test]
    fn test_pairs_formed_in_either_order() {
        let mut early = IceAgent::new(Logger::disabled());
        early.add_remote_candidate(remote(50010)).unwrap();
        early.gather_host_candidates(LOOPBACK, 50000, 2).unwrap();

        let mut late = IceAgent::new(Logger::disabled());
        late.gather_host_candidates(LOOPBACK, 50000, 2).unwrap();
        late.add_remote_candidate(remote(50010)).unwrap();

        assert_eq!(early.candidate_pairs().len(), 2);
        assert_eq!(early.candidate_pairs(), late.candidate_pairs());
        assert_eq!(early.best_pair().map(|p| p.local.port), Some(50000));
    }

    #[test]
    fn test_pairs_skip_mismatched_address_family() {
        let mut agent = IceAgent::new(Logger::disabled());
        agent.gather_host_candidates(LOOPBACK, 50000, 1).unwrap();
        agent
            .add_remote_candidate(Candidate::parse("1 1 UDP 2130706431 ::1 50010 typ host").unwrap())
            .unwrap();
        assert!(agent.candidate_pairs().is_empty());
        assert!(agent.start_checks().is_none());
    }

    #[test]
    fn test_check_lifecycle() {
        let mut agent = IceAgent::new(Logger::disabled());
        agent.set_controlling(true);
        agent.gather_host_candidates(LOOPBACK, 50000, 1).unwrap();
        agent.add_remote_candidate(remote(50010)).unwrap();

        let pair = agent.start_checks().unwrap();
        assert_eq!(agent.state(), ConnectionState::Checking);
        assert!(agent.start_checks().is_none());

        assert!(agent.mark_connected(pair.local.socket_addr(), pair.remote.socket_addr()));
        assert_eq!(agent.state(), ConnectionState::Connected);
        assert_eq!(agent.selected_pair(), Some(&pair));
        assert!(!agent.mark_connected(pair.local.socket_addr(), pair.remote.socket_addr()));
    }

    #[test]
    fn test_reset_remote_keeps_local() {
        let mut agent = IceAgent::new(Logger::disabled());
        agent.gather_host_candidates(LOOPBACK, 50000, 1).unwrap();
        agent.set_remote_credentials("abcd", "0123456789abcdef012345");
        agent.add_remote_candidate(remote(50010)).unwrap();

        agent.reset_remote();
        assert_eq!(agent.local_candidates().len(), 1);
        assert!(agent.remote_candidates().is_empty());
        assert!(agent.remote_ufrag().is_none());
        assert_eq!(agent.state(), ConnectionState::New);
    }

    #[test]
    fn test_close_is_terminal() {
        let mut agent = IceAgent::new(Logger::disabled());
        agent.close();
        agent.reset_remote();
        assert_eq!(agent.state(), ConnectionState::Closed);
        assert!(!agent.mark_connected(
            SocketAddr::new(LOOPBACK, 1),
            SocketAddr::new(LOOPBACK, 2)
        ));
    }
}
