//! ICE Module - Interactive Connectivity Establishment
//!
//! Candidate model and the local bookkeeping an endpoint needs to pair its
//! host candidates with the ones trickled in by the peer (RFC 5245 subset).
//! Connectivity checks themselves travel over the endpoint's own datagram
//! path; this crate never opens sockets.

pub mod agent;
pub mod candidate;
pub mod candidate_builder;
pub mod candidate_pair;
pub mod candidate_type;
pub mod connection_state;
pub mod credentials;
pub mod errors;

pub use agent::{IceAgent, RemoteCandidateOutcome};
pub use candidate::Candidate;
pub use candidate_builder::CandidateBuilder;
pub use candidate_pair::CandidatePair;
pub use candidate_type::CandidateType;
pub use connection_state::ConnectionState;
pub use credentials::IceCredentials;
pub use errors::IceError;
