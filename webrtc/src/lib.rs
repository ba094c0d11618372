//! # rtcpeer - loopback peer sessions
//!
//! Two session endpoints living in one process negotiate with the
//! offer/answer model, trickle their ICE candidates through a signaling
//! relay, check connectivity over in-process datagrams and open data
//! channels on top.
//!
//! ## Public API
//!
//! ### Session
//! - **`SessionEndpoint`** - one side of a session (offer/answer, candidates, channels)
//! - **`EndpointEvent`** - what an endpoint reports through `poll_event`
//! - **`LocalPair`** - endpoints A and B wired through a relay
//! - **`SignalingRelay`** / **`LoopbackRelay`** - how negotiation messages travel
//!
//! ### Configuration
//! - **`EndpointConfig`** - addresses, ports and session naming
//! - **`TransportCapabilities`** - transport chosen once for a pair
//!
//! ## Example Usage
//!
//! ```
//! use rtcpeer::{EndpointConfig, EndpointEvent, LocalPair, Peer};
//!
//! let mut pair = LocalPair::new(&EndpointConfig::default(), logging::Logger::disabled())?;
//! let chat = pair.a_mut().open_data_channel("chat")?;
//! pair.call()?;
//! pair.run_until_idle()?;
//!
//! pair.a_mut().send_text(chat, "hello")?;
//! let events = pair.run_until_idle()?;
//! assert!(events.iter().any(|(peer, event)| {
//!     *peer == Peer::B && matches!(event, EndpointEvent::Message { .. })
//! }));
//! # Ok::<(), rtcpeer::RtcError>(())
//! ```

pub mod capabilities;
pub mod config;
mod connection;
pub mod description;
pub mod error;
pub mod pair;
pub mod signaling;
pub mod state;

// ===== PUBLIC API - Session =====
pub use capabilities::{TransportCapabilities, TransportKind};
pub use config::{EndpointConfig, EndpointConfigBuilder};
pub use connection::{CandidateDisposition, EndpointEvent, RemoteStream, SessionEndpoint};
pub use description::{IceCandidateInit, RtcSessionDescription};
pub use error::{Result, RtcError};
pub use pair::{LocalPair, PEER_PORT_OFFSET};
pub use signaling::{LoopbackRelay, Peer, SignalMessage, SignalingRelay};
pub use state::SignalingState;

// ===== PUBLIC API - Building blocks =====
pub use ice::{Candidate, ConnectionState};
pub use network::{ChannelId, DataChannel, DataChannelMessage, DataChannelState, Datagram};
pub use sdp::SdpType;
