//! Session endpoint module
//!
//! The endpoint state machine with its SDP and ICE handlers.

mod endpoint;
mod ice;
mod remote_stream;
mod sdp;

pub use endpoint::{EndpointEvent, SessionEndpoint};
pub use ice::CandidateDisposition;
pub use remote_stream::RemoteStream;
