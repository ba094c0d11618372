//! Addressed payloads exchanged between endpoints.

use std::net::SocketAddr;

/// One datagram leaving or entering an endpoint. The endpoint never owns a
/// socket; whoever drives it moves these between peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub source: SocketAddr,
    pub destination: SocketAddr,
    pub payload: Vec<u8>,
}

impl Datagram {
    pub fn new(source: SocketAddr, destination: SocketAddr, payload: Vec<u8>) -> Self {
        Self {
            source,
            destination,
            payload,
        }
    }

    /// The same payload travelling the other way.
    pub fn reply(&self, payload: Vec<u8>) -> Self {
        Self::new(self.destination, self.source, payload)
    }
}
