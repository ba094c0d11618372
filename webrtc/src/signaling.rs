//! Signaling between the two endpoints of a local pair
//!
//! [`SignalMessage`] is what a real signaling server would carry;
//! [`LoopbackRelay`] hands it across inside the process, optionally going
//! through its JSON form on the way.

use crate::description::{IceCandidateInit, RtcSessionDescription};
use crate::error::Result;
use logging::Logger;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Either endpoint of a [`LocalPair`](crate::LocalPair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    A,
    B,
}

impl Peer {
    pub fn other(&self) -> Peer {
        match self {
            Peer::A => Peer::B,
            Peer::B => Peer::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Peer::A => "A",
            Peer::B => "B",
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{type, sdp}` or `{candidate, sdpMid, sdpMLineIndex}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalMessage {
    Description(RtcSessionDescription),
    Candidate(IceCandidateInit),
}

impl SignalMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Description(desc) => desc.sdp_type.as_str(),
            SignalMessage::Candidate(_) => "candidate",
        }
    }
}

/// Carries signaling messages from one peer to the other.
pub trait SignalingRelay {
    /// Queues `message` for the peer opposite `from`.
    fn send(&mut self, from: Peer, message: SignalMessage) -> Result<()>;

    /// Next message addressed to `to`.
    fn recv(&mut self, to: Peer) -> Result<Option<SignalMessage>>;

    /// Drops everything still in flight.
    fn clear(&mut self);
}

#[derive(Debug)]
enum Envelope {
    Direct(SignalMessage),
    Json(String),
}

/// In-process relay with one FIFO per direction.
#[derive(Debug)]
pub struct LoopbackRelay {
    to_a: VecDeque<Envelope>,
    to_b: VecDeque<Envelope>,
    encode_json: bool,
    logger: Logger,
}

impl LoopbackRelay {
    pub fn new(logger: Logger) -> Self {
        Self {
            to_a: VecDeque::new(),
            to_b: VecDeque::new(),
            encode_json: false,
            logger: logger.for_component("Signaling"),
        }
    }

    /// Serializes every message on send and parses it back on receive.
    pub fn with_json_encoding(mut self, enabled: bool) -> Self {
        self.encode_json = enabled;
        self
    }

    pub fn pending(&self) -> usize {
        self.to_a.len() + self.to_b.len()
    }

    fn queue(&mut self, to: Peer) -> &mut VecDeque<Envelope> {
        match to {
            Peer::A => &mut self.to_a,
            Peer::B => &mut self.to_b,
        }
    }
}

impl SignalingRelay for LoopbackRelay {
    fn send(&mut self, from: Peer, message: SignalMessage) -> Result<()> {
        let to = from.other();
        self.logger
            .debug(&format!("{} -> {}: {}", from, to, message.kind()));

        let envelope = if self.encode_json {
            Envelope::Json(message.to_json()?)
        } else {
            Envelope::Direct(message)
        };
        self.queue(to).push_back(envelope);
        Ok(())
    }

    fn recv(&mut self, to: Peer) -> Result<Option<SignalMessage>> {
        match self.queue(to).pop_front() {
            None => Ok(None),
            Some(Envelope::Direct(message)) => Ok(Some(message)),
            Some(Envelope::Json(json)) => Ok(Some(SignalMessage::from_json(&json)?)),
        }
    }

    fn clear(&mut self) {
        self.to_a.clear();
        self.to_b.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(port: u16) -> SignalMessage {
        SignalMessage::Candidate(
            IceCandidateInit::new(format!(
                "candidate:1 1 UDP 2130706431 127.0.0.1 {} typ host",
                port
            ))
            .with_mid("0", 0),
        )
    }

    #[test]
    fn test_untagged_decoding() {
        let desc = SignalMessage::from_json(r#"{"type":"offer","sdp":"v=0"}"#).unwrap();
        assert!(matches!(desc, SignalMessage::Description(_)));

        let cand = SignalMessage::from_json(
            r#"{"candidate":"candidate:1 1 UDP 1 127.0.0.1 9 typ host","sdpMid":"0","sdpMLineIndex":0}"#,
        )
        .unwrap();
        assert!(matches!(cand, SignalMessage::Candidate(_)));

        assert!(SignalMessage::from_json(r#"{"hello":"world"}"#).is_err());
    }

    #[test]
    fn test_relay_routes_to_other_peer_in_order() {
        let mut relay = LoopbackRelay::new(Logger::disabled());
        relay.send(Peer::A, candidate(1)).unwrap();
        relay.send(Peer::A, candidate(2)).unwrap();

        assert!(relay.recv(Peer::A).unwrap().is_none());
        assert_eq!(relay.recv(Peer::B).unwrap(), Some(candidate(1)));
        assert_eq!(relay.recv(Peer::B).unwrap(), Some(candidate(2)));
        assert_eq!(relay.pending(), 0);
    }

    #[test]
    fn test_relay_json_encoding_round_trips() {
        let mut relay = LoopbackRelay::new(Logger::disabled()).with_json_encoding(true);
        let offer = SignalMessage::Description(RtcSessionDescription::offer("v=0\r\n"));
        relay.send(Peer::B, offer.clone()).unwrap();
        assert_eq!(relay.recv(Peer::A).unwrap(), Some(offer));
    }

    #[test]
    fn test_relay_clear() {
        let mut relay = LoopbackRelay::new(Logger::disabled());
        relay.send(Peer::B, candidate(1)).unwrap();
        relay.clear();
        assert!(relay.recv(Peer::A).unwrap().is_none());
    }
}
