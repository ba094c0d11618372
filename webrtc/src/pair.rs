//! Two endpoints wired to each other in one process.

use crate::capabilities::TransportCapabilities;
use crate::config::EndpointConfig;
use crate::connection::{EndpointEvent, SessionEndpoint};
use crate::error::{Result, RtcError};
use crate::signaling::{LoopbackRelay, Peer, SignalMessage, SignalingRelay};
use logging::Logger;

/// Port distance between A's and B's candidates.
pub const PEER_PORT_OFFSET: u16 = 10;

/// Upper bound on pump rounds in [`LocalPair::run_until_idle`].
const MAX_PUMP_ROUNDS: usize = 1000;

/// Endpoint A (caller) and endpoint B (callee) plus the relay between them.
///
/// Each endpoint only ever sets its own descriptions: the pair moves
/// messages, it never applies them on the wrong side.
pub struct LocalPair<R: SignalingRelay = LoopbackRelay> {
    a: SessionEndpoint,
    b: SessionEndpoint,
    relay: R,
    logger: Logger,
}

impl LocalPair<LoopbackRelay> {
    pub fn new(config: &EndpointConfig, logger: Logger) -> Result<Self> {
        let relay = LoopbackRelay::new(logger.clone());
        Self::with_relay(config, relay, logger)
    }
}

impl<R: SignalingRelay> LocalPair<R> {
    /// Resolves the transport once and creates both endpoints on it. B's
    /// candidates start [`PEER_PORT_OFFSET`] ports above A's.
    pub fn with_relay(config: &EndpointConfig, relay: R, logger: Logger) -> Result<Self> {
        let capabilities = TransportCapabilities::resolve(config)?;
        let port_b = config
            .base_port()
            .checked_add(PEER_PORT_OFFSET)
            .ok_or_else(|| {
                RtcError::Configuration(format!(
                    "base_port {} leaves no room for the second endpoint",
                    config.base_port()
                ))
            })?;
        let config_b = config.clone().with_base_port(port_b);
        config_b.validate()?;

        Ok(Self {
            a: SessionEndpoint::with_capabilities("A", config, capabilities, logger.clone()),
            b: SessionEndpoint::with_capabilities("B", &config_b, capabilities, logger.clone()),
            relay,
            logger: logger.for_component("Pair"),
        })
    }

    pub fn endpoint(&self, peer: Peer) -> &SessionEndpoint {
        match peer {
            Peer::A => &self.a,
            Peer::B => &self.b,
        }
    }

    pub fn endpoint_mut(&mut self, peer: Peer) -> &mut SessionEndpoint {
        match peer {
            Peer::A => &mut self.a,
            Peer::B => &mut self.b,
        }
    }

    pub fn a(&self) -> &SessionEndpoint {
        &self.a
    }

    pub fn a_mut(&mut self) -> &mut SessionEndpoint {
        &mut self.a
    }

    pub fn b(&self) -> &SessionEndpoint {
        &self.b
    }

    pub fn b_mut(&mut self) -> &mut SessionEndpoint {
        &mut self.b
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// A creates an offer and sends it towards B.
    pub fn call(&mut self) -> Result<()> {
        self.logger.info("Starting call");
        let offer = self.a.create_offer()?;
        self.relay
            .send(Peer::A, SignalMessage::Description(offer))
    }

    /// Pumps events, signaling and datagrams until nothing moves. Returns
    /// every endpoint event seen, tagged with its endpoint.
    ///
    /// # Errors
    /// The first negotiation error either endpoint reports. The round is
    /// aborted on that endpoint; remaining traffic stays queued.
    pub fn run_until_idle(&mut self) -> Result<Vec<(Peer, EndpointEvent)>> {
        let mut observed = Vec::new();

        for _ in 0..MAX_PUMP_ROUNDS {
            let mut progressed = false;

            for peer in [Peer::A, Peer::B] {
                while let Some(event) = self.endpoint_mut(peer).poll_event() {
                    progressed = true;
                    if let EndpointEvent::IceCandidate(init) = &event {
                        self.relay
                            .send(peer, SignalMessage::Candidate(init.clone()))?;
                    }
                    observed.push((peer, event));
                }
            }

            for peer in [Peer::A, Peer::B] {
                while let Some(message) = self.relay.recv(peer)? {
                    progressed = true;
                    self.deliver(peer, message)?;
                }
            }

            for peer in [Peer::A, Peer::B] {
                while let Some(datagram) = self.endpoint_mut(peer).poll_transmit() {
                    progressed = true;
                    self.endpoint_mut(peer.other()).handle_datagram(datagram);
                }
            }

            if !progressed {
                return Ok(observed);
            }
        }

        self.logger
            .warn("Pump did not settle; leaving remaining work queued");
        Ok(observed)
    }

    fn deliver(&mut self, to: Peer, message: SignalMessage) -> Result<()> {
        let endpoint = self.endpoint_mut(to);
        if endpoint.state().is_closed() {
            return Ok(());
        }

        match message {
            SignalMessage::Description(desc) => {
                if let Some(answer) = endpoint.receive_remote_description(desc)? {
                    self.relay
                        .send(to, SignalMessage::Description(answer))?;
                }
            }
            SignalMessage::Candidate(init) => {
                let disposition = endpoint.add_remote_candidate(init);
                self.logger
                    .debug(&format!("Candidate for {}: {:?}", to, disposition));
            }
        }
        Ok(())
    }

    /// Closes both endpoints and drops signaling still in flight.
    pub fn hangup(&mut self) {
        self.logger.info("Ending call");
        self.a.close();
        self.b.close();
        self.relay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SignalingState;

    #[test]
    fn test_pair_uses_distinct_ports() {
        let mut pair = LocalPair::new(&EndpointConfig::default(), Logger::disabled()).unwrap();
        pair.a_mut().open_data_channel("chat").unwrap();
        pair.call().unwrap();
        pair.run_until_idle().unwrap();

        let a_port = pair.a().local_candidates()[0].port;
        let b_port = pair.b().local_candidates()[0].port;
        assert_eq!(b_port, a_port + PEER_PORT_OFFSET);
    }

    #[test]
    fn test_pair_rejects_port_without_room() {
        let config = EndpointConfig::builder().base_port(u16::MAX - 2).build().unwrap();
        assert!(LocalPair::new(&config, Logger::disabled()).is_err());
    }

    #[test]
    fn test_hangup_closes_both() {
        let mut pair = LocalPair::new(&EndpointConfig::default(), Logger::disabled()).unwrap();
        pair.a_mut().open_data_channel("chat").unwrap();
        pair.call().unwrap();
        pair.hangup();
        assert_eq!(pair.a().state(), SignalingState::Closed);
        assert_eq!(pair.b().state(), SignalingState::Closed);
        assert_eq!(pair.relay().pending(), 0);
    }
}
