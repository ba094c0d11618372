//! Session endpoint
//!
//! One side of a peer session. Drives the offer/answer exchange, trickles
//! its candidates out as events, checks connectivity over datagrams and
//! carries data channels once ICE is connected. Nothing here blocks or
//! owns a socket: callers pump [`SessionEndpoint::poll_event`],
//! [`SessionEndpoint::poll_transmit`] and
//! [`SessionEndpoint::handle_datagram`].

use super::ice::{CandidateDisposition, IceHandler};
use super::remote_stream::RemoteStream;
use super::sdp::SdpHandler;
use crate::capabilities::TransportCapabilities;
use crate::config::EndpointConfig;
use crate::description::{IceCandidateInit, RtcSessionDescription};
use crate::error::{Result, RtcError};
use crate::state::SignalingState;
use ice::{Candidate, ConnectionState};
use logging::Logger;
use media::CaptureHandle;
use network::{
    ChannelId, DataChannel, DataChannelConfig, DataChannelEvent, DataChannelManager,
    DataChannelMessage, DataChannelState, Datagram, Frame, TransactionId,
};
use sdp::{SdpType, SessionDescription};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;

/// Notifications produced by [`SessionEndpoint::poll_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointEvent {
    /// A local candidate to forward to the peer
    IceCandidate(IceCandidateInit),
    IceGatheringComplete,
    SignalingStateChange(SignalingState),
    IceConnectionStateChange(ConnectionState),
    /// The peer's description announced a stream it sends
    RemoteStream(RemoteStream),
    /// The peer opened a data channel
    DataChannel {
        id: ChannelId,
        label: String,
    },
    ChannelStateChange {
        id: ChannelId,
        state: DataChannelState,
    },
    Message {
        id: ChannelId,
        message: DataChannelMessage,
    },
}

/// Deferred work run one step per `poll_event` call.
#[derive(Debug)]
enum Task {
    AnnounceCandidate(IceCandidateInit),
    GatheringComplete,
}

pub struct SessionEndpoint {
    name: String,
    capabilities: TransportCapabilities,
    state: SignalingState,
    ice: IceHandler,
    sdp: SdpHandler,
    channels: DataChannelManager,
    local_media: Option<CaptureHandle>,
    local_session: Option<SessionDescription>,
    local_description: Option<RtcSessionDescription>,
    remote_description: Option<RtcSessionDescription>,
    last_answer: Option<RtcSessionDescription>,
    remote_streams: Vec<RemoteStream>,
    data_negotiated: bool,
    /// Local and remote address of the pair that passed its check
    transport: Option<(SocketAddr, SocketAddr)>,
    pending_checks: HashMap<TransactionId, (SocketAddr, SocketAddr)>,
    tasks: VecDeque<Task>,
    events: VecDeque<EndpointEvent>,
    outbox: VecDeque<Datagram>,
    logger: Logger,
}

impl SessionEndpoint {
    /// Creates an endpoint, resolving its transport from `config`.
    pub fn new(name: &str, config: &EndpointConfig, logger: Logger) -> Result<Self> {
        let capabilities = TransportCapabilities::resolve(config)?;
        Ok(Self::with_capabilities(name, config, capabilities, logger))
    }

    /// Creates an endpoint on capabilities resolved by the caller.
    pub fn with_capabilities(
        name: &str,
        config: &EndpointConfig,
        capabilities: TransportCapabilities,
        logger: Logger,
    ) -> Self {
        let logger = logger.for_component(name);
        logger.info(&format!(
            "Created endpoint on {} transport",
            capabilities.kind
        ));

        Self {
            name: name.to_string(),
            capabilities,
            state: SignalingState::Idle,
            ice: IceHandler::new(config, logger.clone()),
            sdp: SdpHandler::new(config, logger.clone()),
            channels: DataChannelManager::new(logger.clone()),
            local_media: None,
            local_session: None,
            local_description: None,
            remote_description: None,
            last_answer: None,
            remote_streams: Vec::new(),
            data_negotiated: false,
            transport: None,
            pending_checks: HashMap::new(),
            tasks: VecDeque::new(),
            events: VecDeque::new(),
            outbox: VecDeque::new(),
            logger,
        }
    }

    // ===== Local setup =====

    /// Attaches captured media to be offered. Replacing a different handle
    /// stops the old one's tracks.
    pub fn attach_local_media(&mut self, handle: CaptureHandle) -> Result<()> {
        self.require_local_setup("attach_local_media")?;
        if !handle.is_live() {
            return Err(RtcError::MediaUnavailable(format!(
                "capture handle {} has ended",
                handle.id()
            )));
        }

        self.logger
            .info(&format!("Attaching local stream {}", handle.id()));
        if let Some(previous) = self.local_media.replace(handle.clone()) {
            if !previous.same_as(&handle) {
                self.logger
                    .info(&format!("Stopping replaced stream {}", previous.id()));
                previous.stop();
            }
        }
        Ok(())
    }

    /// Creates a channel negotiated by the next offer. It stays
    /// `Connecting` until the peer acknowledges it. A label too long to
    /// announce is a `Configuration` error.
    pub fn open_data_channel(&mut self, label: &str) -> Result<ChannelId> {
        self.require_local_setup("open_data_channel")?;
        if !self.capabilities.data_channels {
            return Err(RtcError::Configuration(
                "data channels are disabled".to_string(),
            ));
        }
        Ok(self
            .channels
            .create_channel(DataChannelConfig::reliable(label))?)
    }

    // ===== Negotiation =====

    /// Builds the offer and sets it as local description.
    ///
    /// # Errors
    /// - `InvalidState` unless idle
    /// - `SignalingFailure` when neither media nor a data channel is
    ///   attached; the endpoint stays idle
    pub fn create_offer(&mut self) -> Result<RtcSessionDescription> {
        if self.state != SignalingState::Idle {
            return Err(self.invalid_state("create_offer"));
        }

        self.set_state(SignalingState::Offering);
        match self.build_offer() {
            Ok(offer) => {
                self.set_state(SignalingState::AwaitingAnswer);
                Ok(offer)
            }
            Err(e) => Err(self.abort_round(e)),
        }
    }

    fn build_offer(&mut self) -> Result<RtcSessionDescription> {
        self.ice.agent.set_controlling(true);
        self.channels.set_initiator(true);

        let candidates = self.ice.gather_candidates()?;
        let negotiate_data = self.capabilities.data_channels && self.channels.has_channels();
        let offer =
            self.sdp
                .create_offer(&self.ice.agent, self.local_media.as_ref(), negotiate_data)?;

        let description = RtcSessionDescription::from(&offer);
        self.logger.info("Set local description (offer)");
        self.logger.debug(&format!("Offer:\n{}", description.sdp));
        self.schedule_gathering(&offer, candidates);
        self.local_session = Some(offer);
        self.local_description = Some(description.clone());
        Ok(description)
    }

    /// Applies the peer's description.
    ///
    /// An offer is accepted only when idle: the endpoint answers it
    /// immediately and returns the answer, which is also kept as
    /// [`last_answer`](Self::last_answer). An answer is accepted only while
    /// awaiting one. Candidates queued so far are applied either way.
    ///
    /// # Errors
    /// - `InvalidState` when the description's role does not fit the
    ///   current state; nothing changes
    /// - `SignalingFailure` when the description cannot be used; the round
    ///   is aborted and the endpoint returns to idle
    pub fn receive_remote_description(
        &mut self,
        desc: RtcSessionDescription,
    ) -> Result<Option<RtcSessionDescription>> {
        match (desc.sdp_type, self.state) {
            (SdpType::Offer, SignalingState::Idle) => {
                self.logger.info("Received remote offer");
                match self.accept_offer(desc) {
                    Ok(answer) => Ok(Some(answer)),
                    Err(e) => Err(self.abort_round(e)),
                }
            }
            (SdpType::Answer, SignalingState::AwaitingAnswer) => {
                self.logger.info("Received remote answer");
                match self.accept_answer(desc) {
                    Ok(()) => Ok(None),
                    Err(e) => Err(self.abort_round(e)),
                }
            }
            _ => Err(self.invalid_state("receive_remote_description")),
        }
    }

    fn accept_offer(&mut self, desc: RtcSessionDescription) -> Result<RtcSessionDescription> {
        let offer = Self::parse_remote(&desc)?;
        self.set_state(SignalingState::Answering);

        self.ice.agent.set_controlling(false);
        self.channels.set_initiator(false);
        self.apply_remote(desc, &offer);

        let candidates = self.ice.gather_candidates()?;
        self.ice.apply_queued();

        let answer = self.sdp.create_answer(
            &offer,
            &self.ice.agent,
            self.local_media.as_ref(),
            self.capabilities.data_channels,
        )?;
        let description = RtcSessionDescription::from(&answer);
        self.logger.info("Set local description (answer)");
        self.logger.debug(&format!("Answer:\n{}", description.sdp));

        self.data_negotiated = data_section_accepted(&answer);
        self.schedule_gathering(&answer, candidates);
        self.local_session = Some(answer);
        self.local_description = Some(description.clone());
        self.last_answer = Some(description.clone());

        self.announce_remote_streams();
        self.set_state(SignalingState::Connected);
        self.start_checks();
        Ok(description)
    }

    fn accept_answer(&mut self, desc: RtcSessionDescription) -> Result<()> {
        let answer = Self::parse_remote(&desc)?;
        let offered = self
            .local_session
            .as_ref()
            .map(|offer| offer.media.len())
            .unwrap_or_default();
        if answer.media.len() != offered {
            return Err(RtcError::SignalingFailure(format!(
                "answer has {} media section(s), offer had {}",
                answer.media.len(),
                offered
            )));
        }

        self.data_negotiated = self
            .local_session
            .as_ref()
            .is_some_and(SessionDescription::has_data_channel)
            && data_section_accepted(&answer);
        self.apply_remote(desc, &answer);
        self.ice.apply_queued();

        self.announce_remote_streams();
        self.set_state(SignalingState::Connected);
        self.start_checks();
        Ok(())
    }

    fn parse_remote(desc: &RtcSessionDescription) -> Result<SessionDescription> {
        let session = desc.parse()?;
        if session.ice_ufrag().is_none() || session.ice_pwd().is_none() {
            return Err(RtcError::SignalingFailure(
                "remote description carries no ICE credentials".to_string(),
            ));
        }
        Ok(session)
    }

    /// Stores the peer's description, credentials and announced streams.
    fn apply_remote(&mut self, desc: RtcSessionDescription, session: &SessionDescription) {
        if let (Some(ufrag), Some(pwd)) = (session.ice_ufrag(), session.ice_pwd()) {
            self.ice.agent.set_remote_credentials(ufrag, pwd);
        }
        self.remote_description = Some(desc);

        self.remote_streams = SdpHandler::remote_streams(session);
    }

    /// Reports the peer's streams once the round they belong to succeeded.
    fn announce_remote_streams(&mut self) {
        for stream in &self.remote_streams {
            self.logger
                .info(&format!("Received remote stream {}", stream.id));
            self.events
                .push_back(EndpointEvent::RemoteStream(stream.clone()));
        }
    }

    /// Drops everything learned in the current round and goes back to idle.
    fn abort_round(&mut self, err: RtcError) -> RtcError {
        self.logger
            .error(&format!("Negotiation failed: {}", err));

        self.local_session = None;
        self.local_description = None;
        self.remote_description = None;
        self.last_answer = None;
        self.remote_streams.clear();
        self.data_negotiated = false;
        self.tasks.clear();
        self.pending_checks.clear();
        self.ice.reset_remote();
        self.set_state(SignalingState::Idle);
        err
    }

    /// Hands a trickled candidate to the endpoint. Malformed and duplicate
    /// candidates are dropped; on a closed endpoint this does nothing.
    pub fn add_remote_candidate(&mut self, init: IceCandidateInit) -> CandidateDisposition {
        if self.state.is_closed() {
            return CandidateDisposition::Ignored;
        }

        let disposition = self
            .ice
            .add_remote_candidate(&init, self.remote_description.is_some());
        if disposition == CandidateDisposition::Applied {
            self.start_checks();
        }
        disposition
    }

    fn schedule_gathering(&mut self, local: &SessionDescription, candidates: Vec<Candidate>) {
        let mid = local
            .media
            .first()
            .and_then(|m| m.mid())
            .unwrap_or("0")
            .to_string();

        for candidate in candidates {
            self.tasks.push_back(Task::AnnounceCandidate(
                IceCandidateInit::new(candidate.to_string()).with_mid(mid.clone(), 0),
            ));
        }
        self.tasks.push_back(Task::GatheringComplete);
    }

    // ===== Connectivity =====

    /// Sends one binding request on the best pair once both descriptions
    /// are in place and a pair exists.
    fn start_checks(&mut self) {
        if self.state != SignalingState::Connected {
            return;
        }
        let Some(remote_ufrag) = self.ice.agent.remote_ufrag().map(str::to_string) else {
            return;
        };
        let Some(pair) = self.ice.agent.start_checks() else {
            return;
        };

        let local = pair.local.socket_addr();
        let remote = pair.remote.socket_addr();
        let transaction_id = Frame::new_transaction_id();
        let request = Frame::BindingRequest {
            transaction_id,
            username: self.ice.agent.credentials().check_username(&remote_ufrag),
        };
        let payload = match request.encode() {
            Ok(payload) => payload,
            Err(e) => {
                self.logger
                    .warn(&format!("Cannot send binding request: {}", e));
                return;
            }
        };

        self.pending_checks.insert(transaction_id, (local, remote));
        self.outbox.push_back(Datagram::new(local, remote, payload));
        self.events.push_back(EndpointEvent::IceConnectionStateChange(
            ConnectionState::Checking,
        ));
    }

    fn on_connected(&mut self, local: SocketAddr, remote: SocketAddr) {
        if !self.ice.agent.mark_connected(local, remote) {
            return;
        }
        self.transport = Some((local, remote));
        self.pending_checks.clear();
        self.events.push_back(EndpointEvent::IceConnectionStateChange(
            ConnectionState::Connected,
        ));

        if self.data_negotiated {
            let announced = self.channels.announce_pending();
            if announced > 0 {
                self.logger
                    .info(&format!("Opening {} data channel(s)", announced));
            }
        }
    }

    /// Next datagram to hand to the peer.
    pub fn poll_transmit(&mut self) -> Option<Datagram> {
        if let Some((local, remote)) = self.transport {
            while let Some(frame) = self.channels.poll_outgoing() {
                match frame.encode() {
                    Ok(payload) => self
                        .outbox
                        .push_back(Datagram::new(local, remote, payload)),
                    Err(e) => self.logger.warn(&format!("Dropping channel frame: {}", e)),
                }
            }
        }
        self.outbox.pop_front()
    }

    /// Processes a datagram from the peer. Datagrams for addresses this
    /// endpoint did not gather, and undecodable payloads, are dropped.
    pub fn handle_datagram(&mut self, datagram: Datagram) {
        if self.state.is_closed() {
            return;
        }
        if !self.ice.agent.is_local_address(datagram.destination) {
            self.logger.debug(&format!(
                "Dropping datagram for foreign address {}",
                datagram.destination
            ));
            return;
        }

        let frame = match Frame::decode(&datagram.payload) {
            Ok(frame) => frame,
            Err(e) => {
                self.logger.warn(&format!(
                    "Dropping malformed datagram from {}: {}",
                    datagram.source, e
                ));
                return;
            }
        };

        match frame {
            Frame::BindingRequest {
                transaction_id,
                username,
            } => {
                let expected = format!("{}:", self.ice.agent.credentials().ufrag);
                if !username.starts_with(&expected) {
                    self.logger.warn(&format!(
                        "Binding request from {} with wrong username",
                        datagram.source
                    ));
                    return;
                }
                match (Frame::BindingResponse { transaction_id }).encode() {
                    Ok(payload) => self.outbox.push_back(datagram.reply(payload)),
                    Err(e) => self.logger.warn(&format!("Cannot answer binding request: {}", e)),
                }
            }
            Frame::BindingResponse { transaction_id } => {
                match self.pending_checks.remove(&transaction_id) {
                    Some((local, remote))
                        if local == datagram.destination && remote == datagram.source =>
                    {
                        self.on_connected(local, remote);
                    }
                    Some(_) => self.logger.warn("Binding response arrived on the wrong pair"),
                    None => self.logger.debug("Ignoring unsolicited binding response"),
                }
            }
            frame @ (Frame::ChannelData { .. } | Frame::ChannelClose { .. }) => {
                if self.transport.is_none() {
                    // Traffic on a checked pair confirms it.
                    if self.pending_checks.values().any(|pair| {
                        *pair == (datagram.destination, datagram.source)
                    }) {
                        self.on_connected(datagram.destination, datagram.source);
                    } else {
                        self.logger
                            .debug("Dropping channel data before connectivity");
                        return;
                    }
                }
                self.channels.handle_frame(frame);
            }
        }
    }

    // ===== Events =====

    /// Next event, running one deferred task when none is pending.
    pub fn poll_event(&mut self) -> Option<EndpointEvent> {
        loop {
            self.collect_channel_events();
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            let task = self.tasks.pop_front()?;
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::AnnounceCandidate(init) => {
                self.logger
                    .debug(&format!("Local ICE candidate: {}", init.candidate));
                self.events.push_back(EndpointEvent::IceCandidate(init));
            }
            Task::GatheringComplete => {
                self.logger.info("ICE candidate gathering complete");
                self.events.push_back(EndpointEvent::IceGatheringComplete);
            }
        }
    }

    fn collect_channel_events(&mut self) {
        while let Some(event) = self.channels.poll_event() {
            let event = match event {
                DataChannelEvent::RemoteChannel { id, label } => {
                    self.logger
                        .info(&format!("Received data channel '{}'", label));
                    EndpointEvent::DataChannel { id, label }
                }
                DataChannelEvent::StateChanged { id, state } => {
                    EndpointEvent::ChannelStateChange { id, state }
                }
                DataChannelEvent::Message { id, message } => {
                    EndpointEvent::Message { id, message }
                }
            };
            self.events.push_back(event);
        }
    }

    // ===== Data =====

    pub fn send(&mut self, id: ChannelId, data: &[u8]) -> Result<()> {
        Ok(self.channels.send(id, data)?)
    }

    pub fn send_text(&mut self, id: ChannelId, text: &str) -> Result<()> {
        self.channels.send_text(id, text)?;
        self.logger.debug(&format!("Sent data: {}", text));
        Ok(())
    }

    pub fn close_channel(&mut self, id: ChannelId) -> Result<()> {
        Ok(self.channels.close_channel(id)?)
    }

    // ===== Teardown =====

    /// Stops local media, closes every channel and drops all pending work.
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }

        if let Some(handle) = self.local_media.take() {
            handle.stop();
        }
        self.channels.close_all();
        while self.channels.poll_event().is_some() {}

        self.tasks.clear();
        self.events.clear();
        self.outbox.clear();
        self.pending_checks.clear();
        self.transport = None;
        self.ice.close();

        self.set_state(SignalingState::Closed);
        self.logger.info("Endpoint closed");
    }

    // ===== Accessors =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SignalingState {
        self.state
    }

    pub fn ice_state(&self) -> ConnectionState {
        self.ice.agent.state()
    }

    pub fn capabilities(&self) -> TransportCapabilities {
        self.capabilities
    }

    pub fn local_description(&self) -> Option<&RtcSessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&RtcSessionDescription> {
        self.remote_description.as_ref()
    }

    /// The answer this endpoint produced for the last remote offer.
    pub fn last_answer(&self) -> Option<&RtcSessionDescription> {
        self.last_answer.as_ref()
    }

    pub fn local_candidates(&self) -> &[Candidate] {
        self.ice.agent.local_candidates()
    }

    /// Candidates applied so far; queued ones are not included.
    pub fn remote_candidates(&self) -> &[Candidate] {
        self.ice.agent.remote_candidates()
    }

    pub fn queued_candidates(&self) -> usize {
        self.ice.queued_len()
    }

    pub fn channel(&self, id: ChannelId) -> Option<&DataChannel> {
        self.channels.channel(id)
    }

    pub fn channels(&self) -> impl Iterator<Item = &DataChannel> {
        self.channels.channels()
    }

    pub fn local_media(&self) -> Option<&CaptureHandle> {
        self.local_media.as_ref()
    }

    pub fn remote_streams(&self) -> &[RemoteStream] {
        &self.remote_streams
    }

    fn set_state(&mut self, state: SignalingState) {
        if self.state == state {
            return;
        }
        self.logger.debug(&format!(
            "Signaling state {} -> {}",
            self.state, state
        ));
        self.state = state;
        self.events
            .push_back(EndpointEvent::SignalingStateChange(state));
    }

    fn require_local_setup(&self, operation: &'static str) -> Result<()> {
        if self.state.accepts_local_setup() {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> RtcError {
        RtcError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

/// The answer kept an `m=application` section with a usable port.
fn data_section_accepted(answer: &SessionDescription) -> bool {
    answer
        .media
        .iter()
        .any(|m| m.is_data_channel() && m.port != 0)
}

impl std::fmt::Debug for SessionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEndpoint")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("ice_state", &self.ice.agent.state())
            .finish_non_exhaustive()
    }
}
