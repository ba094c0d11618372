//! Data channel manager
//!
//! Owns every channel of one endpoint, turns API calls into outgoing
//! [`Frame`]s and incoming frames into [`DataChannelEvent`]s. Outgoing
//! frames share a single FIFO, which keeps each channel ordered.

use super::channel::{ChannelId, DataChannel, DataChannelConfig, DataChannelState};
use crate::dcep::{DataChannelAck, DataChannelOpen, DcepMessage, ppid};
use crate::error::{NetworkError, Result};
use crate::frame::Frame;
use logging::Logger;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// A user message received on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChannelMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl DataChannelMessage {
    pub fn len(&self) -> usize {
        match self {
            DataChannelMessage::Text(text) => text.len(),
            DataChannelMessage::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataChannelMessage::Text(text) => Some(text),
            DataChannelMessage::Binary(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChannelEvent {
    /// The peer opened a channel
    RemoteChannel { id: ChannelId, label: String },
    StateChanged {
        id: ChannelId,
        state: DataChannelState,
    },
    Message {
        id: ChannelId,
        message: DataChannelMessage,
    },
}

#[derive(Debug)]
pub struct DataChannelManager {
    channels: BTreeMap<ChannelId, DataChannel>,
    streams: HashMap<u16, ChannelId>,
    next_channel: u16,
    /// Initiator uses even stream ids, responder odd
    next_stream_id: u16,
    outgoing: VecDeque<Frame>,
    events: VecDeque<DataChannelEvent>,
    logger: Logger,
}

impl DataChannelManager {
    /// Manager acting as initiator until told otherwise.
    pub fn new(logger: Logger) -> Self {
        Self {
            channels: BTreeMap::new(),
            streams: HashMap::new(),
            next_channel: 0,
            next_stream_id: 0,
            outgoing: VecDeque::new(),
            events: VecDeque::new(),
            logger,
        }
    }

    /// Picks the stream id parity: even for the initiator, odd otherwise.
    pub fn set_initiator(&mut self, initiator: bool) {
        let parity = if initiator { 0 } else { 1 };
        if self.next_stream_id % 2 != parity {
            self.next_stream_id += 1;
        }
    }

    /// Creates a channel in `Connecting`. Nothing goes on the wire until
    /// [`announce_pending`](Self::announce_pending).
    ///
    /// # Errors
    /// `FieldTooLong` when the label or protocol cannot be announced.
    pub fn create_channel(&mut self, config: DataChannelConfig) -> Result<ChannelId> {
        config.validate()?;
        Ok(self.insert_channel(config))
    }

    fn insert_channel(&mut self, config: DataChannelConfig) -> ChannelId {
        let id = ChannelId(self.next_channel);
        self.next_channel = self.next_channel.wrapping_add(1);
        self.logger.info(&format!(
            "Created data channel {} '{}'",
            id, config.label
        ));
        self.channels.insert(id, DataChannel::new(id, config));
        id
    }

    /// Queues a DATA_CHANNEL_OPEN for every local channel still waiting
    /// for a stream. Returns how many were announced.
    pub fn announce_pending(&mut self) -> usize {
        let pending: Vec<ChannelId> = self
            .channels
            .values()
            .filter(|c| c.state() == DataChannelState::Connecting && c.stream_id().is_none())
            .map(DataChannel::id)
            .collect();

        let mut announced = 0;
        for id in pending {
            let Some(channel) = self.channels.get(&id) else {
                continue;
            };
            let open = DataChannelOpen {
                protocol: channel.protocol().to_string(),
                ..DataChannelOpen::reliable(channel.label(), channel.is_ordered())
            };
            let payload = match open.to_bytes() {
                Ok(payload) => payload,
                Err(err) => {
                    self.logger
                        .warn(&format!("Cannot announce '{}': {}", open.label, err));
                    continue;
                }
            };

            let stream_id = self.allocate_stream_id();
            self.streams.insert(stream_id, id);
            if let Some(channel) = self.channels.get_mut(&id) {
                channel.assign_stream(stream_id);
            }
            self.logger.debug(&format!(
                "Announcing '{}' on stream {}",
                open.label, stream_id
            ));
            self.outgoing.push_back(Frame::ChannelData {
                stream_id,
                ppid: ppid::DCEP,
                payload,
            });
            announced += 1;
        }

        announced
    }

    pub fn send(&mut self, id: ChannelId, data: &[u8]) -> Result<()> {
        let ppid_value = if data.is_empty() {
            ppid::BINARY_EMPTY
        } else {
            ppid::BINARY
        };
        self.queue_user_data(id, ppid_value, data.to_vec())
    }

    pub fn send_text(&mut self, id: ChannelId, text: &str) -> Result<()> {
        let ppid_value = if text.is_empty() {
            ppid::STRING_EMPTY
        } else {
            ppid::STRING
        };
        self.queue_user_data(id, ppid_value, text.as_bytes().to_vec())
    }

    fn queue_user_data(&mut self, id: ChannelId, ppid_value: u32, payload: Vec<u8>) -> Result<()> {
        let channel = self
            .channels
            .get_mut(&id)
            .ok_or(NetworkError::UnknownChannel(id.0))?;
        let stream_id = channel
            .stream_id()
            .filter(|_| channel.is_open())
            .ok_or_else(|| NetworkError::ChannelNotOpen(channel.label().to_string()))?;
        channel.record_send(payload.len())?;

        self.outgoing.push_back(Frame::ChannelData {
            stream_id,
            ppid: ppid_value,
            payload,
        });
        Ok(())
    }

    /// Closes `id`, telling the peer if the channel had reached it.
    /// Closing a closed channel is a no-op.
    pub fn close_channel(&mut self, id: ChannelId) -> Result<()> {
        if !self.channels.contains_key(&id) {
            return Err(NetworkError::UnknownChannel(id.0));
        }
        self.close_local(id);
        Ok(())
    }

    fn close_local(&mut self, id: ChannelId) {
        let Some(channel) = self.channels.get_mut(&id) else {
            return;
        };

        let was_open = channel.is_open();
        if !channel.begin_close() {
            return;
        }
        self.events.push_back(DataChannelEvent::StateChanged {
            id,
            state: DataChannelState::Closing,
        });

        if let (true, Some(stream_id)) = (was_open, channel.stream_id()) {
            self.outgoing.push_back(Frame::ChannelClose { stream_id });
        }

        channel.on_closed();
        self.logger.info(&format!("Closed data channel '{}'", channel.label()));
        self.events.push_back(DataChannelEvent::StateChanged {
            id,
            state: DataChannelState::Closed,
        });
    }

    /// Closes every channel without notifying the peer and drops anything
    /// not yet sent.
    pub fn close_all(&mut self) {
        let ids: Vec<ChannelId> = self.channels.keys().copied().collect();
        for id in ids {
            self.close_local(id);
        }
        self.outgoing.clear();
    }

    /// Applies a channel frame received from the peer. Other frame kinds
    /// are ignored.
    pub fn handle_frame(&mut self, frame: Frame) {
        match frame {
            Frame::ChannelData {
                stream_id,
                ppid: ppid::DCEP,
                payload,
            } => match DcepMessage::parse(&payload) {
                Ok(DcepMessage::Open(open)) => self.handle_channel_open(stream_id, open),
                Ok(DcepMessage::Ack) => self.handle_channel_ack(stream_id),
                Err(err) => self
                    .logger
                    .warn(&format!("Dropping DCEP message on stream {}: {}", stream_id, err)),
            },
            Frame::ChannelData {
                stream_id,
                ppid,
                payload,
            } => self.handle_user_data(stream_id, ppid, payload),
            Frame::ChannelClose { stream_id } => self.handle_remote_close(stream_id),
            Frame::BindingRequest { .. } | Frame::BindingResponse { .. } => {}
        }
    }

    fn handle_channel_open(&mut self, stream_id: u16, open: DataChannelOpen) {
        if self.streams.contains_key(&stream_id) {
            self.logger.warn(&format!(
                "Ignoring DATA_CHANNEL_OPEN for stream {} already in use",
                stream_id
            ));
            return;
        }

        let config = DataChannelConfig {
            label: open.label.clone(),
            ordered: open.channel_type.is_ordered(),
            protocol: open.protocol,
        };
        let id = self.insert_channel(config);
        self.streams.insert(stream_id, id);
        if let Some(channel) = self.channels.get_mut(&id) {
            channel.assign_stream(stream_id);
            channel.on_open();
        }

        self.outgoing.push_back(Frame::ChannelData {
            stream_id,
            ppid: ppid::DCEP,
            payload: DataChannelAck.to_bytes(),
        });

        self.events.push_back(DataChannelEvent::RemoteChannel {
            id,
            label: open.label,
        });
        self.events.push_back(DataChannelEvent::StateChanged {
            id,
            state: DataChannelState::Open,
        });
    }

    fn handle_channel_ack(&mut self, stream_id: u16) {
        let Some(channel) = self
            .streams
            .get(&stream_id)
            .and_then(|id| self.channels.get_mut(id))
        else {
            self.logger
                .warn(&format!("DATA_CHANNEL_ACK for unknown stream {}", stream_id));
            return;
        };

        if channel.on_open() {
            self.logger
                .info(&format!("Data channel '{}' is open", channel.label()));
            self.events.push_back(DataChannelEvent::StateChanged {
                id: channel.id(),
                state: DataChannelState::Open,
            });
        }
    }

    fn handle_user_data(&mut self, stream_id: u16, ppid_value: u32, payload: Vec<u8>) {
        let Some(channel) = self
            .streams
            .get(&stream_id)
            .and_then(|id| self.channels.get_mut(id))
        else {
            self.logger
                .warn(&format!("Data for unknown stream {}", stream_id));
            return;
        };
        if !channel.is_open() {
            self.logger.debug(&format!(
                "Dropping data for '{}' in state {}",
                channel.label(),
                channel.state()
            ));
            return;
        }

        let message = match ppid_value {
            ppid::STRING | ppid::STRING_EMPTY => match String::from_utf8(payload) {
                Ok(text) => DataChannelMessage::Text(text),
                Err(_) => {
                    self.logger
                        .warn(&format!("Dropping non UTF-8 text on stream {}", stream_id));
                    return;
                }
            },
            ppid::BINARY | ppid::BINARY_EMPTY => DataChannelMessage::Binary(payload),
            other => {
                self.logger
                    .warn(&format!("Unknown PPID {} on stream {}", other, stream_id));
                return;
            }
        };

        channel.record_receive(message.len());
        self.events.push_back(DataChannelEvent::Message {
            id: channel.id(),
            message,
        });
    }

    fn handle_remote_close(&mut self, stream_id: u16) {
        let Some(id) = self.streams.get(&stream_id).copied() else {
            return;
        };
        if let Some(channel) = self.channels.get_mut(&id) {
            if channel.begin_close() {
                channel.on_closed();
                self.logger
                    .info(&format!("Peer closed data channel '{}'", channel.label()));
                self.events.push_back(DataChannelEvent::StateChanged {
                    id,
                    state: DataChannelState::Closing,
                });
                self.events.push_back(DataChannelEvent::StateChanged {
                    id,
                    state: DataChannelState::Closed,
                });
            }
        }
    }

    pub fn poll_outgoing(&mut self) -> Option<Frame> {
        self.outgoing.pop_front()
    }

    pub fn poll_event(&mut self) -> Option<DataChannelEvent> {
        self.events.pop_front()
    }

    pub fn channel(&self, id: ChannelId) -> Option<&DataChannel> {
        self.channels.get(&id)
    }

    pub fn channels(&self) -> impl Iterator<Item = &DataChannel> {
        self.channels.values()
    }

    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    fn allocate_stream_id(&mut self) -> u16 {
        while self.streams.contains_key(&self.next_stream_id) {
            self.next_stream_id = self.next_stream_id.wrapping_add(2);
        }
        let id = self.next_stream_id;
        self.next_stream_id = self.next_stream_id.wrapping_add(2);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> DataChannelManager {
        DataChannelManager::new(Logger::disabled())
    }

    fn drain(manager: &mut DataChannelManager) -> Vec<Frame> {
        std::iter::from_fn(|| manager.poll_outgoing()).collect()
    }

    /// Delivers every queued frame from `from` to `to`.
    fn pump(from: &mut DataChannelManager, to: &mut DataChannelManager) {
        for frame in drain(from) {
            to.handle_frame(frame);
        }
    }

    fn open_pair(label: &str) -> (DataChannelManager, DataChannelManager, ChannelId) {
        let mut offerer = manager();
        let mut answerer = manager();
        answerer.set_initiator(false);

        let id = offerer.create_channel(DataChannelConfig::reliable(label)).unwrap();
        offerer.announce_pending();
        pump(&mut offerer, &mut answerer);
        pump(&mut answerer, &mut offerer);
        (offerer, answerer, id)
    }

    #[test]
    fn test_stream_id_allocation_initiator() {
        let mut m = manager();
        assert_eq!(m.allocate_stream_id(), 0);
        assert_eq!(m.allocate_stream_id(), 2);
        assert_eq!(m.allocate_stream_id(), 4);
    }

    #[test]
    fn test_stream_id_allocation_responder() {
        let mut m = manager();
        m.set_initiator(false);
        assert_eq!(m.allocate_stream_id(), 1);
        assert_eq!(m.allocate_stream_id(), 3);
        m.set_initiator(false);
        assert_eq!(m.allocate_stream_id(), 5);
    }

    #[test]
    fn test_announce_queues_open() {
        let mut m = manager();
        m.create_channel(DataChannelConfig::reliable("chat")).unwrap();
        assert_eq!(m.announce_pending(), 1);
        assert_eq!(m.announce_pending(), 0);

        let frames = drain(&mut m);
        assert_eq!(frames.len(), 1);
        let Frame::ChannelData {
            stream_id,
            ppid: kind,
            payload,
        } = &frames[0]
        else {
            panic!("expected channel data");
        };
        assert_eq!((*stream_id, *kind), (0, ppid::DCEP));
        assert_eq!(
            DcepMessage::parse(payload).unwrap(),
            DcepMessage::Open(DataChannelOpen::reliable("chat", true))
        );
    }

    #[test]
    fn test_open_handshake() {
        let (mut offerer, mut answerer, id) = open_pair("chat");

        assert!(offerer.channel(id).unwrap().is_open());
        assert_eq!(
            offerer.poll_event(),
            Some(DataChannelEvent::StateChanged {
                id,
                state: DataChannelState::Open
            })
        );

        let remote = answerer.channels().next().unwrap();
        assert_eq!(remote.label(), "chat");
        assert_eq!(remote.stream_id(), Some(0));
        assert!(remote.is_open());
        assert!(matches!(
            answerer.poll_event(),
            Some(DataChannelEvent::RemoteChannel { ref label, .. }) if label == "chat"
        ));
    }

    #[test]
    fn test_send_before_open_has_no_side_effect() {
        let mut m = manager();
        let id = m.create_channel(DataChannelConfig::reliable("chat")).unwrap();
        assert_eq!(
            m.send_text(id, "hello"),
            Err(NetworkError::ChannelNotOpen("chat".to_string()))
        );
        m.announce_pending();
        drain(&mut m);
        assert!(m.send(id, b"x").is_err());
        assert!(m.poll_outgoing().is_none());
        assert_eq!(m.channel(id).unwrap().bytes_sent(), 0);
    }

    #[test]
    fn test_send_unknown_channel() {
        let mut m = manager();
        assert_eq!(
            m.send_text(ChannelId(9), "x"),
            Err(NetworkError::UnknownChannel(9))
        );
    }

    #[test]
    fn test_text_message_delivered_once_in_order() {
        let (mut offerer, mut answerer, id) = open_pair("chat");
        while answerer.poll_event().is_some() {}

        offerer.send_text(id, "hello").unwrap();
        offerer.send_text(id, "").unwrap();
        offerer.send(id, &[1, 2]).unwrap();
        pump(&mut offerer, &mut answerer);

        let messages: Vec<DataChannelMessage> = std::iter::from_fn(|| answerer.poll_event())
            .filter_map(|e| match e {
                DataChannelEvent::Message { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(
            messages,
            vec![
                DataChannelMessage::Text("hello".to_string()),
                DataChannelMessage::Text(String::new()),
                DataChannelMessage::Binary(vec![1, 2]),
            ]
        );
        assert_eq!(offerer.channel(id).unwrap().bytes_sent(), 7);
        assert_eq!(answerer.channels().next().unwrap().bytes_received(), 7);
    }

    #[test]
    fn test_close_notifies_peer_and_is_idempotent() {
        let (mut offerer, mut answerer, id) = open_pair("chat");
        while offerer.poll_event().is_some() {}
        while answerer.poll_event().is_some() {}

        offerer.close_channel(id).unwrap();
        offerer.close_channel(id).unwrap();
        assert_eq!(
            offerer.channel(id).unwrap().state(),
            DataChannelState::Closed
        );
        let states: Vec<DataChannelEvent> = std::iter::from_fn(|| offerer.poll_event()).collect();
        assert_eq!(states.len(), 2);

        pump(&mut offerer, &mut answerer);
        assert_eq!(
            answerer.channels().next().unwrap().state(),
            DataChannelState::Closed
        );
        assert!(offerer.send_text(id, "late").is_err());
    }

    #[test]
    fn test_close_connecting_channel_sends_nothing() {
        let mut m = manager();
        let id = m.create_channel(DataChannelConfig::reliable("chat")).unwrap();
        m.close_channel(id).unwrap();
        assert!(m.poll_outgoing().is_none());
        assert_eq!(m.channel(id).unwrap().state(), DataChannelState::Closed);
        assert_eq!(m.announce_pending(), 0);
    }

    #[test]
    fn test_close_all_drops_outgoing() {
        let (mut offerer, _answerer, id) = open_pair("chat");
        offerer.send_text(id, "pending").unwrap();
        offerer.close_all();
        assert!(offerer.poll_outgoing().is_none());
        assert!(!offerer.channel(id).unwrap().is_open());

        let states: Vec<DataChannelState> = std::iter::from_fn(|| offerer.poll_event())
            .filter_map(|event| match event {
                DataChannelEvent::StateChanged { state, .. } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                DataChannelState::Open,
                DataChannelState::Closing,
                DataChannelState::Closed
            ]
        );
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        let (_offerer, mut answerer, _) = open_pair("chat");
        while answerer.poll_event().is_some() {}

        answerer.handle_frame(Frame::ChannelData {
            stream_id: 0,
            ppid: ppid::DCEP,
            payload: vec![0x7f],
        });
        answerer.handle_frame(Frame::ChannelData {
            stream_id: 0,
            ppid: ppid::STRING,
            payload: vec![0xff, 0xfe],
        });
        answerer.handle_frame(Frame::ChannelData {
            stream_id: 42,
            ppid: ppid::STRING,
            payload: b"nobody".to_vec(),
        });
        answerer.handle_frame(Frame::ChannelData {
            stream_id: 0,
            ppid: 99,
            payload: b"?".to_vec(),
        });
        assert!(answerer.poll_event().is_none());
    }

    #[test]
    fn test_duplicate_open_ignored() {
        let (mut offerer, mut answerer, _) = open_pair("chat");
        while answerer.poll_event().is_some() {}
        drain(&mut offerer);

        answerer.handle_frame(Frame::ChannelData {
            stream_id: 0,
            ppid: ppid::DCEP,
            payload: DataChannelOpen::reliable("again", true).to_bytes().unwrap(),
        });
        assert_eq!(answerer.channels().count(), 1);
        assert!(answerer.poll_outgoing().is_none());
    }

    #[test]
    fn test_create_rejects_unannounceable_label() {
        let mut m = manager();
        assert_eq!(
            m.create_channel(DataChannelConfig::reliable("x".repeat(65_541))),
            Err(NetworkError::FieldTooLong {
                field: "label",
                len: 65_541
            })
        );
        assert!(!m.has_channels());
        assert_eq!(m.announce_pending(), 0);
    }

    #[test]
    fn test_protocol_carried_to_peer() {
        let mut offerer = manager();
        let mut answerer = manager();
        answerer.set_initiator(false);

        offerer
            .create_channel(DataChannelConfig {
                protocol: "json".to_string(),
                ..DataChannelConfig::reliable("chat")
            })
            .unwrap();
        offerer.announce_pending();
        pump(&mut offerer, &mut answerer);

        let remote = answerer.channels().next().unwrap();
        assert_eq!(remote.label(), "chat");
        assert_eq!(remote.protocol(), "json");
    }
}
