//! Individual data channel

use crate::dcep::field_len;
use crate::error::{NetworkError, Result};
use std::fmt;

/// Local handle of a data channel. Stable for the lifetime of the
/// endpoint, independent of the stream id used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u16);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChannelState {
    /// Waiting for the transport or for the peer's ACK
    Connecting,
    Open,
    Closing,
    Closed,
}

impl fmt::Display for DataChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataChannelState::Connecting => "connecting",
            DataChannelState::Open => "open",
            DataChannelState::Closing => "closing",
            DataChannelState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChannelConfig {
    pub label: String,
    /// Whether messages are delivered in order
    pub ordered: bool,
    /// Sub-protocol
    pub protocol: String,
}

impl DataChannelConfig {
    /// Reliable ordered channel.
    pub fn reliable(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ordered: true,
            protocol: String::new(),
        }
    }

    /// Label and protocol must fit the DATA_CHANNEL_OPEN length fields.
    pub fn validate(&self) -> Result<()> {
        field_len("label", self.label.as_bytes())?;
        field_len("protocol", self.protocol.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DataChannel {
    id: ChannelId,
    /// Assigned when the channel is announced or accepted
    stream_id: Option<u16>,
    config: DataChannelConfig,
    state: DataChannelState,
    bytes_sent: u64,
    bytes_received: u64,
    messages_sent: u64,
    messages_received: u64,
}

impl DataChannel {
    pub fn new(id: ChannelId, config: DataChannelConfig) -> Self {
        Self {
            id,
            stream_id: None,
            config,
            state: DataChannelState::Connecting,
            bytes_sent: 0,
            bytes_received: 0,
            messages_sent: 0,
            messages_received: 0,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn stream_id(&self) -> Option<u16> {
        self.stream_id
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn protocol(&self) -> &str {
        &self.config.protocol
    }

    pub fn state(&self) -> DataChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DataChannelState::Open
    }

    pub fn is_ordered(&self) -> bool {
        self.config.ordered
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    /// Accounts for an outgoing message. Fails without touching any
    /// counter when the channel is not open.
    pub(crate) fn record_send(&mut self, len: usize) -> Result<()> {
        if self.state != DataChannelState::Open {
            return Err(NetworkError::ChannelNotOpen(self.config.label.clone()));
        }
        self.bytes_sent += len as u64;
        self.messages_sent += 1;
        Ok(())
    }

    pub(crate) fn record_receive(&mut self, len: usize) {
        self.bytes_received += len as u64;
        self.messages_received += 1;
    }

    pub(crate) fn assign_stream(&mut self, stream_id: u16) {
        self.stream_id = Some(stream_id);
    }

    pub(crate) fn on_open(&mut self) -> bool {
        if self.state == DataChannelState::Connecting {
            self.state = DataChannelState::Open;
            true
        } else {
            false
        }
    }

    /// Connecting/Open -> Closing. Returns false if already closing or closed.
    pub(crate) fn begin_close(&mut self) -> bool {
        match self.state {
            DataChannelState::Open | DataChannelState::Connecting => {
                self.state = DataChannelState::Closing;
                true
            }
            DataChannelState::Closing | DataChannelState::Closed => false,
        }
    }

    pub(crate) fn on_closed(&mut self) {
        self.state = DataChannelState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_creation() {
        let channel = DataChannel::new(ChannelId(0), DataChannelConfig::reliable("chat"));
        assert_eq!(channel.id(), ChannelId(0));
        assert_eq!(channel.label(), "chat");
        assert!(channel.is_ordered());
        assert_eq!(channel.state(), DataChannelState::Connecting);
        assert!(channel.stream_id().is_none());
    }

    #[test]
    fn test_config_rejects_oversized_fields() {
        assert!(DataChannelConfig::reliable("chat").validate().is_ok());
        assert_eq!(
            DataChannelConfig::reliable("x".repeat(65_541)).validate(),
            Err(NetworkError::FieldTooLong {
                field: "label",
                len: 65_541
            })
        );

        let config = DataChannelConfig {
            protocol: "p".repeat(65_536),
            ..DataChannelConfig::reliable("chat")
        };
        assert!(matches!(
            config.validate(),
            Err(NetworkError::FieldTooLong {
                field: "protocol",
                ..
            })
        ));
    }

    #[test]
    fn test_record_send_requires_open() {
        let mut channel = DataChannel::new(ChannelId(0), DataChannelConfig::reliable("chat"));
        assert_eq!(
            channel.record_send(3),
            Err(NetworkError::ChannelNotOpen("chat".to_string()))
        );
        assert_eq!(channel.bytes_sent(), 0);

        assert!(channel.on_open());
        channel.record_send(3).unwrap();
        channel.record_receive(5);
        assert_eq!(channel.bytes_sent(), 3);
        assert_eq!(channel.bytes_received(), 5);
        assert_eq!(channel.messages_sent(), 1);
    }

    #[test]
    fn test_close_transitions() {
        let mut channel = DataChannel::new(ChannelId(0), DataChannelConfig::reliable("chat"));
        channel.on_open();
        assert!(channel.begin_close());
        assert_eq!(channel.state(), DataChannelState::Closing);
        assert!(!channel.begin_close());
        channel.on_closed();
        assert!(!channel.begin_close());
        assert!(!channel.on_open());
        assert_eq!(channel.state().to_string(), "closed");
    }
}
