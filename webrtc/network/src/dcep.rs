//! Data Channel Establishment Protocol (RFC 8832)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Message Type |  Channel Type |            Priority           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Reliability Parameter                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         Label Length          |       Protocol Length         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                             Label                             /
//! /                            Protocol                           /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::error::{NetworkError, Result};

/// Payload protocol identifiers carried with every channel frame.
pub mod ppid {
    pub const DCEP: u32 = 50;
    /// UTF-8 text
    pub const STRING: u32 = 51;
    pub const BINARY: u32 = 53;
    pub const STRING_EMPTY: u32 = 56;
    pub const BINARY_EMPTY: u32 = 57;
}

const OPEN_HEADER_LEN: usize = 12;

/// Longest label or protocol an OPEN message can carry.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DcepMessageType {
    DataChannelOpen = 0x03,
    DataChannelAck = 0x02,
}

impl DcepMessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(Self::DataChannelOpen),
            0x02 => Some(Self::DataChannelAck),
            _ => None,
        }
    }
}

/// Reliability and ordering of a channel as announced in the OPEN message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelType {
    Reliable = 0x00,
    ReliableUnordered = 0x80,
    PartialReliableRexmit = 0x01,
    PartialReliableRexmitUnordered = 0x81,
    PartialReliableTimed = 0x02,
    PartialReliableTimedUnordered = 0x82,
}

impl ChannelType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Reliable),
            0x80 => Some(Self::ReliableUnordered),
            0x01 => Some(Self::PartialReliableRexmit),
            0x81 => Some(Self::PartialReliableRexmitUnordered),
            0x02 => Some(Self::PartialReliableTimed),
            0x82 => Some(Self::PartialReliableTimedUnordered),
            _ => None,
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Reliable | Self::PartialReliableRexmit | Self::PartialReliableTimed
        )
    }
}

/// DATA_CHANNEL_OPEN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChannelOpen {
    pub channel_type: ChannelType,
    pub priority: u16,
    pub reliability_param: u32,
    pub label: String,
    pub protocol: String,
}

impl DataChannelOpen {
    /// Reliable channel, ordered or not.
    pub fn reliable(label: impl Into<String>, ordered: bool) -> Self {
        Self {
            channel_type: if ordered {
                ChannelType::Reliable
            } else {
                ChannelType::ReliableUnordered
            },
            priority: 0,
            reliability_param: 0,
            label: label.into(),
            protocol: String::new(),
        }
    }

    /// Encodes the message; a label or protocol over [`MAX_FIELD_LEN`]
    /// bytes is refused rather than cut short.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let label_bytes = self.label.as_bytes();
        let protocol_bytes = self.protocol.as_bytes();
        let label_len = field_len("label", label_bytes)?;
        let protocol_len = field_len("protocol", protocol_bytes)?;
        let mut buf =
            Vec::with_capacity(OPEN_HEADER_LEN + label_bytes.len() + protocol_bytes.len());

        buf.push(DcepMessageType::DataChannelOpen as u8);
        buf.push(self.channel_type as u8);
        buf.extend_from_slice(&self.priority.to_be_bytes());
        buf.extend_from_slice(&self.reliability_param.to_be_bytes());
        buf.extend_from_slice(&label_len.to_be_bytes());
        buf.extend_from_slice(&protocol_len.to_be_bytes());
        buf.extend_from_slice(label_bytes);
        buf.extend_from_slice(protocol_bytes);

        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < OPEN_HEADER_LEN {
            return Err(invalid("DATA_CHANNEL_OPEN too short"));
        }
        if data[0] != DcepMessageType::DataChannelOpen as u8 {
            return Err(invalid("not a DATA_CHANNEL_OPEN message"));
        }

        let channel_type =
            ChannelType::from_u8(data[1]).ok_or_else(|| invalid("invalid channel type"))?;
        let priority = u16::from_be_bytes([data[2], data[3]]);
        let reliability_param = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let label_len = u16::from_be_bytes([data[8], data[9]]) as usize;
        let protocol_len = u16::from_be_bytes([data[10], data[11]]) as usize;

        let label_end = OPEN_HEADER_LEN + label_len;
        let protocol_end = label_end + protocol_len;
        if data.len() < protocol_end {
            return Err(invalid("DATA_CHANNEL_OPEN truncated"));
        }

        let label = String::from_utf8(data[OPEN_HEADER_LEN..label_end].to_vec())
            .map_err(|_| invalid("invalid label UTF-8"))?;
        let protocol = String::from_utf8(data[label_end..protocol_end].to_vec())
            .map_err(|_| invalid("invalid protocol UTF-8"))?;

        Ok(Self {
            channel_type,
            priority,
            reliability_param,
            label,
            protocol,
        })
    }
}

/// DATA_CHANNEL_ACK
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataChannelAck;

impl DataChannelAck {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![DcepMessageType::DataChannelAck as u8]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match data.first() {
            Some(&b) if b == DcepMessageType::DataChannelAck as u8 => Ok(Self),
            _ => Err(invalid("not a DATA_CHANNEL_ACK message")),
        }
    }
}

/// Either DCEP message, dispatched on the first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DcepMessage {
    Open(DataChannelOpen),
    Ack,
}

impl DcepMessage {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let kind = data
            .first()
            .copied()
            .and_then(DcepMessageType::from_u8)
            .ok_or_else(|| invalid("unknown DCEP message type"))?;
        match kind {
            DcepMessageType::DataChannelOpen => DataChannelOpen::from_bytes(data).map(Self::Open),
            DcepMessageType::DataChannelAck => DataChannelAck::from_bytes(data).map(|_| Self::Ack),
        }
    }
}

/// 16-bit length prefix for `bytes`.
pub(crate) fn field_len(field: &'static str, bytes: &[u8]) -> Result<u16> {
    u16::try_from(bytes.len()).map_err(|_| NetworkError::FieldTooLong {
        field,
        len: bytes.len(),
    })
}

fn invalid(message: &str) -> NetworkError {
    NetworkError::InvalidFrame(message.to_string())
}
