//! Network Module - data channels and the datagram wire format
//!
//! Everything an endpoint puts on the wire is a [`Datagram`] carrying one
//! encoded [`Frame`]: connectivity checks, data channel establishment
//! (DCEP), user messages and channel teardown.

pub mod datachannel;
pub mod datagram;
pub mod dcep;
pub mod error;
pub mod frame;

pub use datachannel::{
    ChannelId, DataChannel, DataChannelConfig, DataChannelEvent, DataChannelManager,
    DataChannelMessage, DataChannelState,
};
pub use datagram::Datagram;
pub use dcep::{
    ChannelType, DataChannelAck, DataChannelOpen, DcepMessage, DcepMessageType, MAX_FIELD_LEN, ppid,
};
pub use error::{NetworkError, Result};
pub use frame::{Frame, TransactionId};

