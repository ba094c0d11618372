//! Data channels
//!
//! Ordered message streams between two connected endpoints, opened with
//! the DCEP OPEN/ACK handshake once the transport is up.
//!
//! ## Usage
//!
//! ```
//! use network::{DataChannelConfig, DataChannelManager, DataChannelState};
//!
//! let mut manager = DataChannelManager::new(logging::Logger::disabled());
//! let id = manager.create_channel(DataChannelConfig::reliable("chat")).unwrap();
//! assert_eq!(manager.channel(id).unwrap().state(), DataChannelState::Connecting);
//! ```

mod channel;
mod manager;

pub use channel::{ChannelId, DataChannel, DataChannelConfig, DataChannelState};
pub use manager::{DataChannelEvent, DataChannelManager, DataChannelMessage};
