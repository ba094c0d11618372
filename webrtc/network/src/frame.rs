//! Datagram payload framing.
//!
//! Every frame starts with a one-byte kind:
//!
//! | kind | body |
//! |------|------|
//! | 0x01 binding request  | transaction id (12) · username length (u16) · username |
//! | 0x02 binding response | transaction id (12) |
//! | 0x10 channel data     | stream id (u16) · PPID (u32) · payload |
//! | 0x11 channel close    | stream id (u16) |
//!
//! All integers are big-endian.

use crate::dcep::field_len;
use crate::error::{NetworkError, Result};

pub type TransactionId = [u8; 12];

const KIND_BINDING_REQUEST: u8 = 0x01;
const KIND_BINDING_RESPONSE: u8 = 0x02;
const KIND_CHANNEL_DATA: u8 = 0x10;
const KIND_CHANNEL_CLOSE: u8 = 0x11;

const TRANSACTION_ID_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Connectivity check; `username` is `remote_ufrag:local_ufrag`.
    BindingRequest {
        transaction_id: TransactionId,
        username: String,
    },
    BindingResponse {
        transaction_id: TransactionId,
    },
    /// DCEP message or user data on one stream.
    ChannelData {
        stream_id: u16,
        ppid: u32,
        payload: Vec<u8>,
    },
    ChannelClose {
        stream_id: u16,
    },
}

impl Frame {
    pub fn new_transaction_id() -> TransactionId {
        rand::random()
    }

    /// Wire bytes of the frame. Fails only when the username does not fit
    /// its length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            Frame::BindingRequest {
                transaction_id,
                username,
            } => {
                let name = username.as_bytes();
                let name_len = field_len("username", name)?;
                let mut buf = Vec::with_capacity(1 + TRANSACTION_ID_LEN + 2 + name.len());
                buf.push(KIND_BINDING_REQUEST);
                buf.extend_from_slice(transaction_id);
                buf.extend_from_slice(&name_len.to_be_bytes());
                buf.extend_from_slice(name);
                buf
            }
            Frame::BindingResponse { transaction_id } => {
                let mut buf = Vec::with_capacity(1 + TRANSACTION_ID_LEN);
                buf.push(KIND_BINDING_RESPONSE);
                buf.extend_from_slice(transaction_id);
                buf
            }
            Frame::ChannelData {
                stream_id,
                ppid,
                payload,
            } => {
                let mut buf = Vec::with_capacity(7 + payload.len());
                buf.push(KIND_CHANNEL_DATA);
                buf.extend_from_slice(&stream_id.to_be_bytes());
                buf.extend_from_slice(&ppid.to_be_bytes());
                buf.extend_from_slice(payload);
                buf
            }
            Frame::ChannelClose { stream_id } => {
                let mut buf = Vec::with_capacity(3);
                buf.push(KIND_CHANNEL_CLOSE);
                buf.extend_from_slice(&stream_id.to_be_bytes());
                buf
            }
        };
        Ok(bytes)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let (&kind, body) = data
            .split_first()
            .ok_or_else(|| invalid("empty datagram"))?;

        match kind {
            KIND_BINDING_REQUEST => {
                let transaction_id = transaction_id(body)?;
                let rest = &body[TRANSACTION_ID_LEN..];
                if rest.len() < 2 {
                    return Err(invalid("binding request missing username length"));
                }
                let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
                let name = rest
                    .get(2..2 + len)
                    .ok_or_else(|| invalid("binding request username truncated"))?;
                let username = String::from_utf8(name.to_vec())
                    .map_err(|_| invalid("binding request username is not UTF-8"))?;
                Ok(Frame::BindingRequest {
                    transaction_id,
                    username,
                })
            }
            KIND_BINDING_RESPONSE => Ok(Frame::BindingResponse {
                transaction_id: transaction_id(body)?,
            }),
            KIND_CHANNEL_DATA => {
                if body.len() < 6 {
                    return Err(invalid("channel data header truncated"));
                }
                Ok(Frame::ChannelData {
                    stream_id: u16::from_be_bytes([body[0], body[1]]),
                    ppid: u32::from_be_bytes([body[2], body[3], body[4], body[5]]),
                    payload: body[6..].to_vec(),
                })
            }
            KIND_CHANNEL_CLOSE => {
                if body.len() < 2 {
                    return Err(invalid("channel close truncated"));
                }
                Ok(Frame::ChannelClose {
                    stream_id: u16::from_be_bytes([body[0], body[1]]),
                })
            }
            other => Err(NetworkError::InvalidFrame(format!(
                "unknown frame kind 0x{:02x}",
                other
            ))),
        }
    }
}

fn transaction_id(body: &[u8]) -> Result<TransactionId> {
    body.get(..TRANSACTION_ID_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| invalid("transaction id truncated"))
}

fn invalid(message: &str) -> NetworkError {
    NetworkError::InvalidFrame(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcep::ppid;

    #[test]
    fn test_binding_request_layout() {
        let frame = Frame::BindingRequest {
            transaction_id: [7; 12],
            username: "rem:loc".to_string(),
        };
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[13..15], &[0, 7]);
        assert_eq!(Frame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_channel_data_layout() {
        let frame = Frame::ChannelData {
            stream_id: 2,
            ppid: ppid::STRING,
            payload: b"hello".to_vec(),
        };
        let bytes = frame.encode().unwrap();
        assert_eq!(&bytes[..7], &[0x10, 0, 2, 0, 0, 0, 51]);
        assert_eq!(Frame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_empty_payload_channel_data() {
        let frame = Frame::ChannelData {
            stream_id: 1,
            ppid: ppid::STRING_EMPTY,
            payload: Vec::new(),
        };
        assert_eq!(Frame::decode(&frame.encode().unwrap()).unwrap(), frame);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Frame::decode(&[]).is_err());
        assert!(Frame::decode(&[0x42, 1, 2]).is_err());
        assert!(Frame::decode(&[0x02, 1, 2, 3]).is_err());
        assert!(Frame::decode(&[0x10, 0, 1, 0]).is_err());
        assert!(Frame::decode(&[0x11, 0]).is_err());

        let mut request = Frame::BindingRequest {
            transaction_id: [1; 12],
            username: "abcd:efgh".to_string(),
        }
        .encode()
        .unwrap();
        request.truncate(18);
        assert!(Frame::decode(&request).is_err());
    }

    #[test]
    fn test_oversized_username_is_refused() {
        let frame = Frame::BindingRequest {
            transaction_id: [3; 12],
            username: "u".repeat(70_000),
        };
        assert_eq!(
            frame.encode().unwrap_err(),
            NetworkError::FieldTooLong {
                field: "username",
                len: 70_000
            }
        );
    }

    #[test]
    fn test_transaction_ids_differ() {
        assert_ne!(Frame::new_transaction_id(), Frame::new_transaction_id());
    }
}
