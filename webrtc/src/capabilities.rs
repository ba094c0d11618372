//! Transport capability resolution.
//!
//! Decided once when a pair of endpoints is wired up; endpoints only read
//! the result.

use crate::config::EndpointConfig;
use crate::error::{Result, RtcError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Datagrams handed between endpoints of the same process
    Loopback,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Loopback => f.write_str("loopback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportCapabilities {
    pub kind: TransportKind,
    pub data_channels: bool,
    pub trickle_ice: bool,
}

impl TransportCapabilities {
    /// Picks the transport for `config`.
    ///
    /// # Errors
    /// `Configuration` when the config is invalid or asks for an address no
    /// available transport can serve.
    pub fn resolve(config: &EndpointConfig) -> Result<Self> {
        config.validate()?;

        if !config.loopback_address().is_loopback() {
            return Err(RtcError::Configuration(format!(
                "{} is not a loopback address; only the loopback transport is available",
                config.loopback_address()
            )));
        }

        Ok(Self {
            kind: TransportKind::Loopback,
            data_channels: config.data_channels(),
            trickle_ice: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_resolve_loopback() {
        let caps = TransportCapabilities::resolve(&EndpointConfig::default()).unwrap();
        assert_eq!(caps.kind, TransportKind::Loopback);
        assert!(caps.data_channels);
        assert!(caps.trickle_ice);
    }

    #[test]
    fn test_resolve_rejects_routable_address() {
        let config = EndpointConfig::builder()
            .loopback_address(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)))
            .build()
            .unwrap();
        assert!(matches!(
            TransportCapabilities::resolve(&config),
            Err(RtcError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_without_data_channels() {
        let config = EndpointConfig::builder().data_channels(false).build().unwrap();
        let caps = TransportCapabilities::resolve(&config).unwrap();
        assert!(!caps.data_channels);
    }
}
