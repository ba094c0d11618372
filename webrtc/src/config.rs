//! Endpoint configuration
//!
//! Addressing and naming parameters shared by the endpoints of a session.
//! Deserializable so it can live in the demo's JSON config file.

use crate::error::{Result, RtcError};
use ice::agent::MAX_HOST_CANDIDATES;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Configuration for one session endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Address every host candidate is gathered on
    loopback_address: IpAddr,
    /// Number of host candidates, one port each
    host_candidates: usize,
    /// First candidate port
    base_port: u16,
    /// `s=` line of generated descriptions
    session_name: String,
    /// Negotiate an `m=application` section when channels exist
    data_channels: bool,
}

impl EndpointConfig {
    pub fn loopback_address(&self) -> IpAddr {
        self.loopback_address
    }

    pub fn host_candidates(&self) -> usize {
        self.host_candidates
    }

    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn data_channels(&self) -> bool {
        self.data_channels
    }

    pub fn builder() -> EndpointConfigBuilder {
        EndpointConfigBuilder::default()
    }

    /// Same configuration with candidates starting at `port`.
    pub fn with_base_port(mut self, port: u16) -> Self {
        self.base_port = port;
        self
    }

    /// Checks the candidate count and that the port range fits in `u16`.
    pub fn validate(&self) -> Result<()> {
        if self.host_candidates == 0 || self.host_candidates > MAX_HOST_CANDIDATES {
            return Err(RtcError::Configuration(format!(
                "host_candidates must be between 1 and {}",
                MAX_HOST_CANDIDATES
            )));
        }
        if self.base_port == 0 {
            return Err(RtcError::Configuration(
                "base_port must not be 0".to_string(),
            ));
        }
        let last = usize::from(self.base_port) + self.host_candidates - 1;
        if last > usize::from(u16::MAX) {
            return Err(RtcError::Configuration(format!(
                "port range {}..={} overflows",
                self.base_port, last
            )));
        }
        if self.session_name.trim().is_empty() {
            return Err(RtcError::Configuration(
                "session_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            loopback_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            host_candidates: 1,
            base_port: 50000,
            session_name: "loopback".to_string(),
            data_channels: true,
        }
    }
}

/// Builder for EndpointConfig
#[derive(Debug, Clone, Default)]
pub struct EndpointConfigBuilder {
    config: EndpointConfig,
}

impl EndpointConfigBuilder {
    pub fn loopback_address(mut self, address: IpAddr) -> Self {
        self.config.loopback_address = address;
        self
    }

    pub fn host_candidates(mut self, count: usize) -> Self {
        self.config.host_candidates = count;
        self
    }

    pub fn base_port(mut self, port: u16) -> Self {
        self.config.base_port = port;
        self
    }

    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.config.session_name = name.into();
        self
    }

    pub fn data_channels(mut self, enabled: bool) -> Self {
        self.config.data_channels = enabled;
        self
    }

    pub fn build(self) -> Result<EndpointConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EndpointConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_port(), 50000);
        assert_eq!(config.host_candidates(), 1);
        assert!(config.loopback_address().is_loopback());
    }

    #[test]
    fn test_builder_rejects_bad_candidate_count() {
        assert!(EndpointConfig::builder().host_candidates(0).build().is_err());
        assert!(
            EndpointConfig::builder()
                .host_candidates(MAX_HOST_CANDIDATES + 1)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_rejects_port_overflow() {
        let result = EndpointConfig::builder()
            .base_port(u16::MAX)
            .host_candidates(2)
            .build();
        assert!(matches!(result, Err(RtcError::Configuration(_))));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"base_port": 40000, "loopback_address": "::1"}"#).unwrap();
        assert_eq!(config.base_port(), 40000);
        assert!(config.loopback_address().is_ipv6());
        assert_eq!(config.session_name(), "loopback");
    }
}
