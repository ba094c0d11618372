//! Origin line (`o=`).

use crate::errors::SdpError;

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
///
/// The session id is chosen once per endpoint; the version is bumped every
/// time the endpoint produces a new description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: String,
    pub address_type: String,
    pub unicast_address: String,
}

impl Origin {
    /// Origin for an endpoint reachable at `address`. The address type is
    /// derived from the literal (`IP6` when it contains a colon).
    pub fn new(session_id: u64, session_version: u64, address: &str) -> Self {
        let address_type = if address.contains(':') { "IP6" } else { "IP4" };
        Self {
            username: "-".to_string(),
            session_id,
            session_version,
            network_type: "IN".to_string(),
            address_type: address_type.to_string(),
            unicast_address: address.to_string(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let [username, id, version, net, addr_type, addr] = parts.as_slice() else {
            return Err(SdpError::InvalidOriginFormat);
        };

        Ok(Origin {
            username: username.to_string(),
            session_id: id.parse().map_err(|_| SdpError::InvalidSessionId)?,
            session_version: version.parse().map_err(|_| SdpError::InvalidSessionId)?,
            network_type: net.to_string(),
            address_type: addr_type.to_string(),
            unicast_address: addr.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), SdpError> {
        if self.network_type != "IN" {
            return Err(SdpError::InvalidNetworkType);
        }
        if self.address_type != "IP4" && self.address_type != "IP6" {
            return Err(SdpError::InvalidAddressType);
        }
        if self.session_id == 0 {
            return Err(SdpError::InvalidSessionId);
        }
        Ok(())
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new(0, 0, "0.0.0.0")
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "o={} {} {} {} {} {}\r\n",
            self.username,
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.unicast_address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_parse_valid() {
        let origin = Origin::parse("- 4611731400430051336 2 IN IP4 127.0.0.1").unwrap();
        assert_eq!(origin.username, "-");
        assert_eq!(origin.session_id, 4611731400430051336);
        assert_eq!(origin.session_version, 2);
        assert_eq!(origin.unicast_address, "127.0.0.1");
        assert!(origin.validate().is_ok());
    }

    #[test]
    fn test_origin_new_detects_ipv6() {
        let origin = Origin::new(7, 1, "::1");
        assert_eq!(origin.address_type, "IP6");
        assert!(origin.validate().is_ok());
    }

    #[test]
    fn test_origin_parse_invalid() {
        assert_eq!(
            Origin::parse("- 1 2 IN IP4").unwrap_err(),
            SdpError::InvalidOriginFormat
        );
        assert_eq!(
            Origin::parse("- abc 2 IN IP4 127.0.0.1").unwrap_err(),
            SdpError::InvalidSessionId
        );
    }

    #[test]
    fn test_origin_validate_rejects_zero_session() {
        assert_eq!(
            Origin::default().validate().unwrap_err(),
            SdpError::InvalidSessionId
        );
        let mut origin = Origin::new(9, 1, "127.0.0.1");
        origin.network_type = "XX".to_string();
        assert_eq!(origin.validate().unwrap_err(), SdpError::InvalidNetworkType);
    }

    #[test]
    fn test_origin_display() {
        let origin = Origin::new(123456, 3, "127.0.0.1");
        assert_eq!(origin.to_string(), "o=- 123456 3 IN IP4 127.0.0.1\r\n");
    }
}
