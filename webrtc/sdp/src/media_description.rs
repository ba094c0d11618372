//! Media sections (`m=` and the attributes that follow it).

use crate::{attribute::Attribute, direction::Direction, errors::SdpError};

/// A media section as defined in RFC 4566 §5.14.
///
/// ```text
/// m=<media> <port> <proto> <fmt> ...
/// a=...
/// ```
///
/// Besides audio and video, offers carry one `application` section for the
/// data channels (`UDP/DTLS/SCTP webrtc-datachannel`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    pub media_type: String,
    pub port: u16,
    pub protocol: String,
    pub formats: Vec<String>,
    pub attributes: Vec<Attribute>,
}

const VALID_MEDIA_TYPES: &[&str] = &["audio", "video", "text", "application", "message"];

/// Protocol for RTP media sections.
pub const RTP_PROTOCOL: &str = "UDP/TLS/RTP/SAVPF";
/// Protocol and format for the data channel section.
pub const DATA_CHANNEL_PROTOCOL: &str = "UDP/DTLS/SCTP";
pub const DATA_CHANNEL_FORMAT: &str = "webrtc-datachannel";

impl MediaDescription {
    pub fn new(
        media_type: impl Into<String>,
        port: u16,
        protocol: impl Into<String>,
        formats: Vec<String>,
    ) -> Self {
        Self {
            media_type: media_type.into(),
            port,
            protocol: protocol.into(),
            formats,
            attributes: Vec::new(),
        }
    }

    /// The `m=application` section that negotiates data channels.
    pub fn data_channel(port: u16) -> Self {
        Self::new(
            "application",
            port,
            DATA_CHANNEL_PROTOCOL,
            vec![DATA_CHANNEL_FORMAT.to_string()],
        )
    }

    /// Parses the part after `m=`.
    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(SdpError::InvalidMediaFormat);
        }

        let port = parts[1].parse().map_err(|_| SdpError::InvalidPort)?;

        Ok(Self::new(
            parts[0],
            port,
            parts[2],
            parts[3..].iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn validate(&self) -> Result<(), SdpError> {
        if !VALID_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(SdpError::InvalidMediaType(self.media_type.clone()));
        }
        if self.formats.is_empty() {
            return Err(SdpError::NoMediaFormats);
        }
        Ok(())
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Value of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.name == name)
            .filter_map(|a| a.value.as_deref())
    }

    pub fn mid(&self) -> Option<&str> {
        self.attribute("mid")
    }

    /// Direction flag of the section; `sendrecv` when none is present.
    pub fn direction(&self) -> Direction {
        self.attributes
            .iter()
            .filter(|a| a.value.is_none())
            .find_map(|a| a.name.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_data_channel(&self) -> bool {
        self.media_type == "application"
            && self.formats.iter().any(|f| f == DATA_CHANNEL_FORMAT)
    }

    /// Audio or video.
    pub fn is_rtp(&self) -> bool {
        self.media_type == "audio" || self.media_type == "video"
    }
}

impl std::fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "m={} {} {} {}\r\n",
            self.media_type,
            self.port,
            self.protocol,
            self.formats.join(" ")
        )?;

        for attr in &self.attributes {
            write!(f, "{}", attr)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_description_parse_video() {
        let media = MediaDescription::parse("video 9 UDP/TLS/RTP/SAVPF 96 97").unwrap();
        assert_eq!(media.media_type, "video");
        assert_eq!(media.port, 9);
        assert_eq!(media.protocol, RTP_PROTOCOL);
        assert_eq!(media.formats, vec!["96", "97"]);
        assert!(media.is_rtp());
        assert!(!media.is_data_channel());
    }

    #[test]
    fn test_media_description_parse_invalid() {
        assert_eq!(
            MediaDescription::parse("audio 9 RTP/AVP").unwrap_err(),
            SdpError::InvalidMediaFormat
        );
        assert_eq!(
            MediaDescription::parse("audio 99999 RTP/AVP 0").unwrap_err(),
            SdpError::InvalidPort
        );
    }

    #[test]
    fn test_media_description_validate_type() {
        let media = MediaDescription::new("hologram", 9, "RTP/AVP", vec!["0".into()]);
        assert_eq!(
            media.validate().unwrap_err(),
            SdpError::InvalidMediaType("hologram".to_string())
        );

        let empty = MediaDescription::new("audio", 9, "RTP/AVP", Vec::new());
        assert_eq!(empty.validate().unwrap_err(), SdpError::NoMediaFormats);
    }

    #[test]
    fn test_media_description_attribute_helpers() {
        let media = MediaDescription::data_channel(9)
            .with_attribute(Attribute::new("mid", "2"))
            .with_attribute(Attribute::flag("recvonly"))
            .with_attribute(Attribute::new("candidate", "1 1 UDP 1 127.0.0.1 5 typ host"))
            .with_attribute(Attribute::new("candidate", "2 1 UDP 1 127.0.0.1 6 typ host"));

        assert!(media.is_data_channel());
        assert_eq!(media.mid(), Some("2"));
        assert_eq!(media.direction(), Direction::RecvOnly);
        assert_eq!(media.attributes_named("candidate").count(), 2);
        assert!(media.has_attribute("recvonly"));
    }

    #[test]
    fn test_media_description_default_direction() {
        let media = MediaDescription::new("audio", 9, RTP_PROTOCOL, vec!["111".into()]);
        assert_eq!(media.direction(), Direction::SendRecv);
    }

    #[test]
    fn test_media_description_display() {
        let media = MediaDescription::data_channel(9).with_attribute(Attribute::new("mid", "0"));
        assert_eq!(
            media.to_string(),
            "m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\na=mid:0\r\n"
        );
    }
}
