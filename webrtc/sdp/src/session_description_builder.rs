//! Builder for [`SessionDescription`].

use crate::{
    attribute::Attribute, errors::SdpError, media_description::MediaDescription, origin::Origin,
    sdp_type::SdpType, session_description::SessionDescription, timing::Timing,
};

/// Assembles a description field by field and validates it on `build()`.
///
/// ```
/// use sdp::{MediaDescription, Origin, SdpType, SessionDescriptionBuilder};
///
/// let sdp = SessionDescriptionBuilder::new(SdpType::Offer)
///     .origin(Origin::new(42, 1, "127.0.0.1"))
///     .session_name("loopback")
///     .ice_credentials("ufrg", "0123456789abcdef012345")
///     .add_media(MediaDescription::data_channel(9))
///     .bundle()
///     .build()
///     .unwrap();
/// assert_eq!(sdp.ice_ufrag(), Some("ufrg"));
/// ```
#[derive(Debug, Clone)]
pub struct SessionDescriptionBuilder {
    session: SessionDescription,
}

impl SessionDescriptionBuilder {
    pub fn new(sdp_type: SdpType) -> Self {
        Self {
            session: SessionDescription::new(sdp_type),
        }
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.session.origin = origin;
        self
    }

    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.session.session_name = name.into();
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.session.timing = timing;
        self
    }

    pub fn add_media(mut self, media: MediaDescription) -> Self {
        self.session.media.push(media);
        self
    }

    pub fn add_attribute(mut self, attr: Attribute) -> Self {
        self.session.attributes.push(attr);
        self
    }

    /// Session-level `a=ice-ufrag` / `a=ice-pwd`.
    pub fn ice_credentials(self, ufrag: &str, pwd: &str) -> Self {
        self.add_attribute(Attribute::new("ice-ufrag", ufrag))
            .add_attribute(Attribute::new("ice-pwd", pwd))
    }

    /// `a=group:BUNDLE` over the mids of the media added so far.
    pub fn bundle(mut self) -> Self {
        let mids: Vec<&str> = self
            .session
            .media
            .iter()
            .filter_map(MediaDescription::mid)
            .collect();
        if !mids.is_empty() {
            let value = format!("BUNDLE {}", mids.join(" "));
            self.session.attributes.push(Attribute::new("group", value));
        }
        self
    }

    pub fn build(self) -> Result<SessionDescription, SdpError> {
        self.session.validate()?;
        Ok(self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(mid: &str) -> MediaDescription {
        MediaDescription::data_channel(9).with_attribute(Attribute::new("mid", mid))
    }

    #[test]
    fn test_builder_complete_session() {
        let sdp = SessionDescriptionBuilder::new(SdpType::Answer)
            .origin(Origin::new(7, 2, "127.0.0.1"))
            .session_name("demo")
            .timing(Timing::default())
            .ice_credentials("u1", "p1")
            .add_media(media("0"))
            .bundle()
            .build()
            .unwrap();

        assert_eq!(sdp.sdp_type, SdpType::Answer);
        assert_eq!(sdp.origin.session_version, 2);
        assert_eq!(sdp.ice_pwd(), Some("p1"));
        assert_eq!(sdp.bundle_mids(), vec!["0"]);
        assert_eq!(sdp.bundle_mids(), vec!["0"]);
    }

    #[test]
    fn test_builder_validation_fails_no_media() {
        let result = SessionDescriptionBuilder::new(SdpType::Offer)
            .origin(Origin::new(1, 1, "127.0.0.1"))
            .build();
        assert_eq!(result.unwrap_err(), SdpError::NoMediaSections);
    }

    #[test]
    fn test_builder_validation_fails_empty_session_name() {
        let result = SessionDescriptionBuilder::new(SdpType::Offer)
            .origin(Origin::new(1, 1, "127.0.0.1"))
            .session_name("")
            .add_media(media("0"))
            .build();
        assert_eq!(result.unwrap_err(), SdpError::EmptySessionName);
    }

    #[test]
    fn test_builder_bundle_skips_sections_without_mid() {
        let sdp = SessionDescriptionBuilder::new(SdpType::Offer)
            .origin(Origin::new(1, 1, "127.0.0.1"))
            .add_media(MediaDescription::data_channel(9))
            .bundle()
            .build()
            .unwrap();
        assert!(sdp.bundle_mids().is_empty());
    }
}
