//! Complete SDP session description.
//!
//! Parsing accepts both CRLF and bare LF line endings; serialization always
//! writes CRLF.

use crate::{
    attribute::Attribute, errors::SdpError, media_description::MediaDescription, origin::Origin,
    sdp_type::SdpType, session_description_builder::SessionDescriptionBuilder, timing::Timing,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub version: i32,
    pub origin: Origin,
    pub session_name: String,
    pub timing: Timing,
    pub media: Vec<MediaDescription>,
    pub attributes: Vec<Attribute>,
}

/// Line kinds we understand. Everything else (`i=`, `u=`, `b=`, `c=` ...) is
/// skipped while parsing.
enum SdpLineType {
    Version,
    Origin,
    SessionName,
    Timing,
    Media,
    Attribute,
    Unknown,
}

impl From<char> for SdpLineType {
    fn from(c: char) -> Self {
        match c {
            'v' => Self::Version,
            'o' => Self::Origin,
            's' => Self::SessionName,
            't' => Self::Timing,
            'm' => Self::Media,
            'a' => Self::Attribute,
            _ => Self::Unknown,
        }
    }
}

impl SessionDescription {
    pub fn new(sdp_type: SdpType) -> Self {
        Self {
            sdp_type,
            version: 0,
            origin: Origin::default(),
            session_name: String::from("-"),
            timing: Timing::default(),
            media: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn builder(sdp_type: SdpType) -> SessionDescriptionBuilder {
        SessionDescriptionBuilder::new(sdp_type)
    }

    /// Parses and validates an SDP body.
    ///
    /// # Errors
    /// Any line that is not `x=value`, any malformed known line, and any
    /// validation failure (see [`SessionDescription::validate`]).
    pub fn parse(sdp_type: SdpType, sdp_str: &str) -> Result<Self, SdpError> {
        let mut session = SessionDescription::new(sdp_type);
        let mut current_media: Option<MediaDescription> = None;

        for line in sdp_str.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let (type_char, value) = Self::split_line(line)?;
            match SdpLineType::from(type_char) {
                SdpLineType::Version => {
                    session.version = value.parse().map_err(|_| SdpError::InvalidVersion)?;
                }
                SdpLineType::Origin => session.origin = Origin::parse(value)?,
                SdpLineType::SessionName => session.session_name = value.to_string(),
                SdpLineType::Timing => session.timing = Timing::parse(value)?,
                SdpLineType::Media => {
                    if let Some(media) = current_media.replace(MediaDescription::parse(value)?) {
                        session.media.push(media);
                    }
                }
                SdpLineType::Attribute => {
                    let attr = Attribute::parse(value);
                    match current_media.as_mut() {
                        Some(media) => media.attributes.push(attr),
                        None => session.attributes.push(attr),
                    }
                }
                SdpLineType::Unknown => {}
            }
        }

        if let Some(media) = current_media {
            session.media.push(media);
        }

        session.validate()?;
        Ok(session)
    }

    fn split_line(line: &str) -> Result<(char, &str), SdpError> {
        let (type_str, value) = line.split_once('=').ok_or(SdpError::InvalidLineFormat)?;
        let mut chars = type_str.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok((c, value)),
            _ => Err(SdpError::InvalidLineFormat),
        }
    }

    /// Checks version 0, a valid origin, a non-empty session name, valid
    /// timing, at least one valid media section and unique `a=mid` values.
    pub fn validate(&self) -> Result<(), SdpError> {
        if self.version != 0 {
            return Err(SdpError::InvalidVersionNumber);
        }

        self.origin.validate()?;

        if self.session_name.is_empty() {
            return Err(SdpError::EmptySessionName);
        }

        self.timing.validate()?;

        if self.media.is_empty() {
            return Err(SdpError::NoMediaSections);
        }

        let mut mids = HashSet::new();
        for media in &self.media {
            media.validate()?;
            if let Some(mid) = media.mid() {
                if !mids.insert(mid) {
                    return Err(SdpError::DuplicateMid(mid.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Session-level attribute value, falling back to the first media
    /// section that carries it.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
            .or_else(|| self.media.iter().find_map(|m| m.attribute(name)))
    }

    pub fn ice_ufrag(&self) -> Option<&str> {
        self.attribute("ice-ufrag")
    }

    pub fn ice_pwd(&self) -> Option<&str> {
        self.attribute("ice-pwd")
    }

    /// Media ids listed in `a=group:BUNDLE`.
    pub fn bundle_mids(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.name == "group")
            .filter_map(|a| a.value.as_deref())
            .filter_map(|v| v.strip_prefix("BUNDLE"))
            .flat_map(str::split_whitespace)
            .collect()
    }

    pub fn has_data_channel(&self) -> bool {
        self.media.iter().any(MediaDescription::is_data_channel)
    }
}

impl Default for SessionDescription {
    fn default() -> Self {
        Self::new(SdpType::Offer)
    }
}

/// Serializes in RFC 4566 order: `v=`, `o=`, `s=`, `t=`, session attributes,
/// then each media section with its attributes.
impl std::fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v={}\r\n", self.version)?;
        write!(f, "{}", self.origin)?;
        write!(f, "s={}\r\n", self.session_name)?;
        write!(f, "{}", self.timing)?;

        for attr in &self.attributes {
            write!(f, "{}", attr)?;
        }

        for media in &self.media {
            write!(f, "{}", media)?;
        }

        Ok(())
    }
}
