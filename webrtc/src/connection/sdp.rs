//! SDP handling for a session endpoint
//!
//! Builds offers and answers from the endpoint's ICE credentials, attached
//! media and data channel intent, and reads remote streams back out of a
//! peer's description.

use super::remote_stream::RemoteStream;
use crate::config::EndpointConfig;
use crate::error::{Result, RtcError};
use ice::IceAgent;
use logging::Logger;
use media::{CaptureHandle, MediaTrack, TrackKind};
use sdp::media_description::RTP_PROTOCOL;
use sdp::{Attribute, Direction, MediaDescription, Origin, SdpType, SessionDescription, Timing};

/// Port placed on every `m=` line; candidates carry the real addresses.
const DISCARD_PORT: u16 = 9;

/// Handles all SDP-related operations
pub(super) struct SdpHandler {
    session_id: u64,
    session_version: u64,
    session_name: String,
    address: String,
    logger: Logger,
}

impl SdpHandler {
    pub fn new(config: &EndpointConfig, logger: Logger) -> Self {
        Self {
            session_id: u64::from(rand::random::<u32>()),
            session_version: 0,
            session_name: config.session_name().to_string(),
            address: config.loopback_address().to_string(),
            logger,
        }
    }

    /// Offer with one section per local track plus `m=application` when
    /// `data_channel` is set.
    ///
    /// # Errors
    /// `SignalingFailure` when there is nothing to negotiate.
    pub fn create_offer(
        &mut self,
        ice_agent: &IceAgent,
        media: Option<&CaptureHandle>,
        data_channel: bool,
    ) -> Result<SessionDescription> {
        let mut sections = Vec::new();

        if let Some(handle) = media {
            for track in handle.tracks().iter().filter(|t| t.is_live()) {
                let mid = sections.len().to_string();
                sections.push(rtp_section(
                    track.kind(),
                    &mid,
                    Direction::SendRecv,
                    default_formats(track.kind()),
                    vec![default_rtpmap(track.kind()).to_string()],
                    Some((handle.id(), track)),
                ));
            }
        }

        if data_channel {
            let mid = sections.len().to_string();
            sections.push(
                MediaDescription::data_channel(DISCARD_PORT)
                    .with_attribute(Attribute::new("mid", mid)),
            );
        }

        if sections.is_empty() {
            return Err(RtcError::SignalingFailure(
                "nothing to negotiate: no local media and no data channel".to_string(),
            ));
        }

        self.logger.info(&format!(
            "Creating SDP offer with {} media section(s)",
            sections.len()
        ));
        self.build(SdpType::Offer, ice_agent, sections)
    }

    /// Answer mirroring every section of `offer`, in order and with the
    /// same mids.
    pub fn create_answer(
        &mut self,
        offer: &SessionDescription,
        ice_agent: &IceAgent,
        media: Option<&CaptureHandle>,
        data_channel: bool,
    ) -> Result<SessionDescription> {
        let mut unused_tracks: Vec<&MediaTrack> = media
            .map(|h| h.tracks().iter().filter(|t| t.is_live()).collect())
            .unwrap_or_default();

        let mut sections = Vec::with_capacity(offer.media.len());
        for (index, offered) in offer.media.iter().enumerate() {
            let mid = offered
                .mid()
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string());

            let section = if offered.is_data_channel() {
                let port = if data_channel { DISCARD_PORT } else { 0 };
                MediaDescription::data_channel(port).with_attribute(Attribute::new("mid", mid))
            } else if let Some(kind) = track_kind(offered) {
                let offered_direction = offered.direction();
                let local = unused_tracks
                    .iter()
                    .position(|t| t.kind() == kind)
                    .map(|i| unused_tracks.remove(i));
                let receive = offered_direction.sends();
                let send = local.is_some()
                    && matches!(offered_direction, Direction::SendRecv | Direction::RecvOnly);

                let direction = match (send, receive) {
                    (true, true) => Direction::SendRecv,
                    (true, false) => Direction::SendOnly,
                    (false, _) => offered_direction.answer_without_media(),
                };
                let local = local
                    .filter(|_| send)
                    .zip(media)
                    .map(|(track, handle)| (handle.id(), track));
                let mut rtpmaps: Vec<String> = offered
                    .attributes_named("rtpmap")
                    .map(str::to_string)
                    .collect();
                if rtpmaps.is_empty() {
                    rtpmaps.push(default_rtpmap(kind).to_string());
                }
                rtp_section(kind, &mid, direction, offered.formats.clone(), rtpmaps, local)
            } else {
                MediaDescription::new(
                    offered.media_type.clone(),
                    0,
                    offered.protocol.clone(),
                    offered.formats.clone(),
                )
                .with_attribute(Attribute::new("mid", mid))
                .with_attribute(Attribute::flag(Direction::Inactive.as_str()))
            };
            sections.push(section);
        }

        self.logger.info(&format!(
            "Creating SDP answer for {} offered section(s)",
            sections.len()
        ));
        self.build(SdpType::Answer, ice_agent, sections)
    }

    fn build(
        &mut self,
        sdp_type: SdpType,
        ice_agent: &IceAgent,
        sections: Vec<MediaDescription>,
    ) -> Result<SessionDescription> {
        self.session_version += 1;
        let credentials = ice_agent.credentials();

        let builder = sections.into_iter().fold(
            SessionDescription::builder(sdp_type)
                .origin(Origin::new(
                    self.session_id,
                    self.session_version,
                    &self.address,
                ))
                .session_name(self.session_name.clone())
                .timing(Timing::default())
                .ice_credentials(&credentials.ufrag, &credentials.pwd)
                .add_attribute(Attribute::new("ice-options", "trickle")),
            |builder, section| builder.add_media(section),
        );

        Ok(builder.bundle().build()?)
    }

    /// Streams the peer announced it will send, grouped by `a=msid`.
    pub fn remote_streams(remote: &SessionDescription) -> Vec<RemoteStream> {
        let mut streams: Vec<RemoteStream> = Vec::new();
        for section in remote.media.iter().filter(|m| m.is_rtp() && m.port != 0) {
            if !section.direction().sends() {
                continue;
            }
            let (Some(kind), Some(msid)) = (track_kind(section), section.attribute("msid")) else {
                continue;
            };
            let mut parts = msid.split_whitespace();
            let Some(stream_id) = parts.next() else {
                continue;
            };
            let track_id = parts.next().unwrap_or(stream_id).to_string();

            match streams.iter_mut().find(|s| s.id == stream_id) {
                Some(stream) => stream.add_track(kind, track_id),
                None => {
                    let mut stream = RemoteStream::new(stream_id);
                    stream.add_track(kind, track_id);
                    streams.push(stream);
                }
            }
        }
        streams
    }
}

fn track_kind(section: &MediaDescription) -> Option<TrackKind> {
    match section.media_type.as_str() {
        "audio" => Some(TrackKind::Audio),
        "video" => Some(TrackKind::Video),
        _ => None,
    }
}

fn default_formats(kind: TrackKind) -> Vec<String> {
    match kind {
        TrackKind::Audio => vec!["111".to_string()],
        TrackKind::Video => vec!["96".to_string()],
    }
}

fn default_rtpmap(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Audio => "111 opus/48000/2",
        TrackKind::Video => "96 VP8/90000",
    }
}

fn rtp_section(
    kind: TrackKind,
    mid: &str,
    direction: Direction,
    formats: Vec<String>,
    rtpmaps: Vec<String>,
    local: Option<(&str, &MediaTrack)>,
) -> MediaDescription {
    let mut section = MediaDescription::new(kind.as_str(), DISCARD_PORT, RTP_PROTOCOL, formats)
        .with_attribute(Attribute::new("mid", mid))
        .with_attribute(Attribute::flag(direction.as_str()))
        .with_attribute(Attribute::flag("rtcp-mux"));
    for rtpmap in rtpmaps {
        section = section.with_attribute(Attribute::new("rtpmap", rtpmap));
    }

    if let Some((stream_id, track)) = local {
        section = section.with_attribute(Attribute::new(
            "msid",
            format!("{} {}", stream_id, track.id()),
        ));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use media::{MediaSource, Preset, VirtualBackend};

    fn handler() -> SdpHandler {
        SdpHandler::new(&EndpointConfig::default(), Logger::disabled())
    }

    fn camera_handle() -> CaptureHandle {
        let mut source = MediaSource::new(Box::new(VirtualBackend::default()), Logger::disabled());
        source.acquire(&Preset::Standard.profile()).unwrap()
    }

    #[test]
    fn test_offer_requires_something_to_negotiate() {
        let agent = IceAgent::new(Logger::disabled());
        let result = handler().create_offer(&agent, None, false);
        assert!(matches!(result, Err(RtcError::SignalingFailure(_))));
    }

    #[test]
    fn test_offer_with_media_and_data() {
        let agent = IceAgent::new(Logger::disabled());
        let handle = camera_handle();
        let offer = handler()
            .create_offer(&agent, Some(&handle), true)
            .unwrap();

        assert_eq!(offer.media.len(), 2);
        assert_eq!(offer.media[0].media_type, "video");
        assert_eq!(offer.media[0].direction(), Direction::SendRecv);
        assert!(offer.media[0].attribute("msid").unwrap().starts_with(handle.id()));
        assert!(offer.media[1].is_data_channel());
        assert_eq!(offer.bundle_mids(), vec!["0", "1"]);
        assert_eq!(offer.ice_ufrag(), Some(agent.credentials().ufrag.as_str()));
    }

    #[test]
    fn test_answer_without_media_receives_only() {
        let offerer = IceAgent::new(Logger::disabled());
        let answerer = IceAgent::new(Logger::disabled());
        let handle = camera_handle();
        let offer = handler()
            .create_offer(&offerer, Some(&handle), true)
            .unwrap();

        let answer = handler()
            .create_answer(&offer, &answerer, None, true)
            .unwrap();
        assert_eq!(answer.sdp_type, SdpType::Answer);
        assert_eq!(answer.media.len(), 2);
        assert_eq!(answer.media[0].direction(), Direction::RecvOnly);
        assert_eq!(answer.media[0].mid(), Some("0"));
        assert!(!answer.media[0].has_attribute("msid"));
        assert!(answer.media[1].is_data_channel());
        assert_eq!(answer.media[1].port, DISCARD_PORT);
    }

    #[test]
    fn test_answer_with_media_sends_back() {
        let agent = IceAgent::new(Logger::disabled());
        let offer = handler()
            .create_offer(&agent, Some(&camera_handle()), false)
            .unwrap();
        let local = camera_handle();
        let answer = handler()
            .create_answer(&offer, &agent, Some(&local), false)
            .unwrap();
        assert_eq!(answer.media[0].direction(), Direction::SendRecv);
        assert!(answer.media[0].attribute("rtpmap").is_some());
    }

    #[test]
    fn test_remote_streams_from_offer() {
        let agent = IceAgent::new(Logger::disabled());
        let handle = camera_handle();
        let offer = handler()
            .create_offer(&agent, Some(&handle), true)
            .unwrap();

        let streams = SdpHandler::remote_streams(&offer);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].id, handle.id());
        assert_eq!(streams[0].kinds(), vec![TrackKind::Video]);
    }

    #[test]
    fn test_session_version_increments() {
        let agent = IceAgent::new(Logger::disabled());
        let mut handler = handler();
        let first = handler.create_offer(&agent, None, true).unwrap();
        let second = handler.create_offer(&agent, None, true).unwrap();
        assert_eq!(first.origin.session_id, second.origin.session_id);
        assert_eq!(second.origin.session_version, first.origin.session_version + 1);
    }
}
