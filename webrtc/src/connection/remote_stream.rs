//! Streams announced by the peer.

use media::TrackKind;

/// A stream the peer's description says it will send, identified by the
/// first `a=msid` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub id: String,
    tracks: Vec<(TrackKind, String)>,
}

impl RemoteStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: Vec::new(),
        }
    }

    pub(crate) fn add_track(&mut self, kind: TrackKind, track_id: String) {
        self.tracks.push((kind, track_id));
    }

    pub fn kinds(&self) -> Vec<TrackKind> {
        self.tracks.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|(_, id)| id.as_str())
    }

    pub fn has_video(&self) -> bool {
        self.tracks.iter().any(|(kind, _)| *kind == TrackKind::Video)
    }
}
