//! Media tracks.

use crate::profile::Resolution;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// A single live source of audio or video.
///
/// Clones share the liveness flag: stopping any clone ends the track for
/// every holder.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    label: String,
    resolution: Option<Resolution>,
    state: Rc<Cell<TrackState>>,
}

impl MediaTrack {
    pub fn new(
        id: impl Into<String>,
        kind: TrackKind,
        label: impl Into<String>,
        resolution: Option<Resolution>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            resolution,
            state: Rc::new(Cell::new(TrackState::Live)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Frame size for video tracks.
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn state(&self) -> TrackState {
        self.state.get()
    }

    pub fn is_live(&self) -> bool {
        self.state.get() == TrackState::Live
    }

    /// Releases the device. Idempotent.
    pub fn stop(&self) {
        self.state.set(TrackState::Ended);
    }
}
