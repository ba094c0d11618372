//! Media Capture Module
//!
//! Local media acquisition under a quality profile: profiles and presets,
//! the capture backend abstraction (with a virtual backend that needs no
//! hardware), live tracks grouped in capture handles, and a preview sink
//! that owns whatever is currently shown.

pub mod backend;
pub mod device;
pub mod error;
pub mod preview;
pub mod profile;
pub mod source;
pub mod track;

pub use backend::{CaptureBackend, Permission, VirtualBackend};
pub use device::{DeviceInfo, DeviceKind};
pub use error::{MediaError, Result};
pub use preview::Preview;
pub use profile::{MediaProfile, Preset, Resolution};
pub use source::{CaptureHandle, MediaSource};
pub use track::{MediaTrack, TrackKind, TrackState};
