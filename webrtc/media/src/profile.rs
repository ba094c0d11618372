//! Capture quality profiles.
//!
//! A [`MediaProfile`] states the minimum resolution a stream must reach and
//! optionally the resolution it should aim for. Presets are plain values of
//! that type, selected by name.

use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum valid dimension
const MIN_DIMENSION: u32 = 1;
/// Maximum valid dimension (8K)
const MAX_DIMENSION: u32 = 7680;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Immutable capture constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaProfile {
    min: Resolution,
    ideal: Option<Resolution>,
    audio: bool,
}

impl MediaProfile {
    /// QVGA, 320x240.
    pub const LOW: MediaProfile = MediaProfile::exact(320, 240);
    /// VGA, 640x480.
    pub const STANDARD: MediaProfile = MediaProfile::exact(640, 480);
    /// At least VGA, aiming for 1280x960.
    pub const HIGH: MediaProfile = MediaProfile {
        min: Resolution::new(640, 480),
        ideal: Some(Resolution::new(1280, 960)),
        audio: false,
    };
    /// Constraints used when starting a call: at least 400x300.
    pub const CALL_DEFAULT: MediaProfile = MediaProfile {
        min: Resolution::new(400, 300),
        ideal: None,
        audio: false,
    };

    const fn exact(width: u32, height: u32) -> Self {
        Self {
            min: Resolution::new(width, height),
            ideal: Some(Resolution::new(width, height)),
            audio: false,
        }
    }

    /// Profile with only a minimum resolution and no audio.
    ///
    /// # Errors
    /// `MediaError::Config` if a dimension is outside 1..=7680.
    pub fn new(min_width: u32, min_height: u32) -> Result<Self> {
        let profile = Self {
            min: Resolution::new(min_width, min_height),
            ideal: None,
            audio: false,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Sets the target resolution.
    ///
    /// # Errors
    /// `MediaError::Config` if a dimension is out of range or below the minimum.
    pub fn with_ideal(mut self, width: u32, height: u32) -> Result<Self> {
        self.ideal = Some(Resolution::new(width, height));
        self.validate()?;
        Ok(self)
    }

    pub fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    pub fn min(&self) -> Resolution {
        self.min
    }

    pub fn ideal(&self) -> Option<Resolution> {
        self.ideal
    }

    pub fn min_width(&self) -> u32 {
        self.min.width
    }

    pub fn min_height(&self) -> u32 {
        self.min.height
    }

    pub fn ideal_width(&self) -> Option<u32> {
        self.ideal.map(|r| r.width)
    }

    pub fn ideal_height(&self) -> Option<u32> {
        self.ideal.map(|r| r.height)
    }

    pub fn audio(&self) -> bool {
        self.audio
    }

    pub fn validate(&self) -> Result<()> {
        check_dimension("min width", self.min.width)?;
        check_dimension("min height", self.min.height)?;

        if let Some(ideal) = self.ideal {
            check_dimension("ideal width", ideal.width)?;
            check_dimension("ideal height", ideal.height)?;
            if ideal.width < self.min.width || ideal.height < self.min.height {
                return Err(MediaError::Config(format!(
                    "ideal resolution {} is below the minimum {}",
                    ideal, self.min
                )));
            }
        }

        Ok(())
    }
}

fn check_dimension(name: &str, value: u32) -> Result<()> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
        return Err(MediaError::Config(format!(
            "{} must be between {} and {}, got {}",
            name, MIN_DIMENSION, MAX_DIMENSION, value
        )));
    }
    Ok(())
}

impl fmt::Display for MediaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min {}", self.min)?;
        if let Some(ideal) = self.ideal {
            write!(f, ", ideal {}", ideal)?;
        }
        if self.audio {
            write!(f, ", audio")?;
        }
        Ok(())
    }
}

/// Named profiles selectable from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[serde(alias = "qvga")]
    Low,
    #[serde(alias = "vga")]
    Standard,
    #[serde(alias = "hd")]
    High,
    #[default]
    CallDefault,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Low,
        Preset::Standard,
        Preset::High,
        Preset::CallDefault,
    ];

    pub fn profile(&self) -> MediaProfile {
        match self {
            Preset::Low => MediaProfile::LOW,
            Preset::Standard => MediaProfile::STANDARD,
            Preset::High => MediaProfile::HIGH,
            Preset::CallDefault => MediaProfile::CALL_DEFAULT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Low => "low",
            Preset::Standard => "standard",
            Preset::High => "high",
            Preset::CallDefault => "call_default",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "qvga" => Ok(Preset::Low),
            "standard" | "vga" => Ok(Preset::Standard),
            "high" | "hd" => Ok(Preset::High),
            "call_default" | "call" => Ok(Preset::CallDefault),
            other => Err(MediaError::Config(format!("unknown preset: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_table() {
        let low = Preset::Low.profile();
        assert_eq!((low.min_width(), low.min_height()), (320, 240));
        assert_eq!((low.ideal_width(), low.ideal_height()), (Some(320), Some(240)));

        let standard = Preset::Standard.profile();
        assert_eq!(standard.min(), Resolution::new(640, 480));
        assert_eq!(standard.ideal(), Some(Resolution::new(640, 480)));

        let high = Preset::High.profile();
        assert_eq!(high.min(), Resolution::new(640, 480));
        assert_eq!(high.ideal(), Some(Resolution::new(1280, 960)));

        let call = Preset::CallDefault.profile();
        assert_eq!(call.min(), Resolution::new(400, 300));
        assert_eq!(call.ideal(), None);

        assert!(Preset::ALL.iter().all(|p| !p.profile().audio()));
        assert!(Preset::ALL.iter().all(|p| p.profile().validate().is_ok()));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(MediaProfile::new(0, 240), Err(MediaError::Config(_))));
        assert!(matches!(MediaProfile::new(320, 7681), Err(MediaError::Config(_))));
        assert!(MediaProfile::new(7680, 4320).is_ok());
    }

    #[test]
    fn test_ideal_below_min_rejected() {
        let result = MediaProfile::new(640, 480).and_then(|p| p.with_ideal(320, 240));
        assert!(matches!(result, Err(MediaError::Config(_))));
    }

    #[test]
    fn test_preset_from_str_accepts_aliases() {
        assert_eq!("qvga".parse::<Preset>().unwrap(), Preset::Low);
        assert_eq!("VGA".parse::<Preset>().unwrap(), Preset::Standard);
        assert_eq!("hd".parse::<Preset>().unwrap(), Preset::High);
        assert!("8k".parse::<Preset>().is_err());
    }

    #[test]
    fn test_preset_serde_names() {
        assert_eq!(serde_json::to_string(&Preset::CallDefault).unwrap(), "\"call_default\"");
        let parsed: Preset = serde_json::from_str("\"hd\"").unwrap();
        assert_eq!(parsed, Preset::High);
    }

    #[test]
    fn test_profile_display() {
        assert_eq!(MediaProfile::HIGH.to_string(), "min 640x480, ideal 1280x960");
        assert_eq!(
            MediaProfile::CALL_DEFAULT.with_audio(true).to_string(),
            "min 400x300, audio"
        );
    }
}
