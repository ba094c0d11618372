//! Timing line (`t=`).

use crate::errors::SdpError;

/// `t=<start> <stop>`. Both zero means the session is unbounded, which is
/// what every endpoint in this workspace produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub start_time: u64,
    pub stop_time: u64,
}

impl Timing {
    pub fn validate(&self) -> Result<(), SdpError> {
        if self.start_time != 0 && self.stop_time != 0 && self.stop_time < self.start_time {
            return Err(SdpError::InvalidTiming);
        }
        Ok(())
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let mut parts = value.split_whitespace();
        let (Some(start), Some(stop), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SdpError::InvalidTimingFormat);
        };

        Ok(Timing {
            start_time: start.parse().map_err(|_| SdpError::InvalidTimingFormat)?,
            stop_time: stop.parse().map_err(|_| SdpError::InvalidTimingFormat)?,
        })
    }
}

impl std::fmt::Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={} {}\r\n", self.start_time, self.stop_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_parse() {
        assert_eq!(Timing::parse("0 0").unwrap(), Timing::default());
        assert!(Timing::parse("0").is_err());
        assert!(Timing::parse("0 0 0").is_err());
        assert!(Timing::parse("abc 1").is_err());
    }

    #[test]
    fn test_timing_validate() {
        let bounded = Timing {
            start_time: 100,
            stop_time: 200,
        };
        assert!(bounded.validate().is_ok());

        let inverted = Timing {
            start_time: 200,
            stop_time: 100,
        };
        assert_eq!(inverted.validate().unwrap_err(), SdpError::InvalidTiming);
    }

    #[test]
    fn test_timing_display() {
        assert_eq!(Timing::default().to_string(), "t=0 0\r\n");
    }
}
