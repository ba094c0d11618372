//! Internal log line representation.

use crate::log_level::LogLevel;
use chrono::Local;
use std::time::Instant;

/// How the leading timestamp of a line is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StampStyle {
    /// Local wall clock, `YYYY-MM-DD HH:MM:SS.mmm`.
    #[default]
    WallClock,
    /// Seconds since the logger was created, `At time: 1.234`.
    Elapsed,
}

#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    pub fn new(
        level: LogLevel,
        component: Option<&str>,
        message: &str,
        style: StampStyle,
        origin: Instant,
    ) -> Self {
        let timestamp = match style {
            StampStyle::WallClock => Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            StampStyle::Elapsed => {
                format!("At time: {:.3}", origin.elapsed().as_secs_f64())
            }
        };

        Self {
            timestamp,
            level,
            component: component.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// `[timestamp] LEVEL [component]: message\n`
    pub fn format(&self) -> String {
        match self.component {
            Some(ref component) => format!(
                "[{}] {} [{}]: {}\n",
                self.timestamp,
                self.level.as_str(),
                component,
                self.message
            ),
            None => format!(
                "[{}] {}: {}\n",
                self.timestamp,
                self.level.as_str(),
                self.message
            ),
        }
    }
}
