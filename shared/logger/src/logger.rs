//! The [`Logger`] handle.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::{LogMessage, StampStyle};
use crate::log_writer::spawn_writer_thread;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Instant;

/// Cloneable, non-blocking logger.
///
/// Clones and [`for_component`](Logger::for_component) children share the
/// same writer thread, so lines from every component land in one file in
/// the order they were emitted.
///
/// # Examples
///
/// ```no_run
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::new("loopback.log".into(), LogLevel::Info).unwrap();
/// let endpoint_a = logger.for_component("A");
/// endpoint_a.info("Created local peer connection object");
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    sender: Option<Sender<LogMessage>>,
    level: LogLevel,
    component: Option<String>,
    log_path: Option<PathBuf>,
    console_output: bool,
    stamp: StampStyle,
    origin: Instant,
}

impl Logger {
    /// File logger without a component tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        let sender = spawn_writer_thread(&log_path)?;
        Ok(Self {
            sender: Some(sender),
            level,
            component: None,
            log_path: Some(log_path),
            console_output: false,
            stamp: StampStyle::WallClock,
            origin: Instant::now(),
        })
    }

    /// File logger tagged with `component`, optionally echoing to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or opened.
    pub fn with_component(
        log_path: PathBuf,
        level: LogLevel,
        component: String,
        console_output: bool,
    ) -> Result<Self> {
        let mut logger = Self::new(log_path, level)?;
        logger.component = Some(component);
        logger.console_output = console_output;
        Ok(logger)
    }

    /// Stdout-only logger; no file, no writer thread.
    pub fn console(level: LogLevel) -> Self {
        Self {
            sender: None,
            level,
            component: None,
            log_path: None,
            console_output: true,
            stamp: StampStyle::WallClock,
            origin: Instant::now(),
        }
    }

    /// Logger that drops everything. Used by library defaults and tests.
    pub fn disabled() -> Self {
        Self {
            console_output: false,
            ..Self::console(LogLevel::Error)
        }
    }

    /// Child logger with a different component tag, sharing sinks and level.
    pub fn for_component(&self, component: &str) -> Self {
        Self {
            component: Some(component.to_string()),
            ..self.clone()
        }
    }

    /// Switches the line prefix style. Children created afterwards inherit it.
    pub fn with_stamp(mut self, stamp: StampStyle) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_path.as_ref()
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level || (self.sender.is_none() && !self.console_output) {
            return;
        }

        let msg = LogMessage::new(
            level,
            self.component.as_deref(),
            message,
            self.stamp,
            self.origin,
        );

        if self.console_output {
            print!("{}", msg.format());
        }

        if let Some(ref sender) = self.sender {
            // The writer only goes away at process teardown.
            let _ = sender.send(msg);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    fn wait_for_write() {
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn test_logger_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Debug).unwrap();
        logger.info("Requesting local stream");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Requesting local stream"));
    }

    #[test]
    fn test_logger_respects_level() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Warn).unwrap();
        logger.debug("debug line");
        logger.info("info line");
        logger.warn("warn line");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(!content.contains("debug line"));
        assert!(!content.contains("info line"));
        assert!(content.contains("warn line"));
    }

    #[test]
    fn test_components_share_one_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let root = Logger::new(log_path.clone(), LogLevel::Info).unwrap();
        let a = root.for_component("A");
        let b = root.for_component("B");
        a.info("offer created");
        b.info("answer created");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("[A]: offer created"));
        assert!(content.contains("[B]: answer created"));
        assert_eq!(b.component(), Some("B"));
    }

    #[test]
    fn test_clone_across_threads() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info).unwrap();
        let clone = logger.clone();
        thread::spawn(move || clone.info("from thread")).join().unwrap();
        logger.info("from main");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("from thread"));
        assert!(content.contains("from main"));
    }

    #[test]
    fn test_disabled_logger_has_no_sinks() {
        let logger = Logger::disabled();
        assert!(logger.log_path().is_none());
        // Must not panic or block.
        logger.error("nobody listens");
    }

    #[test]
    fn test_for_component_keeps_stamp_and_level() {
        let logger = Logger::console(LogLevel::Debug).with_stamp(StampStyle::Elapsed);
        let child = logger.for_component("Media");
        assert_eq!(child.level(), LogLevel::Debug);
        assert_eq!(child.stamp, StampStyle::Elapsed);
    }
}
