//! Leveled, component-tagged logging for the loopback peer demo.
//!
//! Log lines go to an optional file (written by a dedicated thread) and/or
//! to stdout. Every endpoint, the media source and the signaling relay get
//! their own component tag through [`Logger::for_component`].

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use log_message::StampStyle;
pub use logger::Logger;
