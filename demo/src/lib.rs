//! Interactive loopback demo: two endpoints in one process, driven from
//! a command line.

pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod ui;

pub use app::App;
pub use command::Command;
pub use config::DemoConfig;
pub use error::{DemoError, Result};
