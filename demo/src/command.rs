//! Commands read from stdin, one per line.

use crate::error::DemoError;
use media::Preset;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Call,
    Hangup,
    /// Data page Start
    Open,
    Send(String),
    Close,
    Preset(Preset),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
call page:  start | call | hangup | preset <low|standard|high|call_default>
data page:  open | send <text> | close
other:      status | help | quit";

impl FromStr for Command {
    type Err = DemoError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "call" => Ok(Command::Call),
            "hangup" => Ok(Command::Hangup),
            "open" => Ok(Command::Open),
            "send" => Ok(Command::Send(rest.to_string())),
            "close" => Ok(Command::Close),
            "preset" => rest
                .parse::<Preset>()
                .map(Command::Preset)
                .map_err(|e| DemoError::Usage(e.to_string())),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(DemoError::UnknownCommand(line.to_string())),
        }
    }
}
