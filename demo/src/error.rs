use crate::ui::Button;
use media::MediaError;
use rtcpeer::RtcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("'{0}' is disabled right now")]
    Disabled(Button),

    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Rtc(#[from] RtcError),
}

pub type Result<T> = std::result::Result<T, DemoError>;
