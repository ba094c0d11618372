//! Button affordances of the two demo pages.
//!
//! The controller never talks to endpoints; the app tells it what happened
//! and asks it which buttons are live.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Call page: capture local media
    Start,
    Call,
    Hangup,
    /// Data page: create the peers and the send channel
    DataStart,
    Send,
    Close,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Start,
        Button::Call,
        Button::Hangup,
        Button::DataStart,
        Button::Send,
        Button::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Start => "start",
            Button::Call => "call",
            Button::Hangup => "hangup",
            Button::DataStart => "open",
            Button::Send => "send",
            Button::Close => "close",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiController {
    start: bool,
    call: bool,
    hangup: bool,
    data_start: bool,
    send: bool,
    close: bool,
}

impl Default for UiController {
    fn default() -> Self {
        Self {
            start: true,
            call: false,
            hangup: false,
            data_start: true,
            send: false,
            close: false,
        }
    }
}

impl UiController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, button: Button) -> bool {
        match button {
            Button::Start => self.start,
            Button::Call => self.call,
            Button::Hangup => self.hangup,
            Button::DataStart => self.data_start,
            Button::Send => self.send,
            Button::Close => self.close,
        }
    }

    // ===== Call page =====

    pub fn local_stream_ready(&mut self) {
        self.start = false;
        self.call = true;
    }

    /// Capture failed; the user may press Start again.
    pub fn local_stream_failed(&mut self) {
        self.start = true;
        self.call = false;
    }

    pub fn call_started(&mut self) {
        self.call = false;
        self.hangup = true;
    }

    pub fn hung_up(&mut self) {
        self.hangup = false;
        self.call = true;
    }

    // ===== Data page =====

    pub fn data_started(&mut self) {
        self.data_start = false;
        self.close = true;
    }

    pub fn send_channel_open(&mut self) {
        self.send = true;
    }

    pub fn data_closed(&mut self) {
        self.data_start = true;
        self.send = false;
        self.close = false;
    }

    /// `start call hangup` style summary, disabled buttons in brackets.
    pub fn render(&self) -> String {
        Button::ALL
            .iter()
            .map(|b| {
                if self.is_enabled(*b) {
                    b.as_str().to_string()
                } else {
                    format!("[{}]", b)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let ui = UiController::new();
        assert!(ui.is_enabled(Button::Start));
        assert!(!ui.is_enabled(Button::Call));
        assert!(!ui.is_enabled(Button::Hangup));
        assert!(ui.is_enabled(Button::DataStart));
        assert!(!ui.is_enabled(Button::Send));
        assert!(!ui.is_enabled(Button::Close));
    }

    #[test]
    fn test_call_page_flow() {
        let mut ui = UiController::new();
        ui.local_stream_ready();
        assert!(!ui.is_enabled(Button::Start));
        assert!(ui.is_enabled(Button::Call));

        ui.call_started();
        assert!(!ui.is_enabled(Button::Call));
        assert!(ui.is_enabled(Button::Hangup));

        ui.hung_up();
        assert!(ui.is_enabled(Button::Call));
        assert!(!ui.is_enabled(Button::Hangup));
    }

    #[test]
    fn test_data_page_flow() {
        let mut ui = UiController::new();
        ui.data_started();
        assert!(!ui.is_enabled(Button::DataStart));
        assert!(ui.is_enabled(Button::Close));
        assert!(!ui.is_enabled(Button::Send));

        ui.send_channel_open();
        assert!(ui.is_enabled(Button::Send));

        ui.data_closed();
        assert_eq!(ui, UiController::new());
    }

    #[test]
    fn test_render_brackets_disabled() {
        let ui = UiController::new();
        assert_eq!(ui.render(), "start [call] [hangup] open [send] [close]");
    }
}
