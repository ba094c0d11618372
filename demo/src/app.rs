//! The two demo pages behind one command loop.
//!
//! Call page: capture local media, call endpoint B from endpoint A, hang
//! up. Data page: open a channel from A to B and send text over it.

use crate::command::{Command, HELP};
use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::ui::{Button, UiController};
use logging::Logger;
use media::{CaptureHandle, MediaProfile, MediaSource, Preview};
use rtcpeer::{
    ChannelId, DataChannelMessage, DataChannelState, EndpointEvent, LocalPair, LoopbackRelay,
    Peer,
};

/// Label of the channel the data page opens.
pub const SEND_CHANNEL_LABEL: &str = "sendDataChannel";

struct DataSession {
    pair: LocalPair,
    channel: ChannelId,
}

pub struct App {
    config: DemoConfig,
    source: MediaSource,
    preview: Preview,
    profile: MediaProfile,
    call: Option<LocalPair>,
    data: Option<DataSession>,
    ui: UiController,
    logger: Logger,
}

impl App {
    pub fn new(config: DemoConfig, logger: Logger) -> Self {
        let source = MediaSource::new(
            Box::new(config.media.backend()),
            logger.for_component("Media"),
        );
        let profile = config.media.preset.profile();

        Self {
            config,
            source,
            preview: Preview::new(),
            profile,
            call: None,
            data: None,
            ui: UiController::new(),
            logger: logger.for_component("Demo"),
        }
    }

    pub fn ui(&self) -> &UiController {
        &self.ui
    }

    pub fn call_pair(&self) -> Option<&LocalPair> {
        self.call.as_ref()
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Runs one command and returns the lines to show the user.
    pub fn execute(&mut self, command: Command) -> Result<Vec<String>> {
        match command {
            Command::Start => self.start(),
            Command::Call => self.start_call(),
            Command::Hangup => self.hangup(),
            Command::Open => self.open_data(),
            Command::Send(text) => self.send(&text),
            Command::Close => self.close_data(),
            Command::Preset(preset) => self.switch_preset(preset.profile()),
            Command::Status => Ok(self.status()),
            Command::Help => Ok(HELP.lines().map(str::to_string).collect()),
            Command::Quit => {
                self.shutdown();
                Ok(Vec::new())
            }
        }
    }

    fn require(&self, button: Button) -> Result<()> {
        if self.ui.is_enabled(button) {
            Ok(())
        } else {
            Err(DemoError::Disabled(button))
        }
    }

    fn new_pair(&self) -> Result<LocalPair> {
        let relay = LoopbackRelay::new(self.logger.clone())
            .with_json_encoding(self.config.signaling.encode_json);
        Ok(LocalPair::with_relay(
            &self.config.endpoint,
            relay,
            self.logger.clone(),
        )?)
    }

    // ===== Call page =====

    fn start(&mut self) -> Result<Vec<String>> {
        self.require(Button::Start)?;
        match self.preview.switch_profile(&mut self.source, &self.profile) {
            Ok(handle) => {
                self.ui.local_stream_ready();
                Ok(vec![describe_local(&handle)])
            }
            Err(e) => {
                self.ui.local_stream_failed();
                self.logger.warn(&format!("getUserMedia failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// The live preview stream; a new one is requested when the previous
    /// call released it.
    fn local_stream(&mut self) -> Result<CaptureHandle> {
        if let Some(handle) = self.preview.current().filter(|h| h.is_live()) {
            return Ok(handle.clone());
        }
        self.logger.info("Local stream ended, requesting a new one");
        Ok(self.preview.switch_profile(&mut self.source, &self.profile)?)
    }

    fn start_call(&mut self) -> Result<Vec<String>> {
        self.require(Button::Call)?;
        let handle = self.local_stream()?;

        let mut pair = self.new_pair()?;
        pair.a_mut().attach_local_media(handle)?;
        pair.call()?;
        let events = pair.run_until_idle()?;

        let mut lines = vec!["Starting call".to_string()];
        lines.extend(events.iter().filter_map(|(peer, event)| match event {
            EndpointEvent::RemoteStream(stream) if *peer == Peer::B => {
                Some(format!("Remote video: stream {}", stream.id))
            }
            _ => None,
        }));
        lines.push(format!(
            "A: {} / ICE {}, B: {} / ICE {}",
            pair.a().state(),
            pair.a().ice_state(),
            pair.b().state(),
            pair.b().ice_state()
        ));

        self.call = Some(pair);
        self.ui.call_started();
        Ok(lines)
    }

    fn hangup(&mut self) -> Result<Vec<String>> {
        self.require(Button::Hangup)?;
        if let Some(mut pair) = self.call.take() {
            pair.hangup();
        }
        self.ui.hung_up();
        Ok(vec!["Ending call".to_string()])
    }

    fn switch_preset(&mut self, profile: MediaProfile) -> Result<Vec<String>> {
        if self.call.is_some() {
            return Err(DemoError::Usage(
                "hang up before changing the preset".to_string(),
            ));
        }
        self.profile = profile;
        let mut lines = vec![format!("Profile: {}", self.profile)];

        if self.preview.current().is_some() {
            match self.preview.switch_profile(&mut self.source, &self.profile) {
                Ok(handle) => lines.push(describe_local(&handle)),
                Err(e) => {
                    self.ui.local_stream_failed();
                    return Err(e.into());
                }
            }
        }
        Ok(lines)
    }

    // ===== Data page =====

    fn open_data(&mut self) -> Result<Vec<String>> {
        self.require(Button::DataStart)?;

        let mut pair = self.new_pair()?;
        let channel = pair.a_mut().open_data_channel(SEND_CHANNEL_LABEL)?;
        self.logger.info("Created send data channel");
        pair.call()?;
        pair.run_until_idle()?;

        self.ui.data_started();
        let state = pair
            .a()
            .channel(channel)
            .map(|c| c.state())
            .unwrap_or(DataChannelState::Closed);
        if state == DataChannelState::Open {
            self.ui.send_channel_open();
        }

        self.data = Some(DataSession { pair, channel });
        Ok(vec![format!("Send channel state is: {}", state)])
    }

    fn send(&mut self, text: &str) -> Result<Vec<String>> {
        self.require(Button::Send)?;
        let session = self
            .data
            .as_mut()
            .ok_or_else(|| DemoError::Usage("no data session".to_string()))?;

        session.pair.a_mut().send_text(session.channel, text)?;
        let events = session.pair.run_until_idle()?;

        Ok(events
            .into_iter()
            .filter_map(|(peer, event)| match (peer, event) {
                (Peer::B, EndpointEvent::Message { message, .. }) => Some(match message {
                    DataChannelMessage::Text(text) => format!("Received: {}", text),
                    DataChannelMessage::Binary(bytes) => {
                        format!("Received {} byte(s)", bytes.len())
                    }
                }),
                _ => None,
            })
            .collect())
    }

    fn close_data(&mut self) -> Result<Vec<String>> {
        self.require(Button::Close)?;
        if let Some(mut session) = self.data.take() {
            session.pair.a_mut().close_channel(session.channel)?;
            session.pair.run_until_idle()?;
            session.pair.hangup();
        }
        self.ui.data_closed();
        Ok(vec!["Closed data channel".to_string()])
    }

    // ===== Misc =====

    fn status(&self) -> Vec<String> {
        let mut lines = vec![format!("Buttons: {}", self.ui.render())];
        match self.preview.dimensions() {
            Some(size) => lines.push(format!("Local video: {}", size)),
            None => lines.push("Local video: none".to_string()),
        }
        if let Some(pair) = &self.call {
            lines.push(format!(
                "Call: A {} / B {}",
                pair.a().state(),
                pair.b().state()
            ));
        }
        if let Some(session) = &self.data {
            if let Some(channel) = session.pair.a().channel(session.channel) {
                lines.push(format!(
                    "Data: '{}' {} ({} bytes sent)",
                    channel.label(),
                    channel.state(),
                    channel.bytes_sent()
                ));
            }
        }
        lines
    }

    /// Hangs up everything and releases the camera.
    pub fn shutdown(&mut self) {
        if let Some(mut pair) = self.call.take() {
            pair.hangup();
        }
        if let Some(mut session) = self.data.take() {
            session.pair.hangup();
        }
        self.preview.clear();
    }
}

fn describe_local(handle: &CaptureHandle) -> String {
    match handle.resolution() {
        Some(size) => format!("Local video: {} ({})", size, handle.id()),
        None => format!("Local stream {}", handle.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media::Preset;

    fn app() -> App {
        App::new(DemoConfig::default(), Logger::disabled())
    }

    #[test]
    fn test_call_page_flow() {
        let mut app = app();
        assert!(matches!(
            app.execute(Command::Call),
            Err(DemoError::Disabled(Button::Call))
        ));

        let lines = app.execute(Command::Start).unwrap();
        assert!(lines[0].starts_with("Local video: 640x480"));

        let lines = app.execute(Command::Call).unwrap();
        assert!(lines.iter().any(|l| l.starts_with("Remote video")));
        assert!(app.ui().is_enabled(Button::Hangup));

        app.execute(Command::Hangup).unwrap();
        assert!(app.ui().is_enabled(Button::Call));
        assert!(app.call_pair().is_none());

        // Calling again after a hangup re-acquires the released camera.
        app.execute(Command::Call).unwrap();
        assert!(app.preview().current().unwrap().is_live());
    }

    #[test]
    fn test_start_fails_without_permission() {
        let mut config = DemoConfig::default();
        config.media.permission_granted = false;
        let mut app = App::new(config, Logger::disabled());

        assert!(matches!(
            app.execute(Command::Start),
            Err(DemoError::Media(_))
        ));
        assert!(app.ui().is_enabled(Button::Start));
        assert!(!app.ui().is_enabled(Button::Call));
    }

    #[test]
    fn test_preset_switches_preview() {
        let mut app = app();
        app.execute(Command::Start).unwrap();
        let lines = app.execute(Command::Preset(Preset::Low)).unwrap();
        assert!(lines.iter().any(|l| l.starts_with("Local video: 320x240")));
        assert_eq!(app.preview().dimensions().unwrap().width, 320);
    }

    #[test]
    fn test_preset_refused_during_call() {
        let mut app = app();
        app.execute(Command::Start).unwrap();
        app.execute(Command::Call).unwrap();
        assert!(matches!(
            app.execute(Command::Preset(Preset::High)),
            Err(DemoError::Usage(_))
        ));
    }

    #[test]
    fn test_data_page_flow() {
        let mut app = app();
        assert!(app.execute(Command::Send("x".to_string())).is_err());

        let lines = app.execute(Command::Open).unwrap();
        assert_eq!(lines, vec!["Send channel state is: open".to_string()]);
        assert!(app.ui().is_enabled(Button::Send));

        let lines = app.execute(Command::Send("hello".to_string())).unwrap();
        assert_eq!(lines, vec!["Received: hello".to_string()]);

        app.execute(Command::Close).unwrap();
        assert!(app.ui().is_enabled(Button::DataStart));
        assert!(!app.ui().is_enabled(Button::Send));
    }
}
