//! Background log file writer.

use crate::error::Result;
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};

pub(crate) struct LogWriter {
    out: BufWriter<File>,
}

impl LogWriter {
    /// Opens (or creates) the file in append mode.
    pub fn open(log_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    fn write_message(&mut self, message: &LogMessage) {
        let written = self
            .out
            .write_all(message.format().as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            eprintln!("Error writing log: {}", e);
        }
    }

    /// Drains the channel until every sender is dropped.
    pub fn run(mut self, receiver: Receiver<LogMessage>) {
        for message in receiver {
            self.write_message(&message);
        }
    }
}

/// Opens the log file and starts the writer thread, returning its inbox.
pub(crate) fn spawn_writer_thread(log_path: &Path) -> Result<Sender<LogMessage>> {
    let writer = LogWriter::open(log_path)?;
    let (sender, receiver) = channel();
    std::thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))?;
    Ok(sender)
}
