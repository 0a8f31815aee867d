//! Capture log messages and send them to some receiver over a channel.
//!
//! Mostly useful in tests, to assert on what a visualizer run reported.

use std::sync::mpsc::{Receiver, Sender};

/// A single captured log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMsg {
    pub level: log::Level,

    /// The `target` of the record, e.g. `tensorscope::flow`.
    pub target: String,

    pub msg: String,
}

/// Pipe log messages to a channel.
pub struct ChannelLogger {
    filter: log::LevelFilter,
    tx: parking_lot::Mutex<Sender<LogMsg>>,
}

impl ChannelLogger {
    pub fn new(filter: log::LevelFilter) -> (Self, Receiver<LogMsg>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (
            Self {
                filter,
                tx: tx.into(),
            },
            rx,
        )
    }

    /// Creates a [`crate::LogSink`] backed by a new channel, and the receiving end of it.
    pub fn sink(filter: log::LevelFilter) -> (crate::LogSink, Receiver<LogMsg>) {
        let (logger, rx) = Self::new(filter);
        (crate::LogSink::new(logger), rx)
    }
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        crate::is_log_enabled(self.filter, metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = LogMsg {
            level: record.level(),
            target: record.target().to_owned(),
            msg: record.args().to_string(),
        };

        // The receiver may have hung up, in which case nobody is listening anymore.
        self.tx.lock().send(msg).ok();
    }

    fn flush(&self) {}
}
