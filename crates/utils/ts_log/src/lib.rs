//! Text logging (nothing to do with the tensors themselves).
//!
//! Provides helpers for adding multiple loggers,
//! and for setting up logging on native.
//!
//! * `trace`: spammy things
//! * `debug`: things that might be useful when debugging
//! * `info`: things that we want to show to users
//! * `warn`: problems that we can recover from
//! * `error`: problems that lead to loss of functionality or data
//!
//! Visualizer runs do not log through the global logger: they receive an explicit
//! [`LogSink`], so that where their output ends up is decided by the caller.

mod channel_logger;
mod file_logger;
mod result_extensions;
mod sink;

#[cfg(feature = "setup")]
mod setup;

pub use log::{Level, LevelFilter, debug, error, info, trace, warn};

pub use self::channel_logger::{ChannelLogger, LogMsg};
pub use self::file_logger::{FileLogger, FileLoggerError};
pub use self::result_extensions::ResultExt;
pub use self::sink::LogSink;

#[cfg(feature = "setup")]
pub use self::setup::setup_logging;

/// Re-exports of other crates.
pub mod external {
    pub use log;
}

/// Should we log this message given the filter?
pub(crate) fn is_log_enabled(filter: log::LevelFilter, metadata: &log::Metadata<'_>) -> bool {
    metadata.level() <= filter
}
