use std::io::Write as _;
use std::path::PathBuf;

use parking_lot::Mutex;

/// Errors that can occur when creating a [`FileLogger`].
#[derive(thiserror::Error, Debug)]
pub enum FileLoggerError {
    /// Error creating or opening the file.
    #[error("Failed to open log file {0:?}: {1}")]
    OpenFile(PathBuf, std::io::Error),
}

/// Writes leveled, timestamped text lines to a file.
///
/// Each line has the form `<timestamp> - <LEVEL> - <message>`, where the timestamp is
/// RFC 3339 in UTC. The file is opened in append mode, so consecutive runs accumulate.
pub struct FileLogger {
    filter: log::LevelFilter,
    path: PathBuf,
    writer: Mutex<std::io::BufWriter<std::fs::File>>,
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        self.writer.lock().flush().ok();
    }
}

impl FileLogger {
    /// Open (or create) the log file at the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        filter: log::LevelFilter,
    ) -> Result<Self, FileLoggerError> {
        let path = path.into();

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| FileLoggerError::OpenFile(path.clone(), err))?;

        Ok(Self {
            filter,
            path,
            writer: Mutex::new(std::io::BufWriter::new(file)),
        })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        crate::is_log_enabled(self.filter, metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = jiff::Timestamp::now();
        let mut writer = self.writer.lock();
        if let Err(err) = writeln!(
            writer,
            "{timestamp} - {} - {}",
            record.level(),
            record.args()
        ) {
            // Can't log this through ourselves.
            eprintln!("Failed to write to log file {:?}: {err}", self.path);
        }
    }

    fn flush(&self) {
        self.writer.lock().flush().ok();
    }
}
