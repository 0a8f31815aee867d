use std::sync::Arc;

/// A handle to where a run should write its diagnostic output.
///
/// Cheap to clone. Passed explicitly to whoever needs to log,
/// instead of configuring a process-wide logger.
#[derive(Clone)]
pub struct LogSink {
    logger: Arc<dyn log::Log>,
    target: &'static str,
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl LogSink {
    pub fn new(logger: impl log::Log + 'static) -> Self {
        Self::from_arc(Arc::new(logger))
    }

    pub fn from_arc(logger: Arc<dyn log::Log>) -> Self {
        Self {
            logger,
            target: "tensorscope",
        }
    }

    /// Forwards everything to whatever global logger is installed, e.g. by
    /// [`crate::setup_logging`].
    pub fn global() -> Self {
        Self::new(GlobalLogger)
    }

    /// Discards everything.
    pub fn null() -> Self {
        Self::new(NullLogger)
    }

    /// Use a different `target` for the records of this sink.
    #[inline]
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    #[inline]
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn log(&self, level: log::Level, args: std::fmt::Arguments<'_>) {
        self.logger.log(
            &log::Record::builder()
                .args(args)
                .level(level)
                .target(self.target)
                .build(),
        );
    }

    #[inline]
    pub fn trace(&self, args: std::fmt::Arguments<'_>) {
        self.log(log::Level::Trace, args);
    }

    #[inline]
    pub fn debug(&self, args: std::fmt::Arguments<'_>) {
        self.log(log::Level::Debug, args);
    }

    #[inline]
    pub fn info(&self, args: std::fmt::Arguments<'_>) {
        self.log(log::Level::Info, args);
    }

    #[inline]
    pub fn warn(&self, args: std::fmt::Arguments<'_>) {
        self.log(log::Level::Warn, args);
    }

    #[inline]
    pub fn error(&self, args: std::fmt::Arguments<'_>) {
        self.log(log::Level::Error, args);
    }

    pub fn flush(&self) {
        self.logger.flush();
    }
}

struct GlobalLogger;

impl log::Log for GlobalLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

struct NullLogger;

impl log::Log for NullLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &log::Record<'_>) {}

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLogger;

    #[test]
    fn sink_forwards_level_and_target() {
        let (sink, rx) = ChannelLogger::sink(log::LevelFilter::Debug);
        let sink = sink.with_target("tensorscope::flow");

        sink.debug(format_args!("reshaped to {:?}", [1, 2]));
        sink.trace(format_args!("too chatty"));
        sink.warn(format_args!("careful"));

        let msgs: Vec<_> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].level, log::Level::Debug);
        assert_eq!(msgs[0].target, "tensorscope::flow");
        assert_eq!(msgs[0].msg, "reshaped to [1, 2]");
        assert_eq!(msgs[1].level, log::Level::Warn);
    }

    #[test]
    fn clones_share_the_logger() {
        let (sink, rx) = ChannelLogger::sink(log::LevelFilter::Info);
        let other = sink.clone();

        sink.info(format_args!("one"));
        other.info(format_args!("two"));

        let msgs: Vec<String> = rx.try_iter().map(|m| m.msg).collect();
        similar_asserts::assert_eq!(msgs, vec!["one".to_owned(), "two".to_owned()]);
    }

    #[test]
    fn null_sink_is_silent() {
        let sink = LogSink::null();
        sink.error(format_args!("nobody hears this"));
        sink.flush();
    }
}
