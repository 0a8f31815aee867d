/// Explicit opt-in to log-and-continue on an error.
///
/// Errors are otherwise always propagated; use this only where failing the step
/// is genuinely not worth failing the run.
pub trait ResultExt<T, E> {
    /// Logs a warning with some context to the given sink if there is an `Err`.
    fn warn_on_err(self, sink: &crate::LogSink, msg: impl std::fmt::Display) -> Option<T>;
}

impl<T, E> ResultExt<T, E> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn warn_on_err(self, sink: &crate::LogSink, msg: impl std::fmt::Display) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                sink.warn(format_args!("{msg}: {err}"));
                None
            }
        }
    }
}
