//! Function to setup logging in binaries.

/// Crates that are too loud below `warn` level. They are capped at `warn` by default.
const LOUD_CRATES: [&str; 2] = ["png", "image"];

/// The default `RUST_LOG` filter, unless the user sets one.
fn default_log_filter() -> String {
    let mut filter = "info".to_owned();
    for loud_crate in LOUD_CRATES {
        filter.push(',');
        filter.push_str(loud_crate);
        filter.push_str("=warn");
    }
    filter
}

/// Installs `env_logger` as the global logger, writing to stderr.
///
/// Respects `RUST_LOG`, defaulting to `info`.
/// Calling this more than once is harmless.
pub fn setup_logging() {
    let env = env_logger::Env::default().default_filter_or(default_log_filter());

    let result = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init();

    if result.is_ok() {
        log::debug!("Logging set up");
    }
}

#[test]
fn test_default_log_filter() {
    assert_eq!(default_log_filter(), "info,png=warn,image=warn");
}
