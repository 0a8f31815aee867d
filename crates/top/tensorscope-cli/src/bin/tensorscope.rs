fn main() -> anyhow::Result<std::process::ExitCode> {
    ts_log::setup_logging();
    tensorscope_cli::run(std::env::args()).map(std::process::ExitCode::from)
}
