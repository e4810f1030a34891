use env_logger::Target;

/// Logs go to stderr so a redirected stdout holds only the report.
pub fn setup_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(Target::Stderr)
        .format_timestamp_millis()
        .init();
}
