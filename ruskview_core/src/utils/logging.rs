use env_logger::Env;

/// Initialize logging using env_logger.
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=ruskview_core=debug ruskview test <id>`;
/// otherwise `default_level` applies.
pub fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}
