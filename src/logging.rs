use std::io;

/// Install the global subscriber, writing to stderr so stdout carries only
/// the transcript. `RUST_LOG` wins over the verbosity count.
pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(filter_for(verbose_level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .try_init();
}

#[must_use]
pub fn filter_for(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn",
        1 => "info,flow_chat=debug,flow_api=debug,settings_store=debug",
        _ => "debug,flow_chat=trace,flow_api=trace,settings_store=trace",
    }
}
