//! Log output setup.
//!
//! Everything goes to stderr so `--format json` and `--format csv` output on
//! stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` when set, else the configured level.
///
/// An unparseable configured level falls back to `warn`.
pub fn build_filter(config: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|s| !s.trim().is_empty())
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return filter;
    }
    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Call once, at startup.
pub fn init(config: &LoggingConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(build_filter(config, rust_log.as_deref()));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
