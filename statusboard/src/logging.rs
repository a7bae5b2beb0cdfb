//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a fmt
//! layer. Output goes to stderr so `check --json` keeps stdout clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Initialize the global subscriber from environment variables.
pub fn init() -> anyhow::Result<()> {
    init_with(&LogConfig::from_env())
}

/// Initialize the global subscriber with an explicit configuration.
pub fn init_with(config: &LogConfig) -> anyhow::Result<()> {
    let filter = build_filter(&config.level);
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Parse the filter directive, falling back to `info` when it is invalid.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {level:?} ({e}), falling back to info");
        EnvFilter::new("info")
    })
}
