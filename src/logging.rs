//! Logging setup for the command-line front end.
//!
//! Library code only emits `tracing` events. The binary calls [`init_logging`]
//! once to install a human-readable subscriber on stderr, keeping stdout free
//! for JSON output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used as the filter
/// directive. Fails if `level` is not a valid directive or a subscriber is
/// already installed.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = build_env_filter(level)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!(level, "logging initialized");
    Ok(())
}

fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e)),
    }
}
