//! Tracing subscriber setup.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, TelemetryConfig};

/// Installs the global tracing subscriber.
///
/// ```bash
/// RUST_LOG=debug filecast
/// RUST_LOG=filecast_server=trace,tower_http=debug filecast --log-format json
/// ```
pub(crate) fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(create_env_filter()?);

    match config.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_ansi(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    }
    .context("Failed to initialize tracing")
}

fn create_env_filter() -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")
}
