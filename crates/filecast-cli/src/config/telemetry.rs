//! Log output configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Formatting of log lines written to stdout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with ANSI colors.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Log output configuration.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log line format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,
}
