//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, TLS, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, request timeout
//! ├── service: ServiceConfig        # Store backend, bucket, NATS, upload limit
//! └── telemetry: TelemetryConfig    # Log output format
//! ```
//!
//! Every option can be given as a flag or an environment variable.
//!
//! ```bash
//! filecast --store-backend memory --port 8080
//! STORE_BACKEND=memory PORT=8080 filecast
//! ```

mod middleware;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
use filecast_server::service::{ServiceConfig, StoreBackend};
use serde::{Deserialize, Serialize};

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
pub use self::telemetry::{LogFormat, TelemetryConfig};
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "filecast")]
#[command(about = "Upload files and stream them back with byte-range support")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Content store configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Log output configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Cli {
    /// Loads a `.env` file (when enabled) and parses CLI arguments.
    ///
    /// The file is loaded first so that clap's `env` fallbacks see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        match self.service.store_backend {
            StoreBackend::Nats => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                backend = "nats",
                bucket = %self.service.bucket,
                nats_url = %self.service.nats.nats_url,
                token_configured = self.service.nats.nats_token.is_some(),
                max_upload_size = self.service.max_upload_size,
                "Content store configuration"
            ),
            StoreBackend::Memory => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                backend = "memory",
                bucket = %self.service.bucket,
                max_upload_size = self.service.max_upload_size,
                "Content store configuration"
            ),
        }
    }

    fn log_build_info() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "Starting filecast"
        );

        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "tls").then_some("tls"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_memory_backend() {
        let cli = Cli::parse_from(["filecast", "--store-backend", "memory", "--port", "8080"]);

        assert_eq!(cli.service.store_backend, StoreBackend::Memory);
        assert_eq!(cli.server.port, 8080);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_bucket() {
        let cli = Cli::parse_from([
            "filecast",
            "--store-backend",
            "memory",
            "--bucket",
            "bad bucket",
        ]);

        assert!(cli.validate().is_err());
    }
}
