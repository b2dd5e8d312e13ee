//! Middleware configuration for the HTTP server.
//!
//! Both groups are defined in `filecast-server` and flattened here.
//!
//! ```bash
//! filecast --allowed-origins "https://media.example" --request-timeout 600
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use filecast_server::middleware::{CorsConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Upper bound for the request timeout, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// Middleware configuration combining CORS and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates the request timeout range.
    pub fn validate(&self) -> AnyhowResult<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT_SECS} seconds."
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_timeouts() {
        let mut config = MiddlewareConfig::default();

        config.recovery = RecoveryConfig::with_timeout_secs(0);
        assert!(config.validate().is_err());

        config.recovery = RecoveryConfig::with_timeout_secs(MAX_REQUEST_TIMEOUT_SECS + 1);
        assert!(config.validate().is_err());
    }
}
