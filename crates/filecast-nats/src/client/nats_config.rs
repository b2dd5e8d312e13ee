//! NATS connection configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

const DEFAULT_URL: &str = "nats://127.0.0.1:4222";
const DEFAULT_NAME: &str = "filecast";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RECONNECTS: usize = 10;

/// First reconnect delay; later attempts back off exponentially.
pub(crate) const RECONNECT_BASE_DELAY: Duration = Duration::from_secs(2);
pub(crate) const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(30);
pub(crate) const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Where and how to reach the NATS server that holds the uploads bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct NatsConfig {
    /// NATS server URL (comma-separated for clustering)
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-url", env = "NATS_URL", default_value = DEFAULT_URL)
    )]
    pub nats_url: String,

    /// Authentication token
    #[cfg_attr(feature = "config", arg(long = "nats-token", env = "NATS_TOKEN"))]
    pub nats_token: Option<String>,

    /// Client name reported to the server
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-client-name", env = "NATS_CLIENT_NAME")
    )]
    pub nats_client_name: Option<String>,

    /// Connection timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-connect-timeout", env = "NATS_CONNECT_TIMEOUT_SECS")
    )]
    pub nats_connect_timeout: Option<u64>,

    /// Reconnection attempts after a lost connection (0 = unlimited)
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-max-reconnects", env = "NATS_MAX_RECONNECTS")
    )]
    pub nats_max_reconnects: Option<usize>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl NatsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            nats_url: url.into(),
            nats_token: None,
            nats_client_name: None,
            nats_connect_timeout: None,
            nats_max_reconnects: None,
        }
    }

    pub fn name(&self) -> &str {
        self.nats_client_name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// Server URLs, split on commas.
    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.nats_url.split(',').map(str::trim)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.nats_connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// `None` means reconnect forever.
    pub fn max_reconnects(&self) -> Option<usize> {
        match self.nats_max_reconnects.unwrap_or(DEFAULT_MAX_RECONNECTS) {
            0 => None,
            max => Some(max),
        }
    }

    /// Checks URLs, token and timeout.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(server) = self
            .servers()
            .find(|server| !server.starts_with("nats://") && !server.starts_with("tls://"))
        {
            return Err(format!(
                "invalid NATS server URL '{server}', expected nats:// or tls://"
            ));
        }

        if self.nats_token.as_deref().is_some_and(str::is_empty) {
            return Err("NATS token cannot be empty when provided".to_owned());
        }

        if self.nats_connect_timeout == Some(0) {
            return Err("NATS connection timeout must be greater than 0".to_owned());
        }

        Ok(())
    }
}
