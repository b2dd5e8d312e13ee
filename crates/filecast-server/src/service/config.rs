use std::sync::Arc;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use filecast_nats::{NatsClient, NatsConfig, RetryConfig};
use serde::{Deserialize, Serialize};

use crate::service::store::{MemoryContentStore, NatsContentStore, SharedStore};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default object bucket name.
    pub const BUCKET: &str = "uploads";

    /// Default upload body limit (1 GiB).
    pub const MAX_UPLOAD_SIZE: usize = 1024 * 1024 * 1024;
}

/// Backend that holds uploaded objects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// NATS JetStream object bucket.
    #[default]
    Nats,
    /// Process memory; contents are lost on restart.
    Memory,
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Content store backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Nats)
    )]
    pub store_backend: StoreBackend,

    /// Object bucket name.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_BUCKET", default_value = defaults::BUCKET)
    )]
    pub bucket: String,

    /// Maximum accepted upload body size in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = defaults::MAX_UPLOAD_SIZE)
    )]
    pub max_upload_size: usize,

    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::default(),
            bucket: defaults::BUCKET.to_owned(),
            max_upload_size: defaults::MAX_UPLOAD_SIZE,
            nats: NatsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Configuration for an in-memory store.
    pub fn memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            ..Self::default()
        }
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// - the bucket name must be non-empty and limited to `[A-Za-z0-9_-]`
    /// - the upload limit must be positive
    /// - NATS settings must be valid when the NATS backend is selected
    pub fn validate(&self) -> Result<()> {
        let bucket_valid = !self.bucket.is_empty()
            && self
                .bucket
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !bucket_valid {
            return Err(Error::config(format!(
                "invalid bucket name '{}'",
                self.bucket
            )));
        }

        if self.max_upload_size == 0 {
            return Err(Error::config("maximum upload size must be positive"));
        }

        if self.store_backend == StoreBackend::Nats {
            self.nats.validate().map_err(Error::config)?;
        }

        Ok(())
    }

    /// Connects the configured content store.
    ///
    /// NATS connection attempts are retried with exponential backoff.
    pub async fn connect_store(&self) -> Result<SharedStore> {
        match self.store_backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryContentStore::new())),
            StoreBackend::Nats => {
                let client = RetryConfig::default()
                    .retry(|| NatsClient::connect(self.nats.clone()))
                    .await
                    .map_err(|e| {
                        Error::external("nats", "Failed to connect to NATS").with_source(e)
                    })?;

                let store = NatsContentStore::open(client, &self.bucket).await?;
                Ok(Arc::new(store))
            }
        }
    }
}
