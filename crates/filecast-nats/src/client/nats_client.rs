//! Connection to the NATS server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_nats::{Client, ConnectOptions, jetstream};
use tokio::time::timeout;

use super::nats_config::{NatsConfig, PING_INTERVAL, RECONNECT_BASE_DELAY, RECONNECT_MAX_DELAY};
use crate::object::ObjectStore;
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Upper bound for the flush round-trip in [`NatsClient::ping`].
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Connected NATS client with a JetStream context.
///
/// `async-nats` multiplexes everything over one connection, so clones share
/// it.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    jetstream: jetstream::Context,
}

impl NatsClient {
    /// Validates `config` and connects within its connect timeout.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;

        let connect_timeout = config.connect_timeout();
        let mut options = ConnectOptions::new()
            .name(config.name())
            .ping_interval(PING_INTERVAL)
            .connection_timeout(connect_timeout)
            .reconnect_delay_callback(reconnect_delay);

        if let Some(token) = config.nats_token.clone() {
            options = options.token(token);
        }
        if let Some(max_reconnects) = config.max_reconnects() {
            options = options.max_reconnects(max_reconnects);
        }

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = %config.nats_url,
            client_name = config.name(),
            "Connecting to NATS"
        );

        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(config.nats_url.as_str(), options),
        )
        .await
        .map_err(|_| Error::timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_id = %server_info.server_id,
            server_version = %server_info.version,
            max_payload = server_info.max_payload,
            "Connected to NATS"
        );

        let jetstream = jetstream::new(client.clone());
        Ok(Self {
            inner: Arc::new(NatsClientInner { client, jetstream }),
        })
    }

    /// Flushes the connection and returns the round-trip time.
    pub async fn ping(&self) -> Result<Duration> {
        let started = Instant::now();

        timeout(PING_TIMEOUT, self.inner.client.flush())
            .await
            .map_err(|_| Error::timeout(PING_TIMEOUT))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let elapsed = started.elapsed();
        tracing::trace!(
            target: TRACING_TARGET_CLIENT,
            duration_ms = elapsed.as_millis() as u64,
            "NATS flush round-trip"
        );
        Ok(elapsed)
    }

    /// Opens the object bucket, creating it on first use.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn object_store(&self, bucket: &str) -> Result<ObjectStore> {
        ObjectStore::open(&self.inner.jetstream, bucket).await
    }
}

/// Exponential reconnect backoff, capped.
fn reconnect_delay(attempts: usize) -> Duration {
    let exponent = u32::try_from(attempts.min(16)).unwrap_or(16);
    RECONNECT_BASE_DELAY
        .saturating_mul(1 << exponent)
        .min(RECONNECT_MAX_DELAY)
}
