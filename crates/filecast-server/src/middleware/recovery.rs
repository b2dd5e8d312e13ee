//! Panic and timeout recovery.
//!
//! The timeout bounds the time until response headers are produced. Uploads
//! are read entirely inside the handler, so it caps upload duration too; a
//! response body that is still streaming is never cut off.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "filecast_server::middleware::recovery";

/// Five minutes, enough for a large upload on a slow link.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Recovery middleware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds allowed before response headers are sent.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

impl RecoveryConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            request_timeout: secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Turns panics into 500 responses and slow requests into 408 responses.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    /// Same as [`with_recovery`] with [`RecoveryConfig::default`].
    ///
    /// [`with_recovery`]: RouterRecoveryExt::with_recovery
    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        let timeout = config.request_timeout();
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(move |err: tower::BoxError| async move {
                recover_from_error(err, timeout)
            }))
            .layer(CatchPanicLayer::custom(recover_from_panic))
            .layer(TimeoutLayer::new(timeout));

        self.layer(middlewares)
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

fn recover_from_error(err: tower::BoxError, timeout: Duration) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!(
            target: TRACING_TARGET,
            timeout_secs = timeout.as_secs(),
            "Request timed out before a response was produced"
        );

        return ErrorKind::RequestTimeout
            .with_context(format!("limit is {} seconds", timeout.as_secs()))
            .into_response();
    }

    tracing::error!(
        target: TRACING_TARGET,
        error = %err,
        "Unhandled middleware error"
    );

    Error::new(ErrorKind::InternalServerError).into_response()
}

fn recover_from_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(
        target: TRACING_TARGET,
        panic = %message,
        "Handler panicked"
    );

    ErrorKind::InternalServerError.into_response()
}
