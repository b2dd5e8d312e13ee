//! Errors returned by the NATS client and the uploads bucket.

use std::time::Duration;

/// Result alias defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure talking to NATS or to an object bucket.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client could not connect or lost its connection.
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// Reading the upload body or an object chunk failed.
    #[error("Object stream error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Object '{name}' not found in bucket '{bucket}'")]
    ObjectNotFound { bucket: String, name: String },

    /// Object names are unique within a bucket.
    #[error("Object '{name}' already exists in bucket '{bucket}'")]
    ObjectExists { bucket: String, name: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A JetStream request failed; `operation` names the bucket call.
    #[error("NATS operation '{operation}' failed: {details}")]
    Operation { operation: String, details: String },
}

impl Error {
    pub fn operation(op: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Operation {
            operation: op.into(),
            details: details.into(),
        }
    }

    pub fn object_not_found(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    pub fn object_exists(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectExists {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Whether the same call may succeed later.
    ///
    /// Only connection trouble, timeouts and failed JetStream requests
    /// qualify; missing or duplicate objects and bad configuration do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout { .. } | Self::Operation { .. }
        )
    }
}
