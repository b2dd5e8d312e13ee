//! Monitor response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Health of the server's content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The store is connected and answering.
    Healthy,
    /// The store is still connecting.
    Initializing,
    /// The store stopped answering.
    Unhealthy,
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Overall health status.
    pub status: HealthStatus,
    /// Content store backend, once initialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Application version.
    pub version: String,
}

impl MonitorStatus {
    /// Creates a status report generated now.
    pub fn new(status: HealthStatus, backend: Option<&str>) -> Self {
        Self {
            status,
            backend: backend.map(str::to_owned),
            checked_at: Timestamp::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Whether this status should be served as 200.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
