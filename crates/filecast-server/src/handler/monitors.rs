//! Health check handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::handler::response::{HealthStatus, MonitorStatus};
use crate::service::ServiceState;
use crate::service::store::StoreSlot;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "filecast_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(State(store_slot): State<StoreSlot>) -> (StatusCode, Json<MonitorStatus>) {
    let response = match store_slot.get() {
        None => MonitorStatus::new(HealthStatus::Initializing, None),
        Some(store) => match store.ping().await {
            Ok(()) => MonitorStatus::new(HealthStatus::Healthy, Some(store.backend())),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    backend = store.backend(),
                    error = %error,
                    "Content store ping failed"
                );
                MonitorStatus::new(HealthStatus::Unhealthy, Some(store.backend()))
            }
        },
    };

    let status_code = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    (status_code, Json(response))
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::handler::test::{create_test_server, create_test_server_with_state};
    use crate::service::{ServiceConfig, ServiceState};

    #[tokio::test]
    async fn healthy_once_store_is_ready() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_before_store_is_ready() -> anyhow::Result<()> {
        let state = ServiceState::new(ServiceConfig::memory());
        let server = create_test_server_with_state(state.clone())?;

        let health = server.get("/health").await;
        health.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health.json::<serde_json::Value>()["status"], "initializing");

        for path in ["/", "/files", "/files/abc.png", "/image/abc.png", "/video/v1.mp4"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(
                response.json::<serde_json::Value>()["err"],
                "Content store is not ready",
                "{path}"
            );
        }

        state.initialize_store().await?;
        server.get("/health").await.assert_status_ok();
        server.get("/files").await.assert_status_not_found();
        Ok(())
    }
}
