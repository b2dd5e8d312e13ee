#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use axum::Router;
use filecast_server::handler::routes;
use filecast_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
};
use filecast_server::service::ServiceState;
use tokio::task::JoinHandle;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "filecast_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "filecast_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "filecast_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
///
/// The listener comes up before the content store is connected; store-backed
/// routes answer 503 until the background initializer finishes. A failed
/// initialization stops the server.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate()?;

    let state = ServiceState::new(cli.service.clone());
    let router = create_router(state.clone(), &cli.middleware);

    let initializer = spawn_store_initializer(state);
    let abort_initializer = initializer.abort_handle();

    let result = tokio::select! {
        result = server::serve(router, cli.server) => {
            result.context("server terminated with an error")
        }
        error = store_failure(initializer) => Err(error),
    };

    abort_initializer.abort();
    result
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, compression
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state.config())
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}

/// Connects the configured content store in the background.
fn spawn_store_initializer(state: ServiceState) -> JoinHandle<filecast_server::Result<()>> {
    tokio::spawn(async move {
        let backend = state.config().store_backend;
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            backend = ?backend,
            bucket = %state.config().bucket,
            "Connecting content store"
        );

        state.initialize_store().await?;

        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            backend = ?backend,
            "Content store ready"
        );
        Ok(())
    })
}

/// Resolves only when store initialization fails.
async fn store_failure(initializer: JoinHandle<filecast_server::Result<()>>) -> anyhow::Error {
    match initializer.await {
        Ok(Ok(())) => std::future::pending().await,
        Ok(Err(error)) => {
            anyhow::Error::new(error).context("failed to initialize the content store")
        }
        Err(error) => anyhow::Error::new(error).context("content store initializer stopped"),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use filecast_server::service::ServiceConfig;

    use super::*;

    fn test_middleware() -> MiddlewareConfig {
        MiddlewareConfig::default()
    }

    #[tokio::test]
    async fn router_serves_after_store_initialization() -> anyhow::Result<()> {
        let state = ServiceState::new(ServiceConfig::memory());
        let router = create_router(state.clone(), &test_middleware());
        let server = TestServer::new(router)?;

        server
            .get("/files")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);

        spawn_store_initializer(state).await??;

        server.get("/files").await.assert_status_not_found();
        server.get("/health").await.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn router_applies_middleware_layers() -> anyhow::Result<()> {
        let state = ServiceState::new(ServiceConfig::memory());
        state.initialize_store().await?;
        let server = TestServer::new(create_router(state, &test_middleware()))?;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-content-type-options"));
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_reports_initializer_error() {
        let initializer = tokio::spawn(async {
            Err(filecast_server::Error::config("bucket missing"))
        });

        let error = store_failure(initializer).await;
        assert!(format!("{error:#}").contains("bucket missing"));
    }

    #[tokio::test]
    async fn store_failure_stays_pending_on_success() {
        let initializer = tokio::spawn(async { Ok(()) });
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            store_failure(initializer),
        )
        .await;

        assert!(waited.is_err());
    }
}
