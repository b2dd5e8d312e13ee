//! Plain HTTP server.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult, shutdown_signal};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves HTTP until shutdown.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::bind_error(server_addr, err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "HTTP server bound and ready"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        shutdown_signal(shutdown_timeout).await;
        let _ = signalled_tx.send(());
    };

    serve_with_shutdown(&server_config, || async move {
        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .into_future();

        tokio::select! {
            result = server => result,
            () = drain_deadline(signalled_rx, shutdown_timeout) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Connections still open after shutdown timeout, closing them"
                );
                Ok(())
            }
        }
    })
    .await
}

/// Completes `timeout` after the shutdown signal fired.
async fn drain_deadline(signalled: oneshot::Receiver<()>, timeout: Duration) {
    if signalled.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_bind_conflicts() -> anyhow::Result<()> {
        let occupied = TcpListener::bind("127.0.0.1:0").await?;
        let config = ServerConfig {
            port: occupied.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let error = serve_http(Router::new(), config)
            .await
            .expect_err("port is already bound");
        assert!(matches!(error, ServerError::BindError { .. }));
        assert_eq!(error.error_code(), "E001");
        Ok(())
    }
}
