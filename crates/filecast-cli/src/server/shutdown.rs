//! Shutdown signals.

use std::io;
use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves on the first SIGINT, or SIGTERM on Unix.
///
/// A signal whose handler cannot be installed is logged and never fires;
/// the other one still works.
pub async fn shutdown_signal(shutdown_timeout: Duration) {
    let signal = tokio::select! {
        () = wait_for("SIGINT", tokio::signal::ctrl_c()) => "SIGINT",
        () = terminate() => "SIGTERM",
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal,
        timeout_secs = shutdown_timeout.as_secs(),
        "Shutting down gracefully"
    );
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => wait_for("SIGTERM", async { Err::<(), _>(err) }).await,
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending().await
}

async fn wait_for(name: &str, signal: impl Future<Output = io::Result<()>>) {
    if let Err(err) = signal.await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            signal = name,
            error = %err,
            "Cannot listen for signal"
        );
        std::future::pending::<()>().await;
    }
}
