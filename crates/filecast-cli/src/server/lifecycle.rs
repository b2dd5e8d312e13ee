//! Server lifecycle logging and error classification.

use std::future::Future;
use std::io;
use std::time::Instant;

use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs the server future and logs how it ended.
pub(crate) async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces - ensure firewall is configured"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        "Server is ready and listening for connections"
    );

    let result = serve_fn().await.map_err(ServerError::Runtime);
    handle_result(result, start_time)
}

fn handle_result(result: ServerResult<()>, start_time: Instant) -> ServerResult<()> {
    let uptime_secs = start_time.elapsed().as_secs();

    match &result {
        Ok(()) => tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "Shutdown completed"
        ),
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                error_code = err.error_code(),
                uptime_secs,
                "Fatal server error"
            );

            if let Some(suggestion) = err.suggestion() {
                tracing::info!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    suggestion,
                    "Recovery suggestion"
                );
            }
        }
    }

    result
}
