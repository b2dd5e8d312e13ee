//! HTTP/HTTPS server startup with graceful shutdown.
//!
//! With the `tls` feature and both certificate paths configured the server
//! speaks HTTPS through `axum-server`, otherwise plain HTTP through
//! `axum::serve`.

mod error;
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;
mod shutdown;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;

/// Serves `app` until a shutdown signal arrives.
///
/// # Errors
///
/// - TLS certificates cannot be loaded (HTTPS mode)
/// - the address cannot be bound
/// - the server fails while running
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    #[cfg(feature = "tls")]
    let tls = config
        .tls_paths()
        .map(|(cert, key)| (cert.to_path_buf(), key.to_path_buf()));

    #[cfg(feature = "tls")]
    if let Some((cert_path, key_path)) = tls {
        return https_server::serve_https(app, config, cert_path, key_path).await;
    }

    http_server::serve_http(app, config).await
}
