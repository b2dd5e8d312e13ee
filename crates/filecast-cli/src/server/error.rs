//! Server error types with recovery suggestions.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failure to start or keep running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),

    /// TLS certificate or key could not be used.
    #[cfg_attr(not(feature = "tls"), allow(dead_code))]
    #[error("TLS certificate error: {0}")]
    TlsCertificate(String),
}

impl ServerError {
    /// Creates a bind error with address context.
    pub fn bind_error(address: SocketAddr, source: io::Error) -> Self {
        Self::BindError { address, source }
    }

    /// Returns a stable code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BindError { .. } => "E001",
            Self::Runtime(_) => "E002",
            Self::TlsCertificate(_) => "E003",
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::BindError { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("Try using a port above 1024 or run with appropriate privileges")
                }
                io::ErrorKind::AddrInUse => Some(
                    "The port is already in use. Try a different port or stop the conflicting service",
                ),
                io::ErrorKind::AddrNotAvailable => {
                    Some("The address is not available. Check network interface configuration")
                }
                _ => Some("Check network configuration and firewall settings"),
            },
            Self::Runtime(err) => match err.kind() {
                io::ErrorKind::TimedOut => {
                    Some("The operation timed out, consider increasing timeout values")
                }
                io::ErrorKind::InvalidData => {
                    Some("Check that certificate files are in correct PEM format")
                }
                _ => None,
            },
            Self::TlsCertificate(_) => {
                Some("Verify certificate and key files exist and are in correct PEM format")
            }
        }
    }
}
