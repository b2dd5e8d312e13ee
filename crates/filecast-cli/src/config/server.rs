//! Listener settings: address, port, shutdown window and optional TLS.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
#[cfg(feature = "tls")]
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result as AnyhowResult, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 300;

/// Where the server listens and how long it drains on shutdown.
///
/// `--host 0.0.0.0` exposes the server on every interface; the default keeps
/// it on loopback.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    pub shutdown_timeout: u64,

    /// PEM certificate chain; enables HTTPS together with --tls-key-path
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_CERT_PATH", requires = "tls_key_path")]
    pub tls_cert_path: Option<PathBuf>,

    /// PEM private key matching --tls-cert-path
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_KEY_PATH", requires = "tls_cert_path")]
    pub tls_key_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Rejects privileged ports, an out-of-range shutdown window and a
    /// certificate without its key (or the other way round).
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port < 1024 {
            bail!(
                "port {} is privileged; choose a port between 1024 and 65535",
                self.port
            );
        }

        if !(1..=MAX_SHUTDOWN_TIMEOUT_SECS).contains(&self.shutdown_timeout) {
            bail!(
                "shutdown timeout must be between 1 and {MAX_SHUTDOWN_TIMEOUT_SECS} seconds, got {}",
                self.shutdown_timeout
            );
        }

        #[cfg(feature = "tls")]
        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            bail!("--tls-cert-path and --tls-key-path must be given together");
        }

        Ok(())
    }

    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// `0.0.0.0` or `::`.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    /// Certificate and key paths, when both are configured.
    #[cfg(feature = "tls")]
    pub fn tls_paths(&self) -> Option<(&Path, &Path)> {
        Some((self.tls_cert_path.as_deref()?, self.tls_key_path.as_deref()?))
    }

    pub fn is_tls_enabled(&self) -> bool {
        #[cfg(feature = "tls")]
        return self.tls_paths().is_some();

        #[cfg(not(feature = "tls"))]
        false
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            tls = self.is_tls_enabled(),
            "Listener configured"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            #[cfg(feature = "tls")]
            tls_cert_path: None,
            #[cfg(feature = "tls")]
            tls_key_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_loopback_3001() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.binds_to_all_interfaces());
        assert!(!config.is_tls_enabled());
        assert_eq!(config.server_addr(), SocketAddr::from(([127, 0, 0, 1], 3001)));
    }

    #[test]
    fn privileged_port_is_rejected() {
        let config = ServerConfig {
            port: 80,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn shutdown_window_bounds() {
        for (secs, ok) in [(0, false), (1, true), (300, true), (301, false)] {
            let config = ServerConfig {
                shutdown_timeout: secs,
                ..ServerConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "{secs}");
        }
    }

    #[test]
    fn unspecified_hosts_bind_everywhere() {
        for host in [IpAddr::V4(Ipv4Addr::UNSPECIFIED), "::".parse().unwrap()] {
            let config = ServerConfig {
                host,
                ..ServerConfig::default()
            };
            assert!(config.binds_to_all_interfaces());
        }
    }

    #[cfg(feature = "tls")]
    #[test]
    fn certificate_needs_key() {
        let mut config = ServerConfig {
            tls_cert_path: Some(PathBuf::from("cert.pem")),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.tls_paths().is_none());

        config.tls_key_path = Some(PathBuf::from("key.pem"));
        assert!(config.validate().is_ok());
        assert!(config.is_tls_enabled());
    }
}
