//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security: CORS, security headers and response compression
//! - Observability: request IDs and per-request tracing spans
//! - Recovery: panics, timeouts and middleware errors
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use filecast_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
pub mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt, SecurityHeadersConfig};
