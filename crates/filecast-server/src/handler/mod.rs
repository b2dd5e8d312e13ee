//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use filecast_server::handler::routes;
//! use filecast_server::service::store::MemoryContentStore;
//! use filecast_server::service::{ServiceConfig, ServiceState};
//!
//! let config = ServiceConfig::memory();
//! let state = ServiceState::with_store(config.clone(), Arc::new(MemoryContentStore::new()));
//! let router: axum::Router = routes(&config).with_state(state);
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod files;
mod index;
mod media;
mod monitors;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorResponse, File, Files, HealthStatus, MonitorStatus};
use crate::service::{ServiceConfig, ServiceState};

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
pub fn routes(config: &ServiceConfig) -> Router<ServiceState> {
    Router::new()
        .merge(index::routes())
        .merge(files::routes(config))
        .merge(media::routes())
        .merge(monitors::routes())
        .fallback(handler)
}
