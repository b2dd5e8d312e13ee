//! Application state, configuration and the content store.

mod config;
mod state;
pub mod store;

pub use crate::service::config::{ServiceConfig, StoreBackend};
pub use crate::service::state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
