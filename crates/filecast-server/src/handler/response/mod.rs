//! Response types for HTTP handlers.

mod error_response;
mod files;
mod monitors;

pub use error_response::ErrorResponse;
pub use files::{File, Files};
pub use monitors::{HealthStatus, MonitorStatus};
