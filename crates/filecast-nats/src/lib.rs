#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "filecast_nats::client";

/// Tracing target for NATS object store operations.
///
/// Use this target for logging bucket setup, uploads, reads and deletes.
pub const TRACING_TARGET_OBJECT: &str = "filecast_nats::object";

/// Tracing target for NATS connection operations.
///
/// Use this target for logging connection establishment, reconnection, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "filecast_nats::connection";

mod client;
mod error;
pub mod object;
mod retry;

pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};
pub use object::{GetResult, HashingReader, ObjectStore, ObjectSummary, SkipReader};
pub use retry::RetryConfig;
