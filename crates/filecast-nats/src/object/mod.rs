//! Object storage functionality using NATS JetStream.
//!
//! - [`ObjectStore`] - bucket wrapper with streaming upload and forward-only reads
//! - [`ObjectSummary`] - metadata of a stored object
//! - [`GetResult`] - an open reader plus its metadata
//! - [`HashingReader`] - SHA-256 over bytes as they stream through
//! - [`SkipReader`] - lazy skip-ahead for forward-only reads

mod hashing_reader;
mod object_data;
mod object_store;
mod skip_reader;

pub use hashing_reader::HashingReader;
pub use object_data::{CONTENT_TYPE_KEY, GetResult, ObjectSummary};
pub use object_store::ObjectStore;
pub use skip_reader::SkipReader;
