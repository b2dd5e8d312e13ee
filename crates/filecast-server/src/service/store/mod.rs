//! Content store abstraction and its backends.
//!
//! Handlers only see [`ContentStore`]. Two implementations exist:
//!
//! - [`NatsContentStore`] keeps objects in a NATS JetStream object bucket
//! - [`MemoryContentStore`] keeps objects in process memory

mod memory;
mod nats;
mod object_id;
mod slot;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;
use tokio::io::AsyncRead;

pub use self::memory::MemoryContentStore;
pub use self::nats::NatsContentStore;
pub use self::object_id::ObjectId;
pub use self::slot::StoreSlot;
use crate::Result;
use crate::streaming::ByteRange;

/// Tracing target for content store operations.
pub(crate) const TRACING_TARGET: &str = "filecast_server::service::store";

/// Media type recorded when an upload does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// An owned, type-erased byte source.
pub type ObjectReader<'a> = Pin<Box<dyn AsyncRead + Send + 'a>>;

/// Shared handle to a content store.
pub type SharedStore = Arc<dyn ContentStore>;

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Store-assigned identifier, used for deletion.
    pub id: ObjectId,
    /// Unique object name, used for retrieval.
    pub name: String,
    /// Exact content length in bytes.
    pub size_bytes: u64,
    /// Media type declared at upload.
    pub media_type: String,
    /// When the object finished uploading.
    pub created_at: Timestamp,
    /// Hex SHA-256 of the content, when the backend records it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Parameters of an object about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObject {
    pub name: String,
    pub media_type: String,
}

impl NewObject {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
        }
    }
}

/// Persistent storage of uploaded objects.
///
/// Implementations must make an object visible to `find` and `find_one`
/// only once all of its bytes are stored.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Short backend name for logs and health reports.
    fn backend(&self) -> &'static str;

    /// Streams `reader` into a new object.
    ///
    /// Fails with a conflict error if the name is already taken.
    async fn put(&self, object: NewObject, reader: ObjectReader<'_>) -> Result<StoredObject>;

    /// Lists every stored object, newest first.
    async fn find(&self) -> Result<Vec<StoredObject>>;

    /// Looks an object up by name.
    async fn find_one(&self, name: &str) -> Result<Option<StoredObject>>;

    /// Opens the object content, or the given slice of it.
    ///
    /// Fails with a not-found error if the object does not exist.
    async fn open_read_stream(
        &self,
        name: &str,
        range: Option<ByteRange>,
    ) -> Result<ObjectReader<'static>>;

    /// Removes an object by identifier.
    ///
    /// Fails with a not-found error if no object has this identifier.
    async fn delete(&self, id: &ObjectId) -> Result<()>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Sorts objects newest first, breaking ties by name.
pub(crate) fn sort_newest_first(objects: &mut [StoredObject]) {
    objects.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}
