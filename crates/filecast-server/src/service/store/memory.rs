use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use filecast_nats::HashingReader;
use jiff::Timestamp;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ContentStore, NewObject, ObjectId, ObjectReader, StoredObject, TRACING_TARGET,
    sort_newest_first,
};
use crate::streaming::ByteRange;
use crate::{Error, Result};

struct MemoryEntry {
    object: StoredObject,
    content: Bytes,
}

/// Content store that keeps every object in process memory.
///
/// Used for local development and tests. Clones share the same objects.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    objects: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, object: NewObject, reader: ObjectReader<'_>) -> Result<StoredObject> {
        let mut reader = HashingReader::new(reader);
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await?;

        let mut objects = self.objects.write().await;
        if objects.contains_key(&object.name) {
            return Err(Error::conflict(format!(
                "object '{}' already exists",
                object.name
            )));
        }

        let id = ObjectId::parse(&Uuid::now_v7().simple().to_string())
            .ok_or_else(|| Error::internal("memory", "generated an invalid object id"))?;

        let stored = StoredObject {
            id,
            name: object.name,
            size_bytes: reader.bytes_read(),
            media_type: object.media_type,
            created_at: Timestamp::now(),
            sha256: Some(reader.finalize_hex()),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            name = %stored.name,
            size = stored.size_bytes,
            "Stored object in memory"
        );

        objects.insert(
            stored.name.clone(),
            MemoryEntry {
                object: stored.clone(),
                content: Bytes::from(content),
            },
        );

        Ok(stored)
    }

    async fn find(&self) -> Result<Vec<StoredObject>> {
        let objects = self.objects.read().await;
        let mut found: Vec<_> = objects.values().map(|e| e.object.clone()).collect();
        sort_newest_first(&mut found);
        Ok(found)
    }

    async fn find_one(&self, name: &str) -> Result<Option<StoredObject>> {
        let objects = self.objects.read().await;
        Ok(objects.get(name).map(|e| e.object.clone()))
    }

    async fn open_read_stream(
        &self,
        name: &str,
        range: Option<ByteRange>,
    ) -> Result<ObjectReader<'static>> {
        let content = {
            let objects = self.objects.read().await;
            let entry = objects
                .get(name)
                .ok_or_else(|| Error::not_found(format!("object '{name}' not found")))?;
            entry.content.clone()
        };

        let content = match range {
            None => content,
            Some(range) => {
                let (start, end) = (range.start() as usize, range.end() as usize);
                if end >= content.len() {
                    return Err(Error::io(format!(
                        "range {start}-{end} exceeds object '{name}' of {} bytes",
                        content.len()
                    )));
                }
                content.slice(start..=end)
            }
        };

        Ok(Box::pin(Cursor::new(content)))
    }

    async fn delete(&self, id: &ObjectId) -> Result<()> {
        let mut objects = self.objects.write().await;
        let name = objects
            .values()
            .find(|e| &e.object.id == id)
            .map(|e| e.object.name.clone())
            .ok_or_else(|| Error::not_found(format!("object with id '{id}' not found")))?;

        objects.remove(&name);
        tracing::debug!(target: TRACING_TARGET, name = %name, id = %id, "Deleted object");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
