//! Upload bucket backed by a JetStream object store.

use std::collections::HashMap;
use std::sync::Arc;

use async_nats::jetstream;
use async_nats::jetstream::context::ObjectStoreErrorKind;
use async_nats::jetstream::object_store;
use futures::TryStreamExt;
use tokio::io::AsyncRead;

use super::hashing_reader::HashingReader;
use super::object_data::{CONTENT_TYPE_KEY, GetResult, ObjectSummary};
use crate::{Error, Result, TRACING_TARGET_OBJECT};

/// Handle to one object bucket. Clones share the bucket.
#[derive(Clone)]
pub struct ObjectStore {
    objects: object_store::ObjectStore,
    bucket: Arc<str>,
}

impl ObjectStore {
    /// Binds to `bucket`, creating it on first use. Objects never expire.
    pub async fn open(jetstream: &jetstream::Context, bucket: &str) -> Result<Self> {
        let objects = match jetstream.get_object_store(bucket).await {
            Ok(objects) => {
                tracing::debug!(target: TRACING_TARGET_OBJECT, bucket, "Using existing bucket");
                objects
            }
            Err(e) if matches!(e.kind(), ObjectStoreErrorKind::GetStore) => {
                tracing::info!(target: TRACING_TARGET_OBJECT, bucket, "Creating bucket");
                let config = object_store::Config {
                    bucket: bucket.to_owned(),
                    ..Default::default()
                };
                jetstream
                    .create_object_store(config)
                    .await
                    .map_err(|e| Error::operation("create_object_store", e.to_string()))?
            }
            Err(e) => return Err(Error::operation("get_object_store", e.to_string())),
        };

        Ok(Self {
            objects,
            bucket: Arc::from(bucket),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Streams `reader` into the bucket as `name`.
    ///
    /// Chunks are published as they are read and the object info last, so a
    /// half-written object is never visible. Fails with
    /// [`Error::ObjectExists`] when `name` is already taken.
    ///
    /// The existence check and the write are separate calls and a bucket
    /// `put` replaces an object of the same name, so two concurrent writers
    /// of one name can still race. Callers that need uniqueness generate
    /// collision-free names.
    pub async fn put<R>(&self, name: &str, content_type: &str, reader: R) -> Result<ObjectSummary>
    where
        R: AsyncRead + Unpin,
    {
        if self.info(name).await?.is_some() {
            return Err(Error::object_exists(&*self.bucket, name));
        }

        let meta = object_store::ObjectMetadata {
            name: name.to_owned(),
            metadata: HashMap::from([(CONTENT_TYPE_KEY.to_owned(), content_type.to_owned())]),
            ..Default::default()
        };

        let mut reader = HashingReader::new(reader);
        let info = self.objects.put(meta, &mut reader).await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET_OBJECT, name, error = %e, "Upload failed");
            Error::operation("put", e.to_string())
        })?;
        let sha256 = reader.finalize_hex();

        tracing::info!(
            target: TRACING_TARGET_OBJECT,
            name,
            content_type,
            size = info.size,
            nuid = %info.nuid,
            sha256 = %sha256,
            "Object stored"
        );

        Ok(ObjectSummary::from_info(&info).with_sha256_hex(sha256))
    }

    /// Opens `name` for reading, or `None` if it does not exist.
    pub async fn get(&self, name: &str) -> Result<Option<GetResult>> {
        let Some(summary) = self.info(name).await? else {
            return Ok(None);
        };

        match self.objects.get(name).await {
            Ok(reader) => Ok(Some(GetResult::new(reader, summary))),
            // Deleted between the info lookup and the open.
            Err(e) if is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(Error::operation("get", e.to_string())),
        }
    }

    /// Metadata of `name` without touching its chunks.
    pub async fn info(&self, name: &str) -> Result<Option<ObjectSummary>> {
        match self.objects.info(name).await {
            Ok(info) if info.deleted => Ok(None),
            Ok(info) => Ok(Some(ObjectSummary::from_info(&info))),
            Err(e) if is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(Error::operation("info", e.to_string())),
        }
    }

    /// Live objects, in bucket order.
    pub async fn list(&self) -> Result<Vec<ObjectSummary>> {
        let listing = |e: &dyn std::fmt::Display| Error::operation("list", e.to_string());

        let objects: Vec<ObjectSummary> = self
            .objects
            .list()
            .await
            .map_err(|e| listing(&e))?
            .try_filter(|info| futures::future::ready(!info.deleted))
            .map_ok(|info| ObjectSummary::from_info(&info))
            .try_collect()
            .await
            .map_err(|e| listing(&e))?;

        tracing::debug!(
            target: TRACING_TARGET_OBJECT,
            bucket = %self.bucket,
            count = objects.len(),
            "Listed bucket"
        );
        Ok(objects)
    }

    /// Looks an object up by NUID. Names are the bucket's only index, so this
    /// scans the listing.
    pub async fn find_by_nuid(&self, nuid: &str) -> Result<Option<ObjectSummary>> {
        let objects = self.list().await?;
        Ok(objects.into_iter().find(|object| object.nuid() == nuid))
    }

    /// Removes `name` and all of its chunks.
    pub async fn delete(&self, name: &str) -> Result<()> {
        if let Err(e) = self.objects.delete(name).await {
            let details = e.to_string();
            if is_not_found(&details) {
                return Err(Error::object_not_found(&*self.bucket, name));
            }
            tracing::error!(target: TRACING_TARGET_OBJECT, name, error = %e, "Delete failed");
            return Err(Error::operation("delete", details));
        }

        tracing::info!(target: TRACING_TARGET_OBJECT, name, "Object deleted");
        Ok(())
    }
}

/// Missing objects surface under several NATS error kinds, all of which say
/// "not found" somewhere in their message.
fn is_not_found(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("not found") || message.contains("no message found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_not_found_messages() {
        assert!(is_not_found("object not found"));
        assert!(is_not_found("Not Found: stream"));
        assert!(is_not_found("no message found"));
        assert!(!is_not_found("timed out"));
    }
}
