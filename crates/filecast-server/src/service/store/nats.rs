use async_trait::async_trait;
use filecast_nats::{NatsClient, ObjectStore, ObjectSummary};
use jiff::Timestamp;
use tokio::io::AsyncReadExt;

use super::{
    ContentStore, DEFAULT_MEDIA_TYPE, NewObject, ObjectId, ObjectReader, StoredObject,
    TRACING_TARGET, sort_newest_first,
};
use crate::streaming::ByteRange;
use crate::{Error, Result};

/// Content store backed by a NATS JetStream object bucket.
///
/// Object names are the bucket keys. The NATS unique identifier of each
/// object serves as its [`ObjectId`].
#[derive(Clone)]
pub struct NatsContentStore {
    client: NatsClient,
    objects: ObjectStore,
}

impl NatsContentStore {
    /// Opens (or creates) `bucket` on a connected client.
    pub async fn open(client: NatsClient, bucket: &str) -> Result<Self> {
        let objects = client.object_store(bucket).await?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %objects.bucket(),
            "NATS content store ready"
        );

        Ok(Self { client, objects })
    }

    /// Returns the name of the backing bucket.
    pub fn bucket(&self) -> &str {
        self.objects.bucket()
    }
}

fn stored_object(summary: &ObjectSummary) -> Result<StoredObject> {
    let id = ObjectId::parse(summary.nuid()).ok_or_else(|| {
        Error::internal(
            "nats",
            format!("object '{}' has an unusable nuid", summary.name()),
        )
    })?;

    Ok(StoredObject {
        id,
        name: summary.name().to_owned(),
        size_bytes: summary.size(),
        media_type: summary
            .content_type()
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_owned(),
        created_at: summary.modified().unwrap_or(Timestamp::UNIX_EPOCH),
        sha256: summary.sha256_hex().map(str::to_owned),
    })
}

#[async_trait]
impl ContentStore for NatsContentStore {
    fn backend(&self) -> &'static str {
        "nats"
    }

    async fn put(&self, object: NewObject, reader: ObjectReader<'_>) -> Result<StoredObject> {
        let summary = self
            .objects
            .put(&object.name, &object.media_type, reader)
            .await?;

        stored_object(&summary)
    }

    async fn find(&self) -> Result<Vec<StoredObject>> {
        let mut objects = self
            .objects
            .list()
            .await?
            .iter()
            .map(stored_object)
            .collect::<Result<Vec<_>>>()?;

        sort_newest_first(&mut objects);
        Ok(objects)
    }

    async fn find_one(&self, name: &str) -> Result<Option<StoredObject>> {
        self.objects
            .info(name)
            .await?
            .as_ref()
            .map(stored_object)
            .transpose()
    }

    async fn open_read_stream(
        &self,
        name: &str,
        range: Option<ByteRange>,
    ) -> Result<ObjectReader<'static>> {
        let object = self
            .objects
            .get(name)
            .await?
            .ok_or_else(|| Error::not_found(format!("object '{name}' not found")))?;

        let Some(range) = range else {
            let reader: ObjectReader<'static> = object.into_reader();
            return Ok(reader);
        };

        // The prefix is discarded while the body is polled, after the
        // response headers have gone out.
        let reader = object.into_reader_from(range.start()).take(range.len());
        let reader: ObjectReader<'static> = Box::pin(reader);
        Ok(reader)
    }

    async fn delete(&self, id: &ObjectId) -> Result<()> {
        let summary = self
            .objects
            .find_by_nuid(id.as_str())
            .await?
            .ok_or_else(|| Error::not_found(format!("object with id '{id}' not found")))?;

        self.objects.delete(summary.name()).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let latency = self.client.ping().await?;
        tracing::trace!(
            target: TRACING_TARGET,
            latency_ms = latency.as_millis() as u64,
            "NATS ping"
        );
        Ok(())
    }
}
