//! Result types for object store operations.

use std::pin::Pin;

use async_nats::jetstream::object_store::{self, ObjectInfo};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use jiff::Timestamp;

use crate::object::SkipReader;

/// Object metadata key holding the MIME type recorded at upload.
pub const CONTENT_TYPE_KEY: &str = "content-type";

/// Prefix NATS puts in front of the base64 object digest.
const DIGEST_PREFIX: &str = "SHA-256=";

/// Metadata of a stored object, detached from the NATS wire types.
///
/// All fields are private to ensure immutability after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    nuid: String,
    name: String,
    size: u64,
    content_type: Option<String>,
    modified: Option<Timestamp>,
    sha256_hex: Option<String>,
}

impl ObjectSummary {
    pub(crate) fn from_info(info: &ObjectInfo) -> Self {
        let modified = info
            .modified
            .and_then(|m| Timestamp::from_nanosecond(m.unix_timestamp_nanos()).ok());

        Self {
            nuid: info.nuid.clone(),
            name: info.name.clone(),
            size: info.size as u64,
            content_type: info.metadata.get(CONTENT_TYPE_KEY).cloned(),
            modified,
            sha256_hex: info.digest.as_deref().and_then(digest_to_hex),
        }
    }

    pub(crate) fn with_sha256_hex(mut self, sha256_hex: String) -> Self {
        self.sha256_hex = Some(sha256_hex);
        self
    }

    /// Returns the NATS object unique identifier.
    #[inline]
    pub fn nuid(&self) -> &str {
        &self.nuid
    }

    /// Returns the object name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the MIME type recorded at upload, if any.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the last modification time reported by NATS.
    #[inline]
    pub fn modified(&self) -> Option<Timestamp> {
        self.modified
    }

    /// Returns the SHA-256 of the content as a hex string.
    #[inline]
    pub fn sha256_hex(&self) -> Option<&str> {
        self.sha256_hex.as_deref()
    }
}

/// Converts a NATS `SHA-256=<base64url>` digest into lowercase hex.
fn digest_to_hex(digest: &str) -> Option<String> {
    let encoded = digest.strip_prefix(DIGEST_PREFIX)?;
    let bytes = URL_SAFE
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .ok()?;
    Some(hex::encode(bytes))
}

/// Result of a get operation with streaming reader.
///
/// The reader is forward-only; [`GetResult::into_reader_from`] discards a
/// prefix lazily so that a byte window can be served without a seek primitive.
pub struct GetResult {
    reader: Pin<Box<object_store::Object>>,
    summary: ObjectSummary,
}

impl GetResult {
    pub(crate) fn new(reader: object_store::Object, summary: ObjectSummary) -> Self {
        Self {
            reader: Box::pin(reader),
            summary,
        }
    }

    /// Returns the object metadata.
    #[inline]
    pub fn summary(&self) -> &ObjectSummary {
        &self.summary
    }

    /// Consumes self and returns a reader that begins `offset` bytes in.
    ///
    /// The prefix is discarded as the reader is polled, not here.
    #[inline]
    pub fn into_reader_from(self, offset: u64) -> SkipReader<Pin<Box<object_store::Object>>> {
        SkipReader::new(self.reader, offset)
    }

    /// Consumes self and returns the reader.
    #[inline]
    pub fn into_reader(self) -> Pin<Box<object_store::Object>> {
        self.reader
    }
}
