//! Stored file response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::service::store::StoredObject;
use crate::streaming::MediaPolicy;

/// Represents a stored file.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Store-assigned identifier, used for deletion.
    pub id: String,
    /// Unique file name, used for retrieval.
    pub name: String,
    /// Content length in bytes.
    pub size_bytes: u64,
    /// Media type declared at upload.
    pub media_type: String,
    /// Upload completion time.
    pub created_at: Timestamp,
    /// Hex SHA-256 of the content, when recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Whether the image endpoint serves this file.
    pub is_image: bool,
}

impl File {
    /// Creates a File response from a stored object.
    pub fn from_object(object: StoredObject) -> Self {
        Self {
            is_image: MediaPolicy::IMAGE.allows(&object.media_type),
            id: object.id.to_string(),
            name: object.name,
            size_bytes: object.size_bytes,
            media_type: object.media_type,
            created_at: object.created_at,
            sha256: object.sha256,
        }
    }
}

/// Response type for listing files.
pub type Files = Vec<File>;
