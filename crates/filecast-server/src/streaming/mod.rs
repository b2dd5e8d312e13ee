//! Serving stored objects over HTTP, whole or by byte range.
//!
//! - [`parse_range`] resolves a `Range` header against an object size
//! - [`MediaPolicy`] decides which media types an endpoint serves
//! - [`ObjectBodyStream`] turns a store reader into a response body
//! - [`serve_object`] ties them together for the media routes

mod body;
mod media_policy;
mod range;

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;

pub use self::body::ObjectBodyStream;
pub use self::media_policy::MediaPolicy;
pub use self::range::{ByteRange, RangeError, parse_range};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::store::ContentStore;

/// Tracing target for streaming sessions.
pub(crate) const TRACING_TARGET: &str = "filecast_server::streaming";

/// Builds the response for one object under `policy`.
///
/// Responds 206 with `Content-Range` for a satisfiable range on a seekable
/// policy, 200 with the whole object otherwise. A `Range` header that cannot
/// be satisfied yields 416 with `Content-Range: bytes */{size}`.
pub async fn serve_object(
    store: &dyn ContentStore,
    name: &str,
    policy: MediaPolicy,
    range_header: Option<&HeaderValue>,
) -> Result<Response> {
    let object = store
        .find_one(name)
        .await?
        .ok_or_else(|| ErrorKind::NoFilesExist.with_resource(name.to_owned()))?;

    if !policy.allows(&object.media_type) {
        return Err(policy
            .rejection()
            .with_resource(name.to_owned())
            .with_context(format!("media type {}", object.media_type)));
    }

    let size = object.size_bytes;
    let range = match range_header.filter(|_| policy.is_seekable()) {
        None => None,
        Some(value) => {
            value
                .to_str()
                .map_err(|_| RangeError::Malformed("non-ASCII header value".to_owned()))
                .and_then(|header| parse_range(header, size))
                .map_err(|error| range_not_satisfiable(name, size, error))?
        }
    };

    let reader = store.open_read_stream(&object.name, range).await?;

    let (status, length) = match range {
        Some(range) => (StatusCode::PARTIAL_CONTENT, range.len()),
        None => (StatusCode::OK, size),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        name = %object.name,
        status = status.as_u16(),
        length,
        range = ?range.map(|r| r.content_range()),
        "Streaming object"
    );

    let body = Body::from_stream(ObjectBodyStream::new(reader, object.name, length));
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, object.media_type)
        .header(header::CONTENT_LENGTH, length);

    if policy.is_seekable() {
        builder = builder.header(header::ACCEPT_RANGES, "bytes");
    }
    if let Some(range) = range {
        builder = builder.header(header::CONTENT_RANGE, range.content_range());
    }

    builder.body(body).map_err(|e| {
        ErrorKind::InternalServerError
            .with_context(format!("invalid response headers: {e}"))
    })
}

fn range_not_satisfiable(name: &str, size: u64, error: RangeError) -> Error {
    tracing::debug!(
        target: TRACING_TARGET,
        name = %name,
        size,
        error = %error,
        "Rejected range request"
    );

    let content_range = HeaderValue::from_str(&format!("bytes */{size}"))
        .unwrap_or_else(|_| HeaderValue::from_static("bytes */*"));

    ErrorKind::RangeNotSatisfiable
        .with_context(error.to_string())
        .with_header(header::CONTENT_RANGE, content_range)
}
