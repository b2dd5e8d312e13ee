//! Upload, listing, metadata and deletion of stored files.

use std::ffi::OsStr;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, header};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::TryStreamExt;
use serde::Deserialize;
use tokio_util::io::StreamReader;
use uuid::Uuid;

use crate::extract::{Multipart, Path, Query, Store};
use crate::handler::response::{File, Files};
use crate::handler::{ErrorKind, Result};
use crate::service::store::{DEFAULT_MEDIA_TYPE, NewObject, ObjectId, ObjectReader};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for file operations.
const TRACING_TARGET: &str = "filecast_server::handler::files";

/// Multipart field that carries the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Longest extension kept from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 16;

/// Streams the `file` field of a multipart form into the store.
#[tracing::instrument(skip_all)]
async fn upload_file(
    Store(store): Store,
    State(config): State<Arc<ServiceConfig>>,
    headers: HeaderMap,
    Multipart(mut multipart): Multipart,
) -> Result<Redirect> {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    if declared_length.is_some_and(|length| length > config.max_upload_size as u64) {
        return Err(ErrorKind::PayloadTooLarge
            .with_context(format!("limit is {} bytes", config.max_upload_size)));
    }

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let media_type = field
            .content_type()
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_owned();
        let name = object_name(field.file_name().unwrap_or_default());

        let oversized = AtomicBool::new(false);
        let body = field.map_err(|error| {
            if error.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                oversized.store(true, Ordering::Relaxed);
            }
            io::Error::other(error)
        });
        let reader: ObjectReader<'_> = Box::pin(StreamReader::new(body));

        let stored = match store.put(NewObject::new(name, media_type), reader).await {
            Ok(stored) => stored,
            Err(_) if oversized.load(Ordering::Relaxed) => {
                return Err(ErrorKind::PayloadTooLarge
                    .with_context(format!("limit is {} bytes", config.max_upload_size)));
            }
            Err(error) => return Err(error.into()),
        };

        tracing::info!(
            target: TRACING_TARGET,
            name = %stored.name,
            id = %stored.id,
            size = stored.size_bytes,
            media_type = %stored.media_type,
            "File uploaded"
        );

        return Ok(Redirect::to("/"));
    }

    Err(ErrorKind::BadRequest
        .with_message("Missing file field")
        .with_context(format!("expected a multipart field named '{UPLOAD_FIELD}'")))
}

/// Generates a unique object name that keeps the original extension.
fn object_name(original: &str) -> String {
    let stem = Uuid::new_v4().simple();
    let extension = std::path::Path::new(original)
        .extension()
        .and_then(OsStr::to_str)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        });

    match extension {
        Some(extension) => format!("{stem}.{extension}"),
        None => stem.to_string(),
    }
}

/// Lists every stored file, newest first.
#[tracing::instrument(skip_all)]
async fn list_files(Store(store): Store) -> Result<Json<Files>> {
    let objects = store.find().await?;
    if objects.is_empty() {
        return Err(ErrorKind::NoFilesExist.into_error());
    }

    tracing::debug!(target: TRACING_TARGET, count = objects.len(), "Listed files");
    Ok(Json(objects.into_iter().map(File::from_object).collect()))
}

/// Returns metadata of one file.
#[tracing::instrument(skip_all, fields(filename = %filename))]
async fn get_file(Store(store): Store, Path(filename): Path<String>) -> Result<Json<File>> {
    let object = store
        .find_one(&filename)
        .await?
        .ok_or_else(|| ErrorKind::NoFilesExist.with_resource(filename.clone()))?;

    Ok(Json(File::from_object(object)))
}

/// Deletes a file by identifier.
#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete_file(Store(store): Store, Path(id): Path<String>) -> Result<Redirect> {
    let Some(object_id) = ObjectId::parse(&id) else {
        tracing::debug!(target: TRACING_TARGET, "Malformed object id");
        return Err(ErrorKind::NoFilesExist.with_resource(id));
    };

    store.delete(&object_id).await?;

    tracing::info!(target: TRACING_TARGET, id = %object_id, "File deleted");
    Ok(Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
struct MethodOverride {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// HTML forms cannot send `DELETE`; they post with `?_method=DELETE`.
async fn override_method(
    store: Store,
    path: Path<String>,
    Query(params): Query<MethodOverride>,
) -> Result<Redirect> {
    match params.method.as_deref() {
        Some(method) if method.eq_ignore_ascii_case("DELETE") => delete_file(store, path).await,
        _ => Err(ErrorKind::BadRequest
            .with_message("Unsupported method override")
            .with_context("only _method=DELETE is accepted on this route")),
    }
}

/// Returns a [`Router`] with all file routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes(config: &ServiceConfig) -> Router<ServiceState> {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(config.max_upload_size)),
        )
        .route("/files", get(list_files))
        .route(
            "/files/{file}",
            get(get_file).delete(delete_file).post(override_method),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};

    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, patterned, seed,
    };
    use crate::service::store::{MemoryContentStore, StoredObject};

    fn upload_form(file_name: &str, mime_type: &str, content: Vec<u8>) -> MultipartForm {
        let part = Part::bytes(content)
            .file_name(file_name)
            .mime_type(mime_type);
        MultipartForm::new().add_part(UPLOAD_FIELD, part)
    }

    #[test]
    fn object_names_keep_extension() {
        let name = object_name("holiday.PNG");
        assert_eq!(name.len(), 32 + 4);
        assert!(name.ends_with(".PNG"));
        assert!(name[..32].bytes().all(|b| b.is_ascii_hexdigit()));

        assert_eq!(object_name("README").len(), 32);
        assert_eq!(object_name("").len(), 32);
        assert_eq!(object_name("evil.p\"ng").len(), 32);
        assert_ne!(object_name("a.png"), object_name("a.png"));
    }

    #[tokio::test]
    async fn upload_then_list_and_fetch() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let content = patterned(1000);

        let response = server
            .post("/upload")
            .multipart(upload_form("abc.png", "image/png", content.clone()))
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");

        let objects = store.find().await?;
        assert_eq!(objects.len(), 1);
        let stored = &objects[0];
        assert!(stored.name.ends_with(".png"));
        assert_eq!(stored.size_bytes, 1000);
        assert_eq!(stored.media_type, "image/png");

        let listed = server.get("/files").await.json::<Vec<serde_json::Value>>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], stored.name.as_str());
        assert_eq!(listed[0]["sizeBytes"], 1000);
        assert_eq!(listed[0]["mediaType"], "image/png");
        assert_eq!(listed[0]["isImage"], true);

        let image = server.get(&format!("/image/{}", stored.name)).await;
        image.assert_status_ok();
        assert_eq!(image.as_bytes().as_ref(), content.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn upload_without_file_field() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;

        let form = MultipartForm::new().add_text("comment", "no file here");
        let response = server.post("/upload").multipart(form).await;
        response.assert_status_bad_request();
        assert!(store.find().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn upload_over_limit() -> anyhow::Result<()> {
        let config = ServiceConfig {
            max_upload_size: 1024,
            ..ServiceConfig::memory()
        };
        let state = ServiceState::with_store(config, Arc::new(MemoryContentStore::new()));
        let server = create_test_server_with_state(state.clone())?;

        let response = server
            .post("/upload")
            .multipart(upload_form("big.mp4", "video/mp4", vec![0; 4096]))
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let store = state.store_slot().get().expect("store is ready");
        assert!(store.find().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn chunked_upload_over_limit() -> anyhow::Result<()> {
        use axum::body::{Body, Bytes};
        use axum::http::Request;
        use tower::ServiceExt;

        const BOUNDARY: &str = "filecast-boundary";

        let config = ServiceConfig {
            max_upload_size: 1024,
            ..ServiceConfig::memory()
        };
        let state = ServiceState::with_store(config, Arc::new(MemoryContentStore::new()));
        let app = crate::handler::routes(state.config()).with_state(state.clone());

        let mut payload = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{UPLOAD_FIELD}\"; filename=\"big.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n"
        )
        .into_bytes();
        payload.extend(vec![0u8; 8 * 1024]);
        payload.extend(format!("\r\n--{BOUNDARY}--\r\n").into_bytes());

        // Without a length hint the body carries no Content-Length header.
        let chunks: Vec<io::Result<Bytes>> = payload
            .chunks(512)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        let request = Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from_stream(futures::stream::iter(chunks)))?;
        assert!(request.headers().get(header::CONTENT_LENGTH).is_none());

        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let store = state.store_slot().get().expect("store is ready");
        assert!(store.find().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_empty_store() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/files").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["err"], "No files exist");
        Ok(())
    }

    #[tokio::test]
    async fn list_newest_first() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        seed(&*store, "old.png", "image/png", vec![1]).await?;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        seed(&*store, "new.mp4", "video/mp4", vec![2]).await?;

        let listed = server.get("/files").await.json::<Vec<serde_json::Value>>();
        let names: Vec<_> = listed.iter().map(|f| f["name"].as_str()).collect();
        assert_eq!(names, [Some("new.mp4"), Some("old.png")]);
        assert_eq!(listed[0]["isImage"], false);
        Ok(())
    }

    #[tokio::test]
    async fn file_metadata() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let stored = seed(&*store, "abc.png", "image/png", patterned(1000)).await?;

        let response = server.get("/files/abc.png").await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["id"], stored.id.as_str());
        assert_eq!(body["sizeBytes"], 1000);
        assert!(body["createdAt"].is_string());

        let missing = server.get("/files/missing.png").await;
        missing.assert_status_not_found();
        assert_eq!(missing.json::<serde_json::Value>()["err"], "No files exist");
        Ok(())
    }

    async fn seeded(store: &dyn crate::service::store::ContentStore) -> anyhow::Result<StoredObject> {
        seed(store, "abc.png", "image/png", patterned(100)).await
    }

    #[tokio::test]
    async fn delete_then_missing() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let stored = seeded(&*store).await?;

        let response = server.delete(&format!("/files/{}", stored.id)).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");

        server.get("/files/abc.png").await.assert_status_not_found();
        server.get("/image/abc.png").await.assert_status_not_found();

        let again = server.delete(&format!("/files/{}", stored.id)).await;
        again.assert_status_not_found();
        assert_eq!(again.json::<serde_json::Value>()["err"], "No files exist");
        Ok(())
    }

    #[tokio::test]
    async fn delete_with_method_override() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let stored = seeded(&*store).await?;

        let response = server
            .post(&format!("/files/{}", stored.id))
            .add_query_param("_method", "DELETE")
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert!(store.find().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn post_without_override_is_rejected() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        let stored = seeded(&*store).await?;

        let response = server.post(&format!("/files/{}", stored.id)).await;
        response.assert_status_bad_request();
        assert_eq!(store.find().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_malformed_id() -> anyhow::Result<()> {
        let (server, store) = create_test_server()?;
        seeded(&*store).await?;

        let response = server.delete("/files/not%20an%20id").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["err"], "No files exist");
        assert_eq!(store.find().await?.len(), 1);
        Ok(())
    }
}
