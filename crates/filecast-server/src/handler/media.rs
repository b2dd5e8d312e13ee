//! Image and video streaming endpoints.

use axum::Router;
use axum::http::{HeaderMap, header};
use axum::response::Response;
use axum::routing::get;

use crate::extract::{Path, Store};
use crate::handler::Result;
use crate::service::ServiceState;
use crate::streaming::{MediaPolicy, serve_object};

/// Serves a stored image in full.
#[tracing::instrument(skip_all, fields(filename = %filename))]
async fn get_image(
    Store(store): Store,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    serve_object(&*store, &filename, MediaPolicy::IMAGE, headers.get(header::RANGE)).await
}

/// Serves a stored video, honoring `Range` requests.
#[tracing::instrument(skip_all, fields(filename = %filename))]
async fn get_video(
    Store(store): Store,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    serve_object(&*store, &filename, MediaPolicy::VIDEO, headers.get(header::RANGE)).await
}

/// Returns a [`Router`] with the media routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/image/{filename}", get(get_image))
        .route("/video/{filename}", get(get_video))
}
