//! Request IDs and one tracing span per request.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderName, Request, header};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Tags each request with an `x-request-id` (kept if the client sent
    /// one), echoes it on the response and logs the request inside a span
    /// that also records any `Range` header.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        let trace = TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(DefaultOnResponse::new().level(Level::INFO));

        // Layers run bottom-up: the ID is set before the span reads it.
        self.layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(trace)
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
    }
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = header_str(request, &REQUEST_ID_HEADER),
        range = header_str(request, &header::RANGE),
    )
}

fn header_str<'a>(request: &'a Request<Body>, name: &HeaderName) -> &'a str {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
