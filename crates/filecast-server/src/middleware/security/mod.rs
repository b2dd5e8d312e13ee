//! Security middleware for HTTP requests.
//!
//! Applies CORS rules, security response headers and response compression.
//! Video responses are never compressed so that `Content-Length` and
//! `Content-Range` keep describing the stored bytes.

mod cors_config;
mod headers_config;

use axum::Router;
use axum::http::header;
use axum::http::Method;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

pub use self::cors_config::CorsConfig;
pub use self::headers_config::SecurityHeadersConfig;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers security middlewares with the provided configurations.
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self;

    /// Layers security middlewares with default configurations.
    ///
    /// Uses development-friendly CORS settings. For production deployments,
    /// prefer `with_security` with explicit configuration.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::RANGE])
            .expose_headers([
                header::ACCEPT_RANGES,
                header::CONTENT_LENGTH,
                header::CONTENT_RANGE,
            ])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        let compression = CompressionLayer::new()
            .compress_when(DefaultPredicate::new().and(NotForContentType::const_new("video/")));

        let mut router = self.layer(compression).layer(cors_layer);
        for (name, value) in headers.response_headers() {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }

        router
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
    }
}
