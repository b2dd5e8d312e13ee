//! Handler error type and the catalogue of client-visible failures.

use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Failure of a request handler or extractor.
///
/// The [`ErrorKind`] fixes the status code and the default `err` message.
/// Handlers may replace the message, name the offending resource, add
/// diagnostic context and attach response headers such as `Content-Range`.
#[derive(Clone)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    context: Option<String>,
    resource: Option<String>,
    headers: HeaderMap,
}

impl Error {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            resource: None,
            headers: HeaderMap::new(),
        }
    }

    /// Replaces the kind's default client message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Appends diagnostic context, joining repeated calls with `; `.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(existing) => format!("{existing}; {context}"),
            None => context,
        });
        self
    }

    /// Names the object or path the error is about.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message sent to the client under `err`.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(self.kind.message())
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    fn body(&self) -> ErrorResponse<'_> {
        ErrorResponse {
            message: self.message(),
            name: self.kind.name(),
            resource: self.resource(),
            context: self.context(),
        }
    }
}

impl Default for Error {
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("status", &self.kind.status_code())
            .field("message", &self.message())
            .field("context", &self.context)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.kind.status_code().as_u16(),
            self.kind,
            self.message()
        )?;
        if let Some(resource) = &self.resource {
            write!(f, " ({resource})")?;
        }
        if let Some(context) = &self.context {
            write!(f, ": {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        // A 416 answers through `Content-Range` alone.
        let mut response = if status == StatusCode::RANGE_NOT_SATISFIABLE {
            status.into_response()
        } else {
            (status, self.body()).into_response()
        };

        response.headers_mut().extend(self.headers);
        response
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result of a request handler.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the HTTP surface can report.
///
/// The three object-related 404s stay distinct so that a client can tell a
/// missing file from one with the wrong media type by `err` alone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "error kinds do nothing unless turned into errors"]
pub enum ErrorKind {
    MissingPathParam,
    BadRequest,
    /// No route matched.
    NotFound,
    /// No stored object matched.
    NoFilesExist,
    NotAnImage,
    NotAVideo,
    Conflict,
    /// Response headers were not ready within the request timeout.
    RequestTimeout,
    PayloadTooLarge,
    RangeNotSatisfiable,
    #[default]
    InternalServerError,
    /// The content store has not finished initializing.
    ServiceUnavailable,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    #[inline]
    pub fn with_message(self, message: impl Into<String>) -> Error {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_context(self, context: impl Into<String>) -> Error {
        Error::new(self).with_context(context)
    }

    #[inline]
    pub fn with_resource(self, resource: impl Into<String>) -> Error {
        Error::new(self).with_resource(resource)
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::MissingPathParam | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::NoFilesExist | Self::NotAnImage | Self::NotAVideo => {
                StatusCode::NOT_FOUND
            }
            Self::Conflict => StatusCode::CONFLICT,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable identifier, sent as `name`.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingPathParam => "missing_path_param",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::NoFilesExist => "no_files_exist",
            Self::NotAnImage => "not_an_image",
            Self::NotAVideo => "not_a_video",
            Self::Conflict => "conflict",
            Self::RequestTimeout => "request_timeout",
            Self::PayloadTooLarge => "payload_too_large",
            Self::RangeNotSatisfiable => "range_not_satisfiable",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Default client message, sent as `err`.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingPathParam => "Invalid request: missing required parameters",
            Self::BadRequest => "The request could not be processed due to invalid data",
            Self::NotFound => "Not found",
            Self::NoFilesExist => "No files exist",
            Self::NotAnImage => "Not an image",
            // Kept word for word; existing clients match on it.
            Self::NotAVideo => "Not an video",
            Self::Conflict => "The request conflicts with the current state of the resource",
            Self::RequestTimeout => "The request took too long to process",
            Self::PayloadTooLarge => "The uploaded file exceeds the maximum allowed size",
            Self::RangeNotSatisfiable => "The requested range cannot be served",
            Self::InternalServerError => "Internal server error",
            Self::ServiceUnavailable => "Content store is not ready",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;

    use super::*;

    const ALL_KINDS: [ErrorKind; 12] = [
        ErrorKind::MissingPathParam,
        ErrorKind::BadRequest,
        ErrorKind::NotFound,
        ErrorKind::NoFilesExist,
        ErrorKind::NotAnImage,
        ErrorKind::NotAVideo,
        ErrorKind::Conflict,
        ErrorKind::RequestTimeout,
        ErrorKind::PayloadTooLarge,
        ErrorKind::RangeNotSatisfiable,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
    ];

    #[test]
    fn default_is_internal_server_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), "Internal server error");
    }

    #[test]
    fn custom_message_replaces_default() {
        let error = ErrorKind::BadRequest.with_message("Missing file field");
        assert_eq!(error.message(), "Missing file field");
        assert_eq!(ErrorKind::BadRequest.into_error().message(), ErrorKind::BadRequest.message());
    }

    #[test]
    fn context_accumulates() {
        let error = ErrorKind::NoFilesExist
            .with_resource("abc.png")
            .with_context("lookup by name")
            .with_context("bucket uploads");

        assert_eq!(error.resource(), Some("abc.png"));
        assert_eq!(error.context(), Some("lookup by name; bucket uploads"));
    }

    #[test]
    fn display_includes_all_parts() {
        let display = ErrorKind::NotAVideo
            .with_resource("abc.png")
            .with_context("media type image/png")
            .to_string();

        assert_eq!(
            display,
            "404 [not_a_video] Not an video (abc.png): media type image/png"
        );
    }

    #[tokio::test]
    async fn json_body_uses_err_key() -> anyhow::Result<()> {
        let response = ErrorKind::NoFilesExist.with_resource("abc.png").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["err"], "No files exist");
        assert_eq!(json["name"], "no_files_exist");
        assert_eq!(json["resource"], "abc.png");
        assert!(json.get("context").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn range_not_satisfiable_is_bodyless() -> anyhow::Result<()> {
        let response = ErrorKind::RangeNotSatisfiable
            .with_context("bytes=9000-")
            .with_header(header::CONTENT_RANGE, HeaderValue::from_static("bytes */1000"))
            .into_response();

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(to_bytes(response.into_body(), usize::MAX).await?.is_empty());
        Ok(())
    }

    #[test]
    fn object_errors_are_not_found() {
        for kind in [
            ErrorKind::NoFilesExist,
            ErrorKind::NotAnImage,
            ErrorKind::NotAVideo,
        ] {
            assert_eq!(kind.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn every_kind_is_an_error_status() {
        for kind in ALL_KINDS {
            assert!(!kind.name().is_empty());
            assert!(!kind.message().is_empty());
            assert!(kind.status_code().is_client_error() || kind.status_code().is_server_error());
        }
    }
}
