//! Axum extractors whose rejections render as the server's JSON error body.
//!
//! Each wrapper derefs to the value Axum extracted; only the rejection type
//! differs.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Longest rejection detail echoed back in `context`.
const MAX_DETAIL_CHARS: usize = 150;

/// Path parameters, e.g. `{filename}` in `/image/{filename}`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

/// Query string, e.g. `?_method=DELETE`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

/// `multipart/form-data` body of an upload.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub axum::extract::Multipart);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(axum::extract::Multipart::from_request(req, state).await?))
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::MissingPathParams(e) => ErrorKind::MissingPathParam
                .with_message("Required path parameter missing")
                .with_context(first_line(&e.to_string())),
            PathRejection::FailedToDeserializePathParams(e) => ErrorKind::BadRequest
                .with_message("Invalid path parameter")
                .with_context(first_line(&e.body_text())),
            other => ErrorKind::InternalServerError.with_context(first_line(&other.body_text())),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        ErrorKind::BadRequest
            .with_message("Invalid query string")
            .with_context(first_line(&rejection.body_text()))
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        let message = match rejection {
            MultipartRejection::InvalidBoundary(_) => "Missing or invalid multipart boundary",
            _ => "Invalid multipart request",
        };
        ErrorKind::BadRequest
            .with_message(message)
            .with_context(first_line(&rejection.body_text()))
    }
}

/// Errors raised while reading fields, after extraction succeeded.
impl From<MultipartError> for Error {
    fn from(error: MultipartError) -> Self {
        let kind = if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorKind::PayloadTooLarge
        } else {
            ErrorKind::BadRequest
        };
        kind.with_context(first_line(&error.body_text()))
    }
}

fn first_line(detail: &str) -> String {
    detail
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(MAX_DETAIL_CHARS)
        .collect()
}
