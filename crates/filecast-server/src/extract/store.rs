use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;

use crate::handler::{Error, ErrorKind};
use crate::service::store::{SharedStore, StoreSlot};

/// Tracing target for store extraction.
const TRACING_TARGET: &str = "filecast_server::extract::store";

/// The initialized content store.
///
/// Rejects with 503 while the store is still connecting.
#[derive(Clone, Deref)]
pub struct Store(pub SharedStore);

impl<S> FromRequestParts<S> for Store
where
    StoreSlot: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        StoreSlot::from_ref(state).get().map(Store).ok_or_else(|| {
            tracing::warn!(
                target: TRACING_TARGET,
                method = %parts.method,
                path = %parts.uri.path(),
                "Request arrived before the content store was ready"
            );
            ErrorKind::ServiceUnavailable.into_error()
        })
    }
}
