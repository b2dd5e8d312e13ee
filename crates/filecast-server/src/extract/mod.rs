//! Request extractors.
//!
//! - [`Path`], [`Query`] and [`Multipart`] wrap the Axum extractors and
//!   reject with the server's JSON error body
//! - [`Store`] yields the content store once it is initialized

mod reject;
mod store;

pub use crate::extract::reject::{Multipart, Path, Query};
pub use crate::extract::store::Store;
