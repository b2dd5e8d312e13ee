use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{SharedStore, TRACING_TARGET};
use crate::{Error, Result};

/// Write-once holder for the content store.
///
/// The HTTP listener starts before the store connection is established.
/// Until [`StoreSlot::initialize`] succeeds, [`StoreSlot::get`] returns
/// `None` and store-backed routes answer 503.
#[derive(Clone, Default)]
pub struct StoreSlot {
    inner: Arc<OnceCell<SharedStore>>,
}

impl StoreSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `store`.
    pub fn ready(store: SharedStore) -> Self {
        Self {
            inner: Arc::new(OnceCell::from(store)),
        }
    }

    /// Installs the store. Fails if a store was installed before.
    pub fn initialize(&self, store: SharedStore) -> Result<()> {
        let backend = store.backend();
        self.inner
            .set(store)
            .map_err(|_| Error::internal("store", "content store is already initialized"))?;

        tracing::info!(target: TRACING_TARGET, backend, "Content store initialized");
        Ok(())
    }

    /// Returns the store once initialized.
    pub fn get(&self) -> Option<SharedStore> {
        self.inner.get().cloned()
    }

    /// Returns whether a store is installed.
    pub fn is_ready(&self) -> bool {
        self.inner.initialized()
    }
}
