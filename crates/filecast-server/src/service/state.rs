//! Application state and dependency injection.

use std::sync::Arc;

use crate::Result;
use crate::service::ServiceConfig;
use crate::service::store::{SharedStore, StoreSlot};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    store_slot: StoreSlot,
    service_config: Arc<ServiceConfig>,
}

impl ServiceState {
    /// Creates state whose content store is not connected yet.
    ///
    /// Call [`ServiceState::initialize_store`] to make store-backed routes
    /// available.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            store_slot: StoreSlot::new(),
            service_config: Arc::new(config),
        }
    }

    /// Creates state around an already connected store.
    pub fn with_store(config: ServiceConfig, store: SharedStore) -> Self {
        Self {
            store_slot: StoreSlot::ready(store),
            service_config: Arc::new(config),
        }
    }

    /// Connects the configured store and installs it.
    pub async fn initialize_store(&self) -> Result<()> {
        let store = self.service_config.connect_store().await?;
        self.store_slot.initialize(store)
    }

    /// Returns the service configuration.
    #[inline]
    pub fn config(&self) -> &ServiceConfig {
        &self.service_config
    }

    /// Returns the content store slot.
    #[inline]
    pub fn store_slot(&self) -> &StoreSlot {
        &self.store_slot
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(store_slot: StoreSlot);
impl_di!(service_config: Arc<ServiceConfig>);

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initializes_memory_store() {
        let state = ServiceState::new(ServiceConfig::memory());
        assert!(!state.store_slot().is_ready());

        state.initialize_store().await.unwrap();
        assert!(state.store_slot().is_ready());
        assert!(state.initialize_store().await.is_err());
    }
}
