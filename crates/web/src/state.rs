//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AulaConfig;
use crate::data::DataManager;
use crate::store::{RemoteStore, StoreError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AulaConfig,
    data: DataManager,
}

impl AppState {
    /// Create the state with the store backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store client cannot be built.
    pub fn new(config: AulaConfig) -> Result<Self, StoreError> {
        let store = RemoteStore::from_config(&config.store)?;
        Ok(Self::with_store(config, store))
    }

    /// Create the state around an existing store handle.
    #[must_use]
    pub fn with_store(config: AulaConfig, store: RemoteStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                data: DataManager::new(store),
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AulaConfig {
        &self.inner.config
    }

    /// Get a reference to the data manager.
    #[must_use]
    pub fn data(&self) -> &DataManager {
        &self.inner.data
    }
}
