use crate::app::config::AppConfig;
use crate::ports::{OsCatalog, StateStore};
use crate::services::BatchSession;

/// Application context holding dependencies for command execution.
pub struct AppContext<S: StateStore, C: OsCatalog> {
    store: S,
    catalog: C,
    config: AppConfig,
}

impl<S: StateStore, C: OsCatalog> AppContext<S, C> {
    pub fn new(store: S, catalog: C, config: AppConfig) -> Self {
        Self { store, catalog, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Open the persisted batch with the configured defaults.
    pub fn into_session(self) -> BatchSession<S, C> {
        BatchSession::open(self.store, self.catalog, self.config.defaults)
    }
}
