use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::AppError;
use crate::ports::{StateKey, StateStore};

/// In-memory state store for tests and sessions without a usable directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    // Shared so a test can keep a handle after moving a clone into a session.
    entries: Arc<Mutex<HashMap<StateKey, String>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the raw value under `key`.
    pub fn get(&self, key: StateKey) -> Option<String> {
        self.lock().ok().and_then(|entries| entries.get(&key).cloned())
    }

    /// Seed a raw value, bypassing serialization.
    pub fn insert(&self, key: StateKey, value: &str) {
        if let Ok(mut entries) = self.lock() {
            entries.insert(key, value.to_string());
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<StateKey, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::PersistenceUnavailable("in-memory store poisoned".to_string()))
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: StateKey) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn save(&self, key: StateKey, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StateKey) -> Result<(), AppError> {
        self.lock()?.remove(&key);
        Ok(())
    }
}
