//! Persistent key-value store port for batch state.

use std::fmt;

use crate::domain::AppError;

/// Independent entries of the persisted batch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    BaseConfig,
    Selection,
    Templates,
}

impl StateKey {
    pub const ALL: [StateKey; 3] = [StateKey::BaseConfig, StateKey::Selection, StateKey::Templates];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::BaseConfig => "baseConfig",
            StateKey::Selection => "selection",
            StateKey::Templates => "templates",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable storage of serialized state entries.
pub trait StateStore {
    /// Read the raw value stored under `key`, if any.
    fn load(&self, key: StateKey) -> Result<Option<String>, AppError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: StateKey, value: &str) -> Result<(), AppError>;

    /// Remove the entry under `key`. Removing a missing entry is not an error.
    fn remove(&self, key: StateKey) -> Result<(), AppError>;
}
