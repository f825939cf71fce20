use std::cell::Cell;

use crate::domain::AppError;
use crate::ports::{StateKey, StateStore};

/// State store whose reads and/or writes always fail.
#[derive(Debug, Default)]
pub struct FailingStateStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub write_attempts: Cell<usize>,
}

impl FailingStateStore {
    pub fn unreadable() -> Self {
        Self { fail_reads: true, ..Self::default() }
    }

    pub fn read_only() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }
}

impl StateStore for FailingStateStore {
    fn load(&self, key: StateKey) -> Result<Option<String>, AppError> {
        if self.fail_reads {
            return Err(AppError::PersistenceUnavailable(format!("cannot read {}", key)));
        }
        Ok(None)
    }

    fn save(&self, key: StateKey, _value: &str) -> Result<(), AppError> {
        self.write_attempts.set(self.write_attempts.get() + 1);
        if self.fail_writes {
            return Err(AppError::PersistenceUnavailable(format!("cannot write {}", key)));
        }
        Ok(())
    }

    fn remove(&self, key: StateKey) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::PersistenceUnavailable(format!("cannot remove {}", key)));
        }
        Ok(())
    }
}
