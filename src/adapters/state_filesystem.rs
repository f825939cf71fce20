use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::{StateKey, StateStore};

/// Default state directory, relative to the working directory.
pub const STATE_DIR: &str = ".pveqc";

/// State store keeping one JSON document per key under a directory.
#[derive(Debug, Clone)]
pub struct FilesystemStateStore {
    root: PathBuf,
}

impl FilesystemStateStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create a store in `.pveqc` under the current directory.
    pub fn current() -> Result<Self, AppError> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(cwd.join(STATE_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: StateKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }
}

fn unavailable(action: &str, path: &Path, err: io::Error) -> AppError {
    AppError::PersistenceUnavailable(format!("cannot {} {}: {}", action, path.display(), err))
}

impl StateStore for FilesystemStateStore {
    fn load(&self, key: StateKey) -> Result<Option<String>, AppError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(unavailable("read", &path, err)),
        }
    }

    fn save(&self, key: StateKey, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).map_err(|e| unavailable("create", &self.root, e))?;
        let path = self.key_path(key);
        fs::write(&path, value).map_err(|e| unavailable("write", &path, e))
    }

    fn remove(&self, key: StateKey) -> Result<(), AppError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(unavailable("remove", &path, err)),
        }
    }
}
