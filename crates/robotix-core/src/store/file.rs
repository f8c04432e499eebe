use std::path::PathBuf;

use crate::error::StoreError;

use super::{CredentialStore, UserMap};

/// Credential store backed by a single JSON document on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<UserMap, StoreError> {
        if !self.path.exists() {
            return Ok(UserMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, users: &UserMap) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(users).map_err(StoreError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
