mod file;

pub use file::FileCredentialStore;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::types::UserRecord;

/// The full persisted mapping of usernames to user records.
pub type UserMap = BTreeMap<String, UserRecord>;

/// Shared handle to the credential store. All mutating call sites lock
/// this, so each load-modify-save cycle is serialized in-process.
pub type SharedStore = Arc<tokio::sync::Mutex<Box<dyn CredentialStore>>>;

/// Storage abstraction over the credential mapping.
///
/// The backing document is reloaded on every operation and rewritten whole
/// on every mutation. A missing backing file is an empty mapping.
pub trait CredentialStore: Send + Sync {
    /// Load the full mapping. Fails with [`StoreError::Corrupt`] when the
    /// backing file exists but does not parse.
    fn load(&self) -> Result<UserMap, StoreError>;

    /// Serialize the full mapping and overwrite the backing file in one
    /// shot. Not atomic on disk.
    fn save(&self, users: &UserMap) -> Result<(), StoreError>;

    /// One load-modify-save cycle. Callers must hold the store lock across
    /// the call so concurrent mutations serialize.
    fn mutate(&self, apply: &mut dyn FnMut(&mut UserMap)) -> Result<(), StoreError> {
        let mut users = self.load()?;
        apply(&mut users);
        self.save(&users)
    }
}

/// Wrap a store in the shared locked handle used by the HTTP state.
pub fn shared(store: impl CredentialStore + 'static) -> SharedStore {
    let boxed: Box<dyn CredentialStore> = Box::new(store);
    Arc::new(tokio::sync::Mutex::new(boxed))
}
