//! User registration and login against the credential store.
//!
//! Passwords are stored as unsalted single-pass SHA-256 hex digests. That
//! scheme is reproduced from the system being reimplemented and is a known
//! weakness: identical passwords share a digest and precomputed tables
//! apply.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::AuthError;
use crate::store::CredentialStore;
use crate::types::{QaEntry, UserRecord};

/// Lowercase hex SHA-256 digest of a plaintext password.
pub fn digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a user with an empty history and persist the store.
pub fn register(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    let mut users = store.load()?;
    if users.contains_key(username) {
        return Err(AuthError::DuplicateUser(username.to_string()));
    }
    users.insert(username.to_string(), UserRecord::new(digest(password)));
    store.save(&users)?;
    info!("Registered user {}", username);
    Ok(())
}

/// Check a password against the stored digest. Returns the user's full
/// history on success.
pub fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<Vec<QaEntry>, AuthError> {
    let users = store.load()?;
    let record = users
        .get(username)
        .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
    if record.password != digest(password) {
        return Err(AuthError::InvalidCredential);
    }
    Ok(record.history.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileCredentialStore;

    fn temp_store() -> (tempfile::TempDir, FileCredentialStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(tmp.path().join("users.json"));
        (tmp, store)
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of "secret"
        assert_eq!(
            digest("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn test_identical_passwords_share_digest() {
        // Unsalted by design; see module docs.
        assert_eq!(digest("hunter2"), digest("hunter2"));
    }

    #[test]
    fn test_register_then_authenticate() {
        let (_tmp, store) = temp_store();
        register(&store, "alice", "secret").unwrap();

        let history = authenticate(&store, "alice", "secret").unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let (_tmp, store) = temp_store();
        register(&store, "alice", "secret").unwrap();

        match register(&store, "alice", "other") {
            Err(AuthError::DuplicateUser(name)) => assert_eq!(name, "alice"),
            other => panic!("expected DuplicateUser, got {other:?}"),
        }

        // First record untouched
        let users = store.load().unwrap();
        assert_eq!(users["alice"].password, digest("secret"));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let (_tmp, store) = temp_store();
        register(&store, "alice", "secret").unwrap();

        for wrong in ["Secret", "secret ", "", "hunter2", "secreto"] {
            match authenticate(&store, "alice", wrong) {
                Err(AuthError::InvalidCredential) => {}
                other => panic!("password {wrong:?} should fail, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_user_rejected() {
        let (_tmp, store) = temp_store();
        match authenticate(&store, "nobody", "secret") {
            Err(AuthError::UnknownUser(name)) => assert_eq!(name, "nobody"),
            other => panic!("expected UnknownUser, got {other:?}"),
        }
    }
}
