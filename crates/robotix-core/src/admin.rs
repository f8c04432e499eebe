//! Read-only and delete operations over the credential store, plus the
//! topic-frequency report. These back the unauthenticated admin endpoints.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::AdminError;
use crate::store::CredentialStore;
use crate::types::UserRecord;

/// Bucket for questions with no leading token.
pub const NO_TOPIC: &str = "sin_tema";

/// All usernames in the store.
pub fn list_usernames(store: &dyn CredentialStore) -> Result<Vec<String>, AdminError> {
    let users = store.load()?;
    Ok(users.keys().cloned().collect())
}

/// Full record for one user, digest included.
pub fn get_user(store: &dyn CredentialStore, username: &str) -> Result<UserRecord, AdminError> {
    let users = store.load()?;
    users
        .get(username)
        .cloned()
        .ok_or_else(|| AdminError::UnknownUser(username.to_string()))
}

/// Remove a user and persist the store.
pub fn delete_user(store: &dyn CredentialStore, username: &str) -> Result<(), AdminError> {
    let mut users = store.load()?;
    if users.remove(username).is_none() {
        return Err(AdminError::UnknownUser(username.to_string()));
    }
    store.save(&users)?;
    info!("Deleted user {}", username);
    Ok(())
}

/// Count the first whitespace-delimited token of every recorded question,
/// lowercased. Questions with no token land in [`NO_TOPIC`].
///
/// A crude first-word proxy for topic detection; the exact tokenization is
/// part of the observable output format.
pub fn topic_stats(store: &dyn CredentialStore) -> Result<BTreeMap<String, u64>, AdminError> {
    let users = store.load()?;
    let mut topics = BTreeMap::new();
    for record in users.values() {
        for entry in &record.history {
            let topic = entry
                .question
                .split_whitespace()
                .next()
                .map(|token| token.to_lowercase())
                .unwrap_or_else(|| NO_TOPIC.to_string());
            *topics.entry(topic).or_insert(0) += 1;
        }
    }
    Ok(topics)
}
