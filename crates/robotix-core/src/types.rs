use serde::{Deserialize, Serialize};

/// One question/response pair in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub response: String,
}

/// A stored user: password digest plus append-only chat history.
///
/// The on-disk field is named `password` but always holds the lowercase
/// hex SHA-256 digest, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
    #[serde(default)]
    pub history: Vec<QaEntry>,
}

impl UserRecord {
    pub fn new(password_digest: impl Into<String>) -> Self {
        Self {
            password: password_digest.into(),
            history: Vec::new(),
        }
    }
}

/// Typed result of one chat turn.
///
/// The transport layer maps each variant to a status code instead of
/// collapsing every failure into a success body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The provider produced text; a history entry was recorded.
    Ok(String),
    /// The selector named no known provider; the fixed text is recorded.
    UnsupportedProvider(String),
    /// The provider call failed; nothing is recorded.
    ProviderUnavailable { response: String, error: String },
    /// The user id is not registered; nothing is recorded.
    NotAuthenticated(String),
}

impl ChatOutcome {
    /// The user-visible response text for this outcome.
    pub fn response_text(&self) -> &str {
        match self {
            ChatOutcome::Ok(text) => text,
            ChatOutcome::UnsupportedProvider(text) => text,
            ChatOutcome::ProviderUnavailable { response, .. } => response,
            ChatOutcome::NotAuthenticated(text) => text,
        }
    }
}
