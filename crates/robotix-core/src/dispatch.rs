//! Chat dispatcher: routes one message to a completion provider and records
//! the turn in the caller's history.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::provider::ollama::OllamaProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::ChatProvider;
use crate::store::{CredentialStore, SharedStore};
use crate::types::{ChatOutcome, QaEntry};

pub const MSG_NOT_LOGGED_IN: &str = "Debes iniciar sesión primero.";
pub const MSG_UNSUPPORTED_PROVIDER: &str = "Proveedor no soportado.";
pub const MSG_PROVIDER_ERROR: &str = "Ocurrió un error.";

/// Routes chat turns to one of the configured providers.
pub struct ChatDispatcher {
    store: SharedStore,
    openai: Box<dyn ChatProvider>,
    ollama: Box<dyn ChatProvider>,
}

impl ChatDispatcher {
    pub fn from_config(config: &Config, store: SharedStore) -> Self {
        Self::new(
            store,
            Box::new(OpenAiProvider::new(&config.openai)),
            Box::new(OllamaProvider::new(&config.ollama)),
        )
    }

    pub fn new(
        store: SharedStore,
        openai: Box<dyn ChatProvider>,
        ollama: Box<dyn ChatProvider>,
    ) -> Self {
        Self {
            store,
            openai,
            ollama,
        }
    }

    /// Run one chat turn for `user_id`.
    ///
    /// Unknown users short-circuit without touching the store. Branches
    /// that produce provider-derived text (including the unsupported-
    /// provider reply) append a history entry; a failed provider call
    /// appends nothing. The store lock is not held across the provider
    /// call.
    pub async fn dispatch(
        &self,
        user_id: &str,
        message: &str,
        provider: &str,
    ) -> Result<ChatOutcome, StoreError> {
        {
            let store = self.store.lock().await;
            let users = store.load()?;
            if !users.contains_key(user_id) {
                return Ok(ChatOutcome::NotAuthenticated(MSG_NOT_LOGGED_IN.to_string()));
            }
        }

        let outcome = match provider {
            "openai" => self.call(self.openai.as_ref(), message).await,
            "ollama" => self.call(self.ollama.as_ref(), message).await,
            other => {
                info!("Unsupported provider requested: {}", other);
                ChatOutcome::UnsupportedProvider(MSG_UNSUPPORTED_PROVIDER.to_string())
            }
        };

        // Record the turn for every branch that produced provider text.
        // A persistence failure here must not mask the answer the user
        // already has — log and move on.
        if let ChatOutcome::Ok(text) | ChatOutcome::UnsupportedProvider(text) = &outcome {
            if let Err(e) = self.record(user_id, message, text).await {
                warn!("Failed to record history for {}: {}", user_id, e);
            }
        }

        Ok(outcome)
    }

    async fn call(&self, provider: &dyn ChatProvider, message: &str) -> ChatOutcome {
        match provider.complete(message).await {
            Ok(text) => ChatOutcome::Ok(text),
            Err(e) => {
                warn!("Provider {} failed: {}", provider.name(), e);
                ChatOutcome::ProviderUnavailable {
                    response: MSG_PROVIDER_ERROR.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn record(&self, user_id: &str, question: &str, response: &str) -> Result<(), StoreError> {
        let store = self.store.lock().await;
        store.mutate(&mut |users| {
            // The user can vanish between the membership check and here;
            // never resurrect a deleted record for a history write.
            match users.get_mut(user_id) {
                Some(record) => record.history.push(QaEntry {
                    question: question.to_string(),
                    response: response.to_string(),
                }),
                None => warn!("User {} disappeared before history write", user_id),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::store::{shared, CredentialStore, FileCredentialStore, SharedStore};
    use crate::types::UserRecord;
    use async_trait::async_trait;

    struct StubProvider {
        name: &'static str,
        reply: Option<String>,
    }

    #[async_trait]
    impl ChatProvider for StubProvider {
        async fn complete(&self, _message: &str) -> Result<String, ProviderError> {
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(ProviderError::Parse("boom".to_string())),
            }
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn dispatcher_with(
        openai_reply: Option<&str>,
    ) -> (tempfile::TempDir, SharedStore, ChatDispatcher) {
        let tmp = tempfile::tempdir().unwrap();
        let file_store = FileCredentialStore::new(tmp.path().join("users.json"));

        let mut users = crate::store::UserMap::new();
        users.insert("alice".to_string(), UserRecord::new("digest"));
        file_store.save(&users).unwrap();

        let store = shared(file_store);
        let dispatcher = ChatDispatcher::new(
            store.clone(),
            Box::new(StubProvider {
                name: "openai",
                reply: openai_reply.map(|s| s.to_string()),
            }),
            Box::new(StubProvider {
                name: "ollama",
                reply: Some("local".to_string()),
            }),
        );
        (tmp, store, dispatcher)
    }

    async fn history_len(store: &SharedStore, user: &str) -> usize {
        let guard = store.lock().await;
        let users = guard.load().unwrap();
        users.get(user).map(|r| r.history.len()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_unknown_user_short_circuits() {
        let (_tmp, store, dispatcher) = dispatcher_with(Some("hi"));
        let before = { store.lock().await.load().unwrap() };

        let outcome = dispatcher.dispatch("nobody", "hola", "openai").await.unwrap();
        assert_eq!(
            outcome,
            ChatOutcome::NotAuthenticated(MSG_NOT_LOGGED_IN.to_string())
        );

        let after = { store.lock().await.load().unwrap() };
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_successful_chat_records_one_entry() {
        let (_tmp, store, dispatcher) = dispatcher_with(Some("respuesta"));

        let outcome = dispatcher
            .dispatch("alice", "Hola como estas", "openai")
            .await
            .unwrap();
        assert_eq!(outcome, ChatOutcome::Ok("respuesta".to_string()));
        assert_eq!(history_len(&store, "alice").await, 1);

        let guard = store.lock().await;
        let users = guard.load().unwrap();
        let entry = &users["alice"].history[0];
        assert_eq!(entry.question, "Hola como estas");
        assert_eq!(entry.response, "respuesta");
    }

    #[tokio::test]
    async fn test_unsupported_provider_fixed_text_recorded() {
        let (_tmp, store, dispatcher) = dispatcher_with(Some("hi"));

        let outcome = dispatcher
            .dispatch("alice", "hola", "gemini")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ChatOutcome::UnsupportedProvider(MSG_UNSUPPORTED_PROVIDER.to_string())
        );

        let guard = store.lock().await;
        let users = guard.load().unwrap();
        assert_eq!(users["alice"].history[0].response, MSG_UNSUPPORTED_PROVIDER);
    }

    #[tokio::test]
    async fn test_provider_failure_embedded_and_unrecorded() {
        let (_tmp, store, dispatcher) = dispatcher_with(None);

        let outcome = dispatcher.dispatch("alice", "hola", "openai").await.unwrap();
        match outcome {
            ChatOutcome::ProviderUnavailable { response, error } => {
                assert_eq!(response, MSG_PROVIDER_ERROR);
                assert!(error.contains("boom"));
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }

        assert_eq!(history_len(&store, "alice").await, 0);
    }

    #[tokio::test]
    async fn test_ollama_route_uses_ollama_provider() {
        let (_tmp, store, dispatcher) = dispatcher_with(Some("remote"));

        let outcome = dispatcher.dispatch("alice", "hola", "ollama").await.unwrap();
        assert_eq!(outcome, ChatOutcome::Ok("local".to_string()));
        assert_eq!(history_len(&store, "alice").await, 1);
    }
}
