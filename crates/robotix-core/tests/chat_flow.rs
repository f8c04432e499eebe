//! End-to-end flow over the core services: register, log in, chat with an
//! unrecognized provider, and see the turn recorded in history. No network
//! access is required — the unsupported-provider path never reaches a
//! backend.

use robotix_core::auth;
use robotix_core::config::Config;
use robotix_core::dispatch::{ChatDispatcher, MSG_UNSUPPORTED_PROVIDER};
use robotix_core::store::{shared, FileCredentialStore};
use robotix_core::types::ChatOutcome;

#[tokio::test]
async fn test_register_login_chat_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let store = shared(FileCredentialStore::new(tmp.path().join("users.json")));
    let dispatcher = ChatDispatcher::from_config(&Config::default(), store.clone());

    // Register and log in with an empty history.
    {
        let guard = store.lock().await;
        auth::register(&**guard, "alice", "secret").unwrap();
        let history = auth::authenticate(&**guard, "alice", "secret").unwrap();
        assert!(history.is_empty());
    }

    // Chat against a provider nobody recognizes.
    let outcome = dispatcher
        .dispatch("alice", "hola robotix", "unsupported")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ChatOutcome::UnsupportedProvider(MSG_UNSUPPORTED_PROVIDER.to_string())
    );

    // The turn is now part of the login payload.
    {
        let guard = store.lock().await;
        let history = auth::authenticate(&**guard, "alice", "secret").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "hola robotix");
        assert_eq!(history[0].response, MSG_UNSUPPORTED_PROVIDER);
    }
}

#[tokio::test]
async fn test_deleted_user_cannot_chat() {
    let tmp = tempfile::tempdir().unwrap();
    let store = shared(FileCredentialStore::new(tmp.path().join("users.json")));
    let dispatcher = ChatDispatcher::from_config(&Config::default(), store.clone());

    {
        let guard = store.lock().await;
        auth::register(&**guard, "bob", "pw").unwrap();
        robotix_core::admin::delete_user(&**guard, "bob").unwrap();
    }

    let outcome = dispatcher
        .dispatch("bob", "hola", "unsupported")
        .await
        .unwrap();
    assert!(matches!(outcome, ChatOutcome::NotAuthenticated(_)));
}
