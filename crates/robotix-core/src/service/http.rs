use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::admin;
use crate::auth;
use crate::config::Config;
use crate::dispatch::ChatDispatcher;
use crate::error::{AdminError, AuthError};
use crate::store::{shared, FileCredentialStore, SharedStore};
use crate::types::{ChatOutcome, QaEntry};

/// Shared application state for the HTTP API.
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub dispatcher: ChatDispatcher,
}

impl AppState {
    /// Build state with a file store and providers from config.
    pub fn new(config: Config) -> Self {
        let store = shared(FileCredentialStore::new(&config.store.users_file));
        let dispatcher = ChatDispatcher::from_config(&config, store.clone());
        Self {
            config,
            store,
            dispatcher,
        }
    }
}

/// Request body for /register and /login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Request body for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    pub provider: String,
}

/// Simple confirmation response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login response: confirmation plus the caller's full history.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub history: Vec<QaEntry>,
}

/// Chat response; `error` is present only for provider failures.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client-facing error body.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Topic-frequency report.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub topics_summary: BTreeMap<String, u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn detail(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(DetailResponse {
            detail: text.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error!("Internal error: {}", err);
    detail(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

/// Create the axum Router with all API routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(handle_register))
        .route("/login", post(handle_login))
        .route("/chat", post(handle_chat))
        // Admin panel endpoints — intentionally unauthenticated, matching
        // the system this reimplements.
        .route("/admin/users", get(handle_admin_users))
        .route("/admin/user/{username}", get(handle_admin_user))
        .route("/admin/stats", get(handle_admin_stats))
        .route("/admin/delete/{username}", delete(handle_admin_delete))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// POST /register — create a user
async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let store = state.store.lock().await;
    match auth::register(&**store, &req.username, &req.password) {
        Ok(()) => Json(MessageResponse {
            message: "Registro exitoso.".to_string(),
        })
        .into_response(),
        Err(AuthError::DuplicateUser(_)) => detail(StatusCode::BAD_REQUEST, "Usuario ya existe."),
        Err(e) => internal_error(e),
    }
}

/// POST /login — check credentials, return history
async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let store = state.store.lock().await;
    match auth::authenticate(&**store, &req.username, &req.password) {
        Ok(history) => Json(LoginResponse {
            message: "Login exitoso.".to_string(),
            history,
        })
        .into_response(),
        Err(AuthError::UnknownUser(_)) => {
            detail(StatusCode::BAD_REQUEST, "Usuario no encontrado.")
        }
        Err(AuthError::InvalidCredential) => {
            detail(StatusCode::UNAUTHORIZED, "Contraseña incorrecta.")
        }
        Err(e) => internal_error(e),
    }
}

/// POST /chat — one conversation turn
async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    info!(
        "Chat request: user={}, provider={}",
        req.user_id, req.provider
    );

    let outcome = match state
        .dispatcher
        .dispatch(&req.user_id, &req.message, &req.provider)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return internal_error(e),
    };

    let status = match &outcome {
        ChatOutcome::Ok(_) | ChatOutcome::UnsupportedProvider(_) => StatusCode::OK,
        ChatOutcome::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
        ChatOutcome::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
    };
    let error = match &outcome {
        ChatOutcome::ProviderUnavailable { error, .. } => Some(error.clone()),
        _ => None,
    };

    (
        status,
        Json(ChatResponse {
            response: outcome.response_text().to_string(),
            error,
        }),
    )
        .into_response()
}

/// GET /admin/users — list all usernames
async fn handle_admin_users(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().await;
    match admin::list_usernames(&**store) {
        Ok(users) => Json(users).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /admin/user/{username} — full record, digest included
async fn handle_admin_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    let store = state.store.lock().await;
    match admin::get_user(&**store, &username) {
        Ok(record) => Json(record).into_response(),
        Err(AdminError::UnknownUser(_)) => detail(StatusCode::NOT_FOUND, "Usuario no encontrado."),
        Err(e) => internal_error(e),
    }
}

/// GET /admin/stats — first-token topic frequencies
async fn handle_admin_stats(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.lock().await;
    match admin::topic_stats(&**store) {
        Ok(topics_summary) => Json(StatsResponse { topics_summary }).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /admin/delete/{username} — remove a user
async fn handle_admin_delete(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    let store = state.store.lock().await;
    match admin::delete_user(&**store, &username) {
        Ok(()) => Json(MessageResponse {
            message: format!("Usuario {} eliminado exitosamente.", username),
        })
        .into_response(),
        Err(AdminError::UnknownUser(_)) => detail(StatusCode::NOT_FOUND, "Usuario no encontrado."),
        Err(e) => internal_error(e),
    }
}

/// GET /health
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Start the HTTP server on the given address.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
