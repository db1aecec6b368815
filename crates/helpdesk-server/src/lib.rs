//! Help-desk server library logic.

pub mod api;
pub mod api_sessions;
pub mod api_tickets;
pub mod api_voice;
pub mod background;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::{BackendMode, Config};
use helpdesk_catalog::{CatalogError, IssueCatalog};
use helpdesk_db::DbPool;
use helpdesk_tools::{
    ConversationSession, LocalTicketStore, RemoteTicketClient, TicketBackend, TicketTools,
};
use helpdesk_voice::VoiceService;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Open conversations keyed by session id.
///
/// Uses `std::sync::RwLock` because the map is only touched for brief
/// get/insert/remove operations that never span an `.await`. Each session
/// has its own async mutex, held for the duration of one tool call.
pub type SessionMap = Arc<RwLock<HashMap<String, Arc<tokio::sync::Mutex<ConversationSession>>>>>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// This server's own ticket store.
    pub store: LocalTicketStore,
    /// Tools bound to the local store, backing the HTTP ticket API.
    pub ticket_api: TicketTools,
    /// Tools bound to the configured backend, used by conversation sessions.
    pub tools: TicketTools,
    pub sessions: SessionMap,
    /// Voice token issuance.
    pub voice_service: Arc<VoiceService>,
}

impl AppState {
    /// Wires the state from a loaded configuration and a migrated pool.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when `[[catalog.issues]]` is present but invalid.
    pub fn from_config(config: &Config, pool: DbPool) -> Result<Self, CatalogError> {
        let catalog = if config.catalog.issues.is_empty() {
            IssueCatalog::reference()
        } else {
            IssueCatalog::new(config.catalog.issues.clone())?
        };
        let catalog = Arc::new(catalog);
        let timeout = Duration::from_millis(config.backend.timeout_ms);

        let store = LocalTicketStore::new(pool);
        let ticket_api = TicketTools::new(catalog.clone(), TicketBackend::Local(store.clone()))
            .with_timeout(timeout);

        let backend = match (config.backend.mode, config.backend.remote_url.as_deref()) {
            (BackendMode::Remote, Some(url)) => {
                tracing::info!(url, "conversation tools use remote ticket API");
                TicketBackend::Remote(RemoteTicketClient::new(url))
            }
            _ => TicketBackend::Local(store.clone()),
        };
        let tools = TicketTools::new(catalog, backend).with_timeout(timeout);

        Ok(Self {
            store,
            ticket_api,
            tools,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            voice_service: Arc::new(VoiceService::new(config.livekit.clone())),
        })
    }
}

/// Maximum request body size (64 KiB). Ticket payloads are small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/supported-issues",
            get(api_tickets::supported_issues_handler),
        )
        .route(
            "/tickets",
            post(api_tickets::create_ticket_handler).get(api_tickets::list_tickets_handler),
        )
        .route(
            "/tickets/{ticketId}",
            get(api_tickets::get_ticket_handler).delete(api_tickets::delete_ticket_handler),
        )
        .route(
            "/tickets/update-by-id",
            post(api_tickets::update_by_id_handler),
        )
        .route("/tickets/lookup", post(api_tickets::lookup_handler))
        .route("/tickets/update", post(api_tickets::update_handler))
        .route("/token", post(api_voice::create_token_handler))
        .route("/tools", get(api_sessions::list_tools_handler))
        .route("/sessions", post(api_sessions::create_session_handler))
        .route(
            "/sessions/{sessionId}",
            axum::routing::delete(api_sessions::delete_session_handler),
        )
        .route(
            "/sessions/{sessionId}/tools/{toolName}",
            post(api_sessions::invoke_tool_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
