//! Conversation sessions and the tool-call endpoint.
//!
//! An orchestrator opens one session per call, forwards every function call
//! the language model makes to `POST /sessions/{id}/tools/{name}`, and reads
//! the outcome back to the caller. Tool outcomes are always returned with
//! `200 OK`; `success: false` carries the failure.

use crate::api::ApiError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use helpdesk_tools::{invoke, tool_definitions, ConversationSession, ToolFailure, ToolOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Handler for `GET /tools`.
pub async fn list_tools_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "tools": tool_definitions(state.tools.catalog()) }))
}

/// Handler for `POST /sessions`.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let session_id = Uuid::new_v4().to_string();
    let session = Arc::new(Mutex::new(ConversationSession::new(session_id.clone())));

    {
        let mut sessions = state.sessions.write().map_err(|_| {
            tracing::error!("sessions lock poisoned");
            ApiError::InternalServerError("session registry unavailable".to_string())
        })?;
        sessions.insert(session_id.clone(), session);
    }

    tracing::info!(session_id = %session_id, "conversation session opened");
    Ok((StatusCode::CREATED, Json(json!({ "session_id": session_id }))))
}

/// Handler for `DELETE /sessions/{sessionId}`.
pub async fn delete_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = {
        let mut sessions = state.sessions.write().map_err(|_| {
            tracing::error!("sessions lock poisoned");
            ApiError::InternalServerError("session registry unavailable".to_string())
        })?;
        sessions.remove(&session_id)
    };

    if removed.is_none() {
        return Err(ApiError::NotFound(format!("session {} not found", session_id)));
    }
    tracing::info!(session_id = %session_id, "conversation session closed");
    Ok(Json(json!({ "success": true })))
}

/// Handler for `POST /sessions/{sessionId}/tools/{toolName}`.
pub async fn invoke_tool_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((session_id, tool_name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    // The map lock is released before the session lock is awaited.
    let session = {
        let sessions = state.sessions.read().map_err(|_| {
            tracing::error!("sessions lock poisoned");
            ApiError::InternalServerError("session registry unavailable".to_string())
        })?;
        sessions.get(&session_id).cloned()
    }
    .ok_or_else(|| ApiError::NotFound(format!("session {} not found", session_id)))?;

    let args = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(args) => args,
            Err(e) => {
                let outcome = ToolOutcome::<()>::from(Err(ToolFailure::invalid_arguments(e)));
                return Ok(Json(json!(outcome)));
            }
        }
    };

    let mut session = session.lock().await;
    let outcome = invoke(&state.tools, &mut session, &tool_name, args).await;
    Ok(Json(outcome))
}
