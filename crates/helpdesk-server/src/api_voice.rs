//! LiveKit access tokens for callers joining a voice room.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json};
use helpdesk_voice::VoiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub room_name: String,
    pub participant_name: String,
}

/// Response body for `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
}

/// Handler for `POST /token`.
///
/// The participant name doubles as the LiveKit identity.
pub async fn create_token_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;

    let token = state
        .voice_service
        .generate_join_token(&req.room_name, &req.participant_name, &req.participant_name)
        .map_err(|e| match e {
            VoiceError::Disabled => {
                ApiError::VoiceDisabled("voice service is not configured".to_string())
            }
            VoiceError::Config(msg) => ApiError::bad_request(msg),
            other => {
                tracing::error!(error = %other, "failed to generate access token");
                ApiError::InternalServerError("Failed to generate access token".to_string())
            }
        })?;

    Ok(Json(TokenResponse {
        token,
        url: state.voice_service.get_url().to_string(),
    }))
}
