//! HTTP ticket API.
//!
//! Always served from this server's own SQLite store, whatever backend the
//! conversation sessions are configured with. Validation and classification
//! go through the same [`helpdesk_tools::TicketTools`] operations the voice
//! assistant uses, so both surfaces reject the same inputs.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json, Path};
use helpdesk_tools::{
    ConversationSession, CreateTicketArgs, SupportedIssues, TicketUpdated, ToolFailure, ToolOutcome,
};
use helpdesk_types::api::{
    CreateTicketRequest, CreateTicketResponse, LookupRequest, LookupResponse, MessageResponse,
    TicketListResponse, TicketResponse, UpdateByIdRequest, UpdateByIdentityRequest,
    UpdateResponse,
};
use std::sync::Arc;

/// Session label for HTTP calls, which carry no conversation.
const API_SESSION: &str = "http-api";

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Ticket {} not found", id))
}

fn update_response(updated: TicketUpdated) -> UpdateResponse {
    UpdateResponse {
        success: true,
        field: updated.field.to_string(),
        value: updated.value,
        ticket_id: updated.ticket_id,
        price: updated.price,
        message: updated.message,
    }
}

/// Handler for `GET /supported-issues`.
pub async fn supported_issues_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ToolOutcome<SupportedIssues>> {
    Json(ToolOutcome::from(Ok::<_, ToolFailure>(
        state.ticket_api.supported_issues(),
    )))
}

/// Handler for `POST /tickets`.
pub async fn create_ticket_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<Json<CreateTicketResponse>, ApiError> {
    let Json(req) = payload?;
    let mut session = ConversationSession::new(API_SESSION);

    let created = state
        .ticket_api
        .create_ticket(
            &mut session,
            CreateTicketArgs {
                name: Some(req.name),
                email: Some(req.email),
                phone: Some(req.phone),
                address: Some(req.address),
                issue_description: Some(req.issue_description),
            },
        )
        .await?;

    Ok(Json(CreateTicketResponse {
        success: true,
        id: created.id,
        confirmation_code: created.confirmation_code,
        email: created.email,
        issue: created.issue,
        price: created.price,
    }))
}

/// Handler for `GET /tickets`.
pub async fn list_tickets_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<TicketListResponse>, ApiError> {
    let tickets = state.store.list().await?;
    Ok(Json(TicketListResponse {
        success: true,
        tickets,
    }))
}

/// Handler for `GET /tickets/{ticketId}`.
pub async fn get_ticket_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state
        .store
        .get(ticket_id)
        .await?
        .ok_or_else(|| not_found(ticket_id))?;
    Ok(Json(TicketResponse {
        success: true,
        ticket,
    }))
}

/// Handler for `DELETE /tickets/{ticketId}`.
pub async fn delete_ticket_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete(ticket_id).await? {
        return Err(not_found(ticket_id));
    }
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Ticket {} deleted", ticket_id),
    }))
}

/// Handler for `POST /tickets/update-by-id`.
pub async fn update_by_id_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<UpdateByIdRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let Json(req) = payload?;
    let updated = state
        .ticket_api
        .update_ticket_by_id(req.ticket_id, &req.field, &req.value)
        .await?;
    Ok(Json(update_response(updated)))
}

/// Handler for `POST /tickets/lookup`.
pub async fn lookup_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>, ApiError> {
    let Json(req) = payload?;
    let mut session = ConversationSession::new(API_SESSION);

    let found = state
        .ticket_api
        .lookup_ticket(&mut session, &req.name, &req.email, req.confirmation_code)
        .await?;
    Ok(Json(LookupResponse {
        success: true,
        ticket: found.ticket,
        message: found.message,
    }))
}

/// Handler for `POST /tickets/update`.
pub async fn update_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<UpdateByIdentityRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let Json(req) = payload?;
    let mut session = ConversationSession::new(API_SESSION);

    let updated = state
        .ticket_api
        .update_existing_ticket(
            &mut session,
            &req.name,
            &req.email,
            req.confirmation_code,
            &req.field,
            &req.value,
        )
        .await?;
    Ok(Json(update_response(updated)))
}
