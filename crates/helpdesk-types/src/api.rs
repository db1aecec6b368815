//! Request and response bodies of the HTTP ticket API.
//!
//! Shared by the server handlers and the remote ticket client so both sides
//! agree on field names.

use crate::Ticket;
use serde::{Deserialize, Serialize};

/// Body of `POST /tickets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Free-text problem description, classified by the server.
    pub issue_description: String,
}

/// Successful response of `POST /tickets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketResponse {
    pub success: bool,
    pub id: i64,
    #[serde(alias = "confirmation_number")]
    pub confirmation_code: u32,
    pub email: String,
    pub issue: String,
    pub price: u32,
}

/// Body of `POST /tickets/update-by-id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateByIdRequest {
    pub ticket_id: i64,
    pub field: String,
    pub value: String,
}

/// Body of `POST /tickets/lookup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub name: String,
    pub email: String,
    #[serde(alias = "confirmation_number")]
    pub confirmation_code: u32,
}

/// Successful response of `POST /tickets/lookup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    pub ticket: Ticket,
    pub message: String,
}

/// Body of `POST /tickets/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateByIdentityRequest {
    pub name: String,
    pub email: String,
    #[serde(alias = "confirmation_number")]
    pub confirmation_code: u32,
    pub field: String,
    pub value: String,
}

/// Successful response of both update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub field: String,
    /// The stored value; for issue updates, the resolved issue text.
    pub value: String,
    pub ticket_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Machine-readable code such as `unsupported_issue` or `not_found`.
    pub reason: String,
    /// Human-readable explanation.
    pub error: String,
}

/// Response of `GET /tickets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub success: bool,
    pub ticket: Ticket,
}

/// Response of `GET /tickets`, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketListResponse {
    pub success: bool,
    pub tickets: Vec<Ticket>,
}

/// Response carrying only a confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
