//! Client for a help-desk server's HTTP ticket API.
//!
//! Issues cross the wire as their resolved display text and the receiving
//! server classifies that text again with its own catalog. Callers get back
//! the issue and price the server stored, which may differ from what was
//! sent when the two catalogs disagree.

use crate::error::BackendError;
use helpdesk_types::api::{
    CreateTicketRequest, CreateTicketResponse, ErrorResponse, LookupRequest, LookupResponse,
    TicketResponse, UpdateByIdRequest, UpdateResponse,
};
use helpdesk_types::{CreatedTicket, NewTicket, Ticket, TicketUpdate};
use reqwest::{Response, StatusCode};

#[derive(Debug, Clone)]
pub struct RemoteTicketClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteTicketClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = built_or_default(
            reqwest::Client::builder()
                .user_agent(concat!("helpdesk-tools/", env!("CARGO_PKG_VERSION")))
                .build(),
        );
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create(&self, ticket: &NewTicket) -> Result<CreatedTicket, BackendError> {
        let body = CreateTicketRequest {
            name: ticket.name.clone(),
            email: ticket.email.clone(),
            phone: ticket.phone.clone(),
            address: ticket.address.clone(),
            issue_description: ticket.issue.clone(),
        };
        let resp = self.client.post(self.url("/tickets")).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }

        // The server classifies the issue text itself; what it stored wins.
        let created: CreateTicketResponse = resp.json().await?;
        if created.issue != ticket.issue {
            tracing::warn!(
                ticket_id = created.id,
                sent = %ticket.issue,
                stored = %created.issue,
                "remote server resolved the issue differently"
            );
        }
        Ok(CreatedTicket {
            id: created.id,
            confirmation_code: created.confirmation_code,
            issue: created.issue,
            price: created.price,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Ticket>, BackendError> {
        let resp = self
            .client
            .get(self.url(&format!("/tickets/{}", id)))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let body: TicketResponse = resp.json().await?;
        Ok(Some(body.ticket))
    }

    pub async fn lookup(
        &self,
        name: &str,
        email: &str,
        confirmation_code: u32,
    ) -> Result<Option<Ticket>, BackendError> {
        let body = LookupRequest {
            name: name.to_string(),
            email: email.to_string(),
            confirmation_code,
        };
        let resp = self
            .client
            .post(self.url("/tickets/lookup"))
            .json(&body)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let found: LookupResponse = resp.json().await?;
        Ok(Some(found.ticket))
    }

    /// Sends each update as its own `update-by-id` request, in order.
    ///
    /// Returns `false` as soon as the server reports the ticket missing.
    /// Explicit price changes have no wire form and are refused.
    pub async fn update(&self, id: i64, updates: &[TicketUpdate]) -> Result<bool, BackendError> {
        if updates.is_empty() {
            return Ok(false);
        }

        for update in updates {
            let (field, value) = match update {
                TicketUpdate::Name(v) => ("name", v.clone()),
                TicketUpdate::Email(v) => ("email", v.clone()),
                TicketUpdate::Phone(v) => ("phone", v.clone()),
                TicketUpdate::Address(v) => ("address", v.clone()),
                TicketUpdate::Issue { issue, .. } => ("issue", issue.clone()),
                TicketUpdate::Price(_) => return Err(BackendError::Unsupported("price update")),
            };
            let body = UpdateByIdRequest {
                ticket_id: id,
                field: field.to_string(),
                value,
            };
            let resp = self
                .client
                .post(self.url("/tickets/update-by-id"))
                .json(&body)
                .send()
                .await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(false);
            }
            if !resp.status().is_success() {
                return Err(error_from(resp).await);
            }
            let applied: UpdateResponse = resp.json().await?;
            tracing::debug!(ticket_id = applied.ticket_id, field = %applied.field, "remote ticket updated");
        }
        Ok(true)
    }
}

fn built_or_default(built: reqwest::Result<reqwest::Client>) -> reqwest::Client {
    built.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to build ticket API client, using defaults");
        reqwest::Client::new()
    })
}

async fn error_from(resp: Response) -> BackendError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    if status == StatusCode::BAD_REQUEST {
        if let Ok(body) = serde_json::from_str::<ErrorResponse>(&text) {
            return BackendError::Rejected {
                reason: body.reason,
                message: body.error,
            };
        }
    }

    BackendError::Status {
        status: status.as_u16(),
        message: text,
    }
}
