use helpdesk_tickets::TicketError;
use std::time::Duration;
use thiserror::Error;

/// Failures inside a ticket backend.
///
/// These never reach the conversation layer directly; the tool boundary logs
/// them and reports `backend_unavailable` (or a validation failure when the
/// remote API rejected the request for a known reason).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("ticket store error: {0}")]
    Store(#[from] TicketError),

    #[error("db connection failed: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("ticket API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ticket API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("ticket API rejected request ({reason}): {message}")]
    Rejected { reason: String, message: String },

    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    #[error("ticket backend timed out after {0:?}")]
    Timeout(Duration),
}
