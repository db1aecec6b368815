//! Structured results returned across the tool-call boundary.

use crate::session::DraftSnapshot;
use helpdesk_catalog::IssueCatalog;
use helpdesk_types::{Ticket, TicketField};
use serde::Serialize;

/// Why a tool call did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The description matched no supported issue category.
    UnsupportedIssue,
    /// The named field cannot be edited here.
    InvalidField,
    /// A required value was blank or absent.
    MissingField,
    /// The arguments could not be decoded or the tool does not exist.
    InvalidArguments,
    /// No ticket matched the caller's name, email, and code.
    NotFound,
    /// Storage or network failure; the caller should retry.
    BackendUnavailable,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedIssue => "unsupported_issue",
            Self::InvalidField => "invalid_field",
            Self::MissingField => "missing_field",
            Self::InvalidArguments => "invalid_arguments",
            Self::NotFound => "not_found",
            Self::BackendUnavailable => "backend_unavailable",
        }
    }
}

/// A failed tool call, phrased so the assistant can read it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    pub reason: FailureReason,
    #[serde(rename = "error")]
    pub message: String,
}

impl ToolFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn unsupported_issue(catalog: &IssueCatalog) -> Self {
        Self::new(
            FailureReason::UnsupportedIssue,
            format!(
                "Sorry, we don't support that type of issue. {}",
                catalog.spoken_summary()
            ),
        )
    }

    pub fn invalid_field(allowed: &[TicketField]) -> Self {
        let names: Vec<&str> = allowed.iter().map(|f| f.as_str()).collect();
        let list = match names.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
        };
        Self::new(
            FailureReason::InvalidField,
            format!("I can only change your {}.", list),
        )
    }

    pub fn missing_field(field: TicketField) -> Self {
        Self::new(
            FailureReason::MissingField,
            format!("I still need your {} before I can continue.", field),
        )
    }

    pub fn invalid_arguments(detail: impl std::fmt::Display) -> Self {
        Self::new(
            FailureReason::InvalidArguments,
            format!("The request was missing or malformed: {}", detail),
        )
    }

    pub fn not_found() -> Self {
        Self::new(
            FailureReason::NotFound,
            "I couldn't find a ticket with that name, email, and confirmation number. \
             Could you double-check them for me?",
        )
    }

    pub fn backend_unavailable() -> Self {
        Self::new(
            FailureReason::BackendUnavailable,
            "Sorry, our ticket system is having trouble right now. Please try again in a moment.",
        )
    }
}

/// JSON shape of a tool result: `{"success": true, ...reply}` or
/// `{"success": false, "reason": ..., "error": ...}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome<T> {
    Success {
        success: bool,
        #[serde(flatten)]
        data: T,
    },
    Failure {
        success: bool,
        #[serde(flatten)]
        failure: ToolFailure,
    },
}

impl<T> From<Result<T, ToolFailure>> for ToolOutcome<T> {
    fn from(result: Result<T, ToolFailure>) -> Self {
        match result {
            Ok(data) => Self::Success {
                success: true,
                data,
            },
            Err(failure) => Self::Failure {
                success: false,
                failure,
            },
        }
    }
}

/// Reply to `create_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCreated {
    pub id: i64,
    pub confirmation_code: u32,
    pub email: String,
    pub issue: String,
    pub price: u32,
}

/// Where an `edit_ticket` value landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum DraftEdit {
    /// Staged on the session draft; nothing persisted yet.
    Draft { draft: DraftSnapshot },
    /// Written to the ticket committed earlier in this session.
    Ticket { ticket_id: i64 },
}

/// Reply to `edit_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEdited {
    pub field: TicketField,
    /// Value as recorded; for the issue, the resolved issue text.
    pub value: String,
    /// Price resolved for an issue edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(flatten)]
    pub applied_to: DraftEdit,
}

/// Reply to `lookup_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketFound {
    pub ticket: Ticket,
    pub message: String,
}

/// Reply to `update_existing_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketUpdated {
    pub field: TicketField,
    pub value: String,
    pub ticket_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    pub message: String,
}

/// One entry of `get_supported_issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedIssue {
    #[serde(rename = "type")]
    pub key: String,
    pub name: String,
    pub description: String,
    pub price: u32,
    pub keywords: Vec<String>,
}

/// Reply to `get_supported_issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedIssues {
    pub issues: Vec<SupportedIssue>,
}

impl From<&IssueCatalog> for SupportedIssues {
    fn from(catalog: &IssueCatalog) -> Self {
        Self {
            issues: catalog
                .all()
                .iter()
                .map(|c| SupportedIssue {
                    key: c.key.clone(),
                    name: c.name.clone(),
                    description: c.display_name.clone(),
                    price: c.unit_price,
                    keywords: c.keywords.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_flattens_reply() {
        let outcome: ToolOutcome<TicketCreated> = Ok(TicketCreated {
            id: 1,
            confirmation_code: 12345,
            email: "jane@x.com".to_string(),
            issue: "Network connectivity issues".to_string(),
            price: 20,
        })
        .into();

        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({
                "success": true,
                "id": 1,
                "confirmation_code": 12345,
                "email": "jane@x.com",
                "issue": "Network connectivity issues",
                "price": 20
            })
        );
    }

    #[test]
    fn failure_carries_reason_and_message() {
        let outcome: ToolOutcome<TicketCreated> = Err(ToolFailure::not_found()).into();
        let value = serde_json::to_value(outcome).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["reason"], "not_found");
        assert!(value["error"].as_str().unwrap().contains("double-check"));
    }

    #[test]
    fn unsupported_issue_lists_options() {
        let failure = ToolFailure::unsupported_issue(&IssueCatalog::reference());
        assert_eq!(failure.reason, FailureReason::UnsupportedIssue);
        assert!(failure.message.contains("Printer problems ($10)"));
    }

    #[test]
    fn invalid_field_lists_allowed_fields() {
        let failure = ToolFailure::invalid_field(&[
            TicketField::Phone,
            TicketField::Address,
            TicketField::Issue,
        ]);
        assert_eq!(
            failure.message,
            "I can only change your phone, address, or issue."
        );
    }

    #[test]
    fn edit_reply_names_its_target() {
        let edited = FieldEdited {
            field: TicketField::Phone,
            value: "5551234".to_string(),
            price: None,
            applied_to: DraftEdit::Ticket { ticket_id: 7 },
        };
        assert_eq!(
            serde_json::to_value(edited).unwrap(),
            json!({"field": "phone", "value": "5551234", "target": "ticket", "ticket_id": 7})
        );
    }

    #[test]
    fn reason_codes_match_serialization() {
        for reason in [
            FailureReason::UnsupportedIssue,
            FailureReason::InvalidField,
            FailureReason::MissingField,
            FailureReason::InvalidArguments,
            FailureReason::NotFound,
            FailureReason::BackendUnavailable,
        ] {
            assert_eq!(serde_json::to_value(reason).unwrap(), reason.as_str());
        }
    }
}
