//! JSON function-call seam between a language model and [`TicketTools`].
//!
//! [`tool_definitions`] advertises the operations as JSON-schema function
//! declarations; [`invoke`] decodes a call, runs it against the session, and
//! always returns a `{"success": bool, ...}` object.

use crate::outcome::{ToolFailure, ToolOutcome};
use crate::session::ConversationSession;
use crate::tools::{CreateTicketArgs, TicketTools};
use helpdesk_catalog::IssueCatalog;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CREATE_TICKET: &str = "create_ticket";
pub const EDIT_TICKET: &str = "edit_ticket";
pub const LOOKUP_TICKET: &str = "lookup_ticket";
pub const UPDATE_EXISTING_TICKET: &str = "update_existing_ticket";
pub const GET_SUPPORTED_ISSUES: &str = "get_supported_issues";
pub const START_NEW_TICKET_SESSION: &str = "start_new_ticket_session";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: String,
    pub parameters: Value,
}

/// Function declarations for every tool, phrased against `catalog`.
pub fn tool_definitions(catalog: &IssueCatalog) -> Vec<ToolDefinition> {
    let code = json!({
        "type": "string",
        "description": "The five-digit confirmation number given when the ticket was created"
    });

    vec![
        ToolDefinition {
            name: CREATE_TICKET,
            description: format!(
                "Create a support ticket once the caller has given their name, email, phone, \
                 address, and a description of the problem. {}",
                catalog.spoken_summary()
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Caller's full name"},
                    "email": {"type": "string", "description": "Caller's email address"},
                    "phone": {"type": "string", "description": "Caller's phone number"},
                    "address": {"type": "string", "description": "Caller's street address"},
                    "issue_description": {
                        "type": "string",
                        "description": "The problem in the caller's words"
                    }
                },
                "required": ["name", "email", "phone", "address", "issue_description"]
            }),
        },
        ToolDefinition {
            name: EDIT_TICKET,
            description: "Record or correct one detail of the ticket being created in this call."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "field": {
                        "type": "string",
                        "enum": ["name", "email", "phone", "address", "issue"]
                    },
                    "value": {"type": "string"}
                },
                "required": ["field", "value"]
            }),
        },
        ToolDefinition {
            name: LOOKUP_TICKET,
            description: "Find an existing ticket by the caller's name, email, and confirmation number."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "email": {"type": "string"},
                    "confirmation_code": code.clone()
                },
                "required": ["name", "email", "confirmation_code"]
            }),
        },
        ToolDefinition {
            name: UPDATE_EXISTING_TICKET,
            description: "Change the phone, address, or issue on an existing ticket after \
                          verifying the caller's name, email, and confirmation number."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "email": {"type": "string"},
                    "confirmation_code": code,
                    "field": {"type": "string", "enum": ["phone", "address", "issue"]},
                    "value": {"type": "string"}
                },
                "required": ["name", "email", "confirmation_code", "field", "value"]
            }),
        },
        ToolDefinition {
            name: GET_SUPPORTED_ISSUES,
            description: "List the supported issue types and their prices.".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: START_NEW_TICKET_SESSION,
            description: "Discard the current draft so the caller can open another ticket."
                .to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        },
    ]
}

#[derive(Deserialize)]
struct EditArgs {
    field: String,
    value: String,
}

#[derive(Deserialize)]
struct LookupArgs {
    name: String,
    email: String,
    #[serde(alias = "confirmation_number")]
    confirmation_code: CodeArg,
}

#[derive(Deserialize)]
struct UpdateArgs {
    name: String,
    email: String,
    #[serde(alias = "confirmation_number")]
    confirmation_code: CodeArg,
    field: String,
    value: String,
}

/// Confirmation codes arrive as numbers or as transcribed speech.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodeArg {
    Number(u64),
    Text(String),
}

impl CodeArg {
    fn resolve(&self) -> Result<u32, ToolFailure> {
        let parsed = match self {
            CodeArg::Number(n) => u32::try_from(*n).ok(),
            CodeArg::Text(s) => {
                let digits: String = s
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '-')
                    .collect();
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    digits.parse().ok()
                } else {
                    None
                }
            }
        };
        parsed.ok_or_else(|| {
            ToolFailure::invalid_arguments("confirmation_code must be the five-digit number")
        })
    }
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolFailure> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(ToolFailure::invalid_arguments)
}

fn render<T: Serialize>(result: Result<T, ToolFailure>) -> Value {
    serde_json::to_value(ToolOutcome::from(result)).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to encode tool result");
        json!({
            "success": false,
            "reason": "backend_unavailable",
            "error": "Sorry, something went wrong on our side."
        })
    })
}

/// Runs the tool `name` with JSON `args` against `session`.
pub async fn invoke(
    tools: &TicketTools,
    session: &mut ConversationSession,
    name: &str,
    args: Value,
) -> Value {
    tracing::debug!(session_id = %session.id(), tool = name, "tool call");
    session.touch();

    match name {
        CREATE_TICKET => match decode::<CreateTicketArgs>(args) {
            Ok(args) => render(tools.create_ticket(session, args).await),
            Err(failure) => render::<()>(Err(failure)),
        },
        EDIT_TICKET => match decode::<EditArgs>(args) {
            Ok(a) => render(tools.edit_ticket(session, &a.field, &a.value).await),
            Err(failure) => render::<()>(Err(failure)),
        },
        LOOKUP_TICKET => {
            let call = async {
                let a: LookupArgs = decode(args)?;
                let code = a.confirmation_code.resolve()?;
                tools.lookup_ticket(session, &a.name, &a.email, code).await
            };
            render(call.await)
        }
        UPDATE_EXISTING_TICKET => {
            let call = async {
                let a: UpdateArgs = decode(args)?;
                let code = a.confirmation_code.resolve()?;
                tools
                    .update_existing_ticket(session, &a.name, &a.email, code, &a.field, &a.value)
                    .await
            };
            render(call.await)
        }
        GET_SUPPORTED_ISSUES => render(Ok(tools.supported_issues())),
        START_NEW_TICKET_SESSION => {
            session.reset();
            json!({"success": true, "message": "Ready for a new ticket."})
        }
        other => {
            tracing::warn!(tool = other, "unknown tool requested");
            render::<()>(Err(ToolFailure::invalid_arguments(format!(
                "unknown tool '{}'",
                other
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoken_codes_are_accepted() {
        assert_eq!(CodeArg::Text("12 345".to_string()).resolve().unwrap(), 12345);
        assert_eq!(CodeArg::Text("1-2-3-4-5".to_string()).resolve().unwrap(), 12345);
        assert_eq!(CodeArg::Number(54321).resolve().unwrap(), 54321);
    }

    #[test]
    fn garbled_codes_are_rejected() {
        assert!(CodeArg::Text("twelve".to_string()).resolve().is_err());
        assert!(CodeArg::Text("".to_string()).resolve().is_err());
        assert!(CodeArg::Number(u64::MAX).resolve().is_err());
    }

    #[test]
    fn every_tool_is_declared() {
        let defs = tool_definitions(&IssueCatalog::reference());
        let names: Vec<&str> = defs.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                CREATE_TICKET,
                EDIT_TICKET,
                LOOKUP_TICKET,
                UPDATE_EXISTING_TICKET,
                GET_SUPPORTED_ISSUES,
                START_NEW_TICKET_SESSION
            ]
        );
        assert!(defs[0].description.contains("Printer problems ($10)"));
    }
}
