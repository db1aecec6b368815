use crate::backend::TicketBackend;
use crate::error::BackendError;
use crate::outcome::{
    DraftEdit, FailureReason, FieldEdited, SupportedIssues, TicketCreated, TicketFound,
    TicketUpdated, ToolFailure,
};
use crate::session::{ConversationSession, SessionPhase};
use helpdesk_catalog::{classify, IssueCatalog};
use helpdesk_types::{IssueCategory, NewTicket, TicketField, TicketUpdate};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Applied to every backend call unless overridden.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Fields a caller may change on a ticket found by identity.
const UPDATABLE_FIELDS: [TicketField; 3] =
    [TicketField::Phone, TicketField::Address, TicketField::Issue];

/// Arguments of `create_ticket`. Any of them may already be on the draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTicketArgs {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Free-text problem description, classified on create.
    #[serde(default, alias = "issue")]
    pub issue_description: Option<String>,
}

impl CreateTicketArgs {
    fn get(&self, field: TicketField) -> Option<&str> {
        match field {
            TicketField::Name => self.name.as_deref(),
            TicketField::Email => self.email.as_deref(),
            TicketField::Phone => self.phone.as_deref(),
            TicketField::Address => self.address.as_deref(),
            TicketField::Issue => self.issue_description.as_deref(),
        }
    }
}

/// The operations a voice assistant calls while handling a support call.
///
/// Cheap to clone; share one instance across sessions.
#[derive(Clone)]
pub struct TicketTools {
    catalog: Arc<IssueCatalog>,
    backend: TicketBackend,
    timeout: Duration,
}

impl TicketTools {
    pub fn new(catalog: Arc<IssueCatalog>, backend: TicketBackend) -> Self {
        Self {
            catalog,
            backend,
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &IssueCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &TicketBackend {
        &self.backend
    }

    pub fn supported_issues(&self) -> SupportedIssues {
        SupportedIssues::from(self.catalog.as_ref())
    }

    /// Creates a ticket from the call arguments merged with the session
    /// draft. Drafted values take precedence.
    ///
    /// # Errors
    ///
    /// `missing_field` when a required value is blank after the merge,
    /// `unsupported_issue` when the description matches no category, and
    /// `backend_unavailable` when the store fails or times out.
    pub async fn create_ticket(
        &self,
        session: &mut ConversationSession,
        args: CreateTicketArgs,
    ) -> Result<TicketCreated, ToolFailure> {
        let pick = |field: TicketField| {
            session
                .draft
                .get(field)
                .or_else(|| args.get(field))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ToolFailure::missing_field(field))
        };
        let name = pick(TicketField::Name)?;
        let email = pick(TicketField::Email)?;
        let phone = pick(TicketField::Phone)?;
        let address = pick(TicketField::Address)?;
        let issue_text = pick(TicketField::Issue)?;

        let (issue, price) = match (session.draft.get(TicketField::Issue), session.draft.price())
        {
            (Some(drafted), Some(price)) => (drafted.to_string(), price),
            _ => {
                let category = self.resolve_issue(&issue_text)?;
                (category.display_name.clone(), category.unit_price)
            }
        };

        let ticket = NewTicket {
            name,
            email,
            phone,
            address,
            issue,
            price,
        };
        let created = self
            .guarded("create_ticket", self.backend.create(ticket.clone()))
            .await?;

        session.draft.clear();
        session.phase = SessionPhase::Committed {
            ticket_id: created.id,
        };
        tracing::info!(
            session_id = %session.id(),
            ticket_id = created.id,
            confirmation_code = created.confirmation_code,
            price = created.price,
            "ticket created"
        );

        Ok(TicketCreated {
            id: created.id,
            confirmation_code: created.confirmation_code,
            email: ticket.email,
            issue: created.issue,
            price: created.price,
        })
    }

    /// Records one field value.
    ///
    /// Before a ticket exists the value is staged on the draft. Once this
    /// session has created a ticket, the edit goes straight to that ticket.
    pub async fn edit_ticket(
        &self,
        session: &mut ConversationSession,
        field: &str,
        value: &str,
    ) -> Result<FieldEdited, ToolFailure> {
        let field: TicketField = field
            .parse()
            .map_err(|_| ToolFailure::invalid_field(&TicketField::ALL))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ToolFailure::missing_field(field));
        }

        if let Some(ticket_id) = session.phase.committed_ticket() {
            let updated = self
                .apply_update("edit_ticket", ticket_id, field, value)
                .await?;
            tracing::info!(session_id = %session.id(), ticket_id, %field, "edited committed ticket");
            return Ok(FieldEdited {
                field,
                value: updated.value,
                price: updated.price,
                applied_to: DraftEdit::Ticket { ticket_id },
            });
        }

        let (value, price) = match self.build_update(field, value)? {
            TicketUpdate::Issue { issue, price } => {
                session.draft.set_issue(issue.clone(), price);
                (issue, Some(price))
            }
            _ => {
                session.draft.set(field, value);
                (value.to_string(), None)
            }
        };
        session.phase = SessionPhase::Drafting;
        tracing::debug!(session_id = %session.id(), %field, "staged draft value");

        Ok(FieldEdited {
            field,
            value,
            price,
            applied_to: DraftEdit::Draft {
                draft: session.draft.snapshot(),
            },
        })
    }

    /// Finds a ticket by the caller's name, email, and confirmation code.
    pub async fn lookup_ticket(
        &self,
        session: &mut ConversationSession,
        name: &str,
        email: &str,
        confirmation_code: u32,
    ) -> Result<TicketFound, ToolFailure> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ToolFailure::missing_field(TicketField::Name));
        }
        if email.is_empty() {
            return Err(ToolFailure::missing_field(TicketField::Email));
        }

        session.phase = SessionPhase::LookupPending;
        let found = self
            .guarded(
                "lookup_ticket",
                self.backend.find_by_identity(name, email, confirmation_code),
            )
            .await;

        match found {
            Ok(Some(ticket)) => {
                session.phase = SessionPhase::Found {
                    ticket_id: ticket.id,
                };
                tracing::info!(session_id = %session.id(), ticket_id = ticket.id, "ticket found");
                let message = format!(
                    "Found your ticket! Your issue is: {} for ${}",
                    ticket.issue, ticket.price
                );
                Ok(TicketFound { ticket, message })
            }
            Ok(None) => {
                session.phase = SessionPhase::New;
                tracing::info!(session_id = %session.id(), confirmation_code, "no ticket matched");
                Err(ToolFailure::not_found())
            }
            Err(failure) => {
                session.phase = SessionPhase::New;
                Err(failure)
            }
        }
    }

    /// Changes the phone, address, or issue of a ticket found by identity.
    ///
    /// The lookup runs first; nothing is written unless it matches.
    pub async fn update_existing_ticket(
        &self,
        session: &mut ConversationSession,
        name: &str,
        email: &str,
        confirmation_code: u32,
        field: &str,
        value: &str,
    ) -> Result<TicketUpdated, ToolFailure> {
        let found = self
            .lookup_ticket(session, name, email, confirmation_code)
            .await?;
        let ticket_id = found.ticket.id;

        let field = field
            .parse::<TicketField>()
            .ok()
            .filter(|f| UPDATABLE_FIELDS.contains(f))
            .ok_or_else(|| ToolFailure::invalid_field(&UPDATABLE_FIELDS))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ToolFailure::missing_field(field));
        }

        session.phase = SessionPhase::Updating { ticket_id };
        match self
            .apply_update("update_existing_ticket", ticket_id, field, value)
            .await
        {
            Ok(updated) => {
                session.phase = SessionPhase::Updated { ticket_id };
                tracing::info!(session_id = %session.id(), ticket_id, %field, "ticket updated");
                Ok(updated)
            }
            Err(failure) => {
                session.phase = match failure.reason {
                    FailureReason::NotFound => SessionPhase::New,
                    _ => SessionPhase::Found { ticket_id },
                };
                Err(failure)
            }
        }
    }

    /// Changes any editable field of a ticket addressed by id.
    ///
    /// Used by the ticket API; callers are trusted to own the ticket.
    pub async fn update_ticket_by_id(
        &self,
        ticket_id: i64,
        field: &str,
        value: &str,
    ) -> Result<TicketUpdated, ToolFailure> {
        let field: TicketField = field
            .parse()
            .map_err(|_| ToolFailure::invalid_field(&TicketField::ALL))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ToolFailure::missing_field(field));
        }
        self.apply_update("update_ticket_by_id", ticket_id, field, value)
            .await
    }

    /// Writes one validated field to a stored ticket.
    ///
    /// The reply reports the value and price the backend stored.
    async fn apply_update(
        &self,
        operation: &'static str,
        ticket_id: i64,
        field: TicketField,
        value: &str,
    ) -> Result<TicketUpdated, ToolFailure> {
        let update = self.build_update(field, value)?;

        let stored = self
            .guarded(operation, self.backend.update(ticket_id, vec![update]))
            .await?
            .ok_or_else(|| {
                tracing::warn!(operation, ticket_id, "update matched no ticket");
                ToolFailure::not_found()
            })?;

        let value = stored.value_of(field).to_string();
        let price = (field == TicketField::Issue).then_some(stored.price);

        let message = match price {
            Some(price) => format!(
                "Your ticket has been updated. Your issue is now {} and the price is ${}.",
                value, price
            ),
            None => format!(
                "Your ticket has been updated. Your {} is now {}.",
                field, value
            ),
        };
        Ok(TicketUpdated {
            field,
            value,
            ticket_id,
            price,
            message,
        })
    }

    fn resolve_issue(&self, text: &str) -> Result<&IssueCategory, ToolFailure> {
        classify(&self.catalog, text).ok_or_else(|| {
            tracing::debug!(text, "issue not recognized");
            ToolFailure::unsupported_issue(&self.catalog)
        })
    }

    fn build_update(&self, field: TicketField, value: &str) -> Result<TicketUpdate, ToolFailure> {
        match TicketUpdate::text(field, value) {
            Some(update) => Ok(update),
            None => {
                let category = self.resolve_issue(value)?;
                Ok(TicketUpdate::Issue {
                    issue: category.display_name.clone(),
                    price: category.unit_price,
                })
            }
        }
    }

    /// Runs a backend call under the configured timeout, turning any
    /// failure into a [`ToolFailure`].
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ToolFailure>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(self.downgrade(operation, err)),
            Err(_) => Err(self.downgrade(operation, BackendError::Timeout(self.timeout))),
        }
    }

    fn downgrade(&self, operation: &'static str, err: BackendError) -> ToolFailure {
        if let BackendError::Rejected { reason, message } = &err {
            let known = match reason.as_str() {
                "unsupported_issue" => Some(FailureReason::UnsupportedIssue),
                "invalid_field" => Some(FailureReason::InvalidField),
                "not_found" => Some(FailureReason::NotFound),
                _ => None,
            };
            if let Some(reason) = known {
                tracing::warn!(operation, backend = self.backend.kind(), %message, "ticket API rejected request");
                return ToolFailure::new(reason, message.clone());
            }
        }

        tracing::error!(operation, backend = self.backend.kind(), error = %err, "ticket backend failed");
        ToolFailure::backend_unavailable()
    }
}
