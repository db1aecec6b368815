//! Per-conversation state.
//!
//! A [`ConversationSession`] belongs to exactly one caller and is driven
//! sequentially, so nothing here is synchronized. The draft only ever lives
//! in memory.

use helpdesk_types::TicketField;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Where a conversation is in the ticket lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    New,
    /// Edits have been staged but no ticket exists yet.
    Drafting,
    /// A ticket was created in this session.
    Committed { ticket_id: i64 },
    /// A lookup is in flight.
    LookupPending,
    /// A previously created ticket was found by identity.
    Found { ticket_id: i64 },
    /// An update to an existing ticket is in flight.
    Updating { ticket_id: i64 },
    Updated { ticket_id: i64 },
}

impl SessionPhase {
    /// Ticket created earlier in this session, if any.
    pub fn committed_ticket(&self) -> Option<i64> {
        match self {
            Self::Committed { ticket_id } => Some(*ticket_id),
            _ => None,
        }
    }
}

/// Pending ticket values collected before the ticket is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    values: BTreeMap<TicketField, String>,
    price: Option<u32>,
}

impl TicketDraft {
    /// Stages a plain text value, replacing any earlier one.
    pub fn set(&mut self, field: TicketField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Stages a resolved issue together with its price.
    pub fn set_issue(&mut self, issue: impl Into<String>, price: u32) {
        self.values.insert(TicketField::Issue, issue.into());
        self.price = Some(price);
    }

    pub fn get(&self, field: TicketField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Price resolved by the last issue edit.
    pub fn price(&self) -> Option<u32> {
        self.price
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.price = None;
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            name: self.get(TicketField::Name).map(str::to_string),
            email: self.get(TicketField::Email).map(str::to_string),
            phone: self.get(TicketField::Phone).map(str::to_string),
            address: self.get(TicketField::Address).map(str::to_string),
            issue: self.get(TicketField::Issue).map(str::to_string),
            price: self.price,
        }
    }
}

/// Serializable view of a draft, echoed back after each staged edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    pub(crate) phase: SessionPhase,
    pub(crate) draft: TicketDraft,
    last_active: Instant,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: SessionPhase::New,
            draft: TicketDraft::default(),
            last_active: Instant::now(),
        }
    }

    /// Marks the session as used just now.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the session was created or last touched.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    /// Drops the draft and any committed ticket so the caller can start
    /// another ticket in the same conversation.
    pub fn reset(&mut self) {
        tracing::debug!(session_id = %self.id, "session reset");
        self.phase = SessionPhase::New;
        self.draft.clear();
    }
}
