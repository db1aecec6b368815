//! Shared types for the help-desk platform.
//!
//! This crate provides the data model used across all help-desk crates:
//! issue categories, persisted tickets, the set of editable ticket fields,
//! the tagged union of field updates accepted by the ticket store, and the
//! HTTP API bodies in [`api`].
//!
//! No crate in the workspace depends on anything *except* `helpdesk-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

pub mod api;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest confirmation code handed to a caller.
pub const CONFIRMATION_CODE_MIN: u32 = 10_000;

/// Largest confirmation code handed to a caller.
pub const CONFIRMATION_CODE_MAX: u32 = 99_999;

/// A supported problem type with its flat service fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCategory {
    /// Stable identifier (e.g. `wifi`).
    pub key: String,
    /// Customer-facing title (e.g. "Wi-Fi not working").
    pub name: String,
    /// Text copied onto tickets resolved to this category.
    #[serde(alias = "description")]
    pub display_name: String,
    /// Flat fee in whole currency units.
    #[serde(alias = "price")]
    pub unit_price: u32,
    /// Lowercase keywords, matched in order.
    pub keywords: Vec<String>,
}

/// A persisted support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Store-assigned identity, strictly increasing.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Resolved issue text (category display name at classification time).
    pub issue: String,
    pub price: u32,
    /// Five-digit code the caller uses to find the ticket again.
    #[serde(alias = "confirmation_number")]
    pub confirmation_code: u32,
    /// Creation timestamp (UTC, `YYYY-MM-DD HH:MM:SS`).
    pub created_at: String,
}

impl Ticket {
    /// Current value of an editable field.
    pub fn value_of(&self, field: TicketField) -> &str {
        match field {
            TicketField::Name => &self.name,
            TicketField::Email => &self.email,
            TicketField::Phone => &self.phone,
            TicketField::Address => &self.address,
            TicketField::Issue => &self.issue,
        }
    }
}

/// Fields required to persist a new ticket.
///
/// The issue is already resolved by the caller; the store never classifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub issue: String,
    pub price: u32,
}

/// A freshly created ticket as the store recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTicket {
    pub id: i64,
    pub confirmation_code: u32,
    /// Issue text that was persisted.
    pub issue: String,
    /// Price that was persisted.
    pub price: u32,
}

/// Ticket fields a caller may name when editing.
///
/// Price is deliberately absent: it always follows the issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketField {
    Name,
    Email,
    Phone,
    Address,
    Issue,
}

impl TicketField {
    /// Every editable field, in conversational order.
    pub const ALL: [TicketField; 5] = [
        TicketField::Name,
        TicketField::Email,
        TicketField::Phone,
        TicketField::Address,
        TicketField::Issue,
    ];

    /// Returns the wire name of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Issue => "issue",
        }
    }
}

impl fmt::Display for TicketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a field name does not match any editable field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ticket field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for TicketField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "address" => Ok(Self::Address),
            "issue" | "issue_description" => Ok(Self::Issue),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// A single allowed column change on a persisted ticket.
///
/// This is the complete allow-list for [`Ticket`] updates: a field that has
/// no variant here cannot be written through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TicketUpdate {
    Name(String),
    Email(String),
    Phone(String),
    Address(String),
    /// A resolved issue always moves together with its price.
    Issue { issue: String, price: u32 },
    Price(u32),
}

impl TicketUpdate {
    /// Builds the update for a plain text field.
    ///
    /// Returns `None` for [`TicketField::Issue`], which needs a resolved
    /// category and price.
    pub fn text(field: TicketField, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        match field {
            TicketField::Name => Some(Self::Name(value)),
            TicketField::Email => Some(Self::Email(value)),
            TicketField::Phone => Some(Self::Phone(value)),
            TicketField::Address => Some(Self::Address(value)),
            TicketField::Issue => None,
        }
    }

    /// The editable field this update targets, if any.
    pub fn field(&self) -> Option<TicketField> {
        match self {
            Self::Name(_) => Some(TicketField::Name),
            Self::Email(_) => Some(TicketField::Email),
            Self::Phone(_) => Some(TicketField::Phone),
            Self::Address(_) => Some(TicketField::Address),
            Self::Issue { .. } => Some(TicketField::Issue),
            Self::Price(_) => None,
        }
    }
}
