//! Conversation-facing ticket tools.
//!
//! The language model driving a help-desk call invokes these operations as
//! function calls. Each call takes the caller's [`ConversationSession`] (which
//! owns the in-progress draft), consults the issue classifier and a ticket
//! backend, and returns either a reply or a [`ToolFailure`]. Failures are
//! plain data: nothing crosses the tool boundary as a panic or an opaque
//! error, so the voice layer always has something it can say.
//!
//! Backends are either the local SQLite store or a remote HTTP ticket API
//! (see [`TicketBackend`]). Every backend call runs under a timeout; expiry
//! and transport failures surface as `backend_unavailable`.

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod remote;
pub mod session;
pub mod tools;

pub use backend::{LocalTicketStore, TicketBackend};
pub use dispatch::{invoke, tool_definitions, ToolDefinition};
pub use error::BackendError;
pub use outcome::{
    DraftEdit, FailureReason, FieldEdited, SupportedIssue, SupportedIssues, TicketCreated,
    TicketFound, TicketUpdated, ToolFailure, ToolOutcome,
};
pub use remote::RemoteTicketClient;
pub use session::{ConversationSession, DraftSnapshot, SessionPhase, TicketDraft};
pub use tools::{CreateTicketArgs, TicketTools, DEFAULT_BACKEND_TIMEOUT};
