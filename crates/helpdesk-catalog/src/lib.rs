//! Issue catalog and keyword classifier for the help desk.
//!
//! The catalog is plain configuration: an ordered list of
//! [`IssueCategory`](helpdesk_types::IssueCategory) entries, validated once at
//! startup and shared read-only (usually behind an `Arc`). The classifier
//! scans free text for the first catalog keyword it contains.
//!
//! Matching is a low-precision substring heuristic. The language model has
//! already rephrased the caller's intent by the time text reaches it, so the
//! classifier is only the last gate before a ticket is priced.

mod catalog;
mod classifier;

pub use catalog::{CatalogError, IssueCatalog};
pub use classifier::{classify, classify_match, IssueMatch};
