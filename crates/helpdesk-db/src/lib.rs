//! Database layer for the help desk.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. Every table is created through versioned
//! migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process is required,
//!   and WAL allows concurrent readers with a single writer, which matches
//!   many short ticket reads against occasional single-row writes.
//! - **`r2d2` connection pool**: each store operation checks out one
//!   connection and returns it when done; nothing is held between calls.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the code that depends on it.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
