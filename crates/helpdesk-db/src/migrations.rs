//! Versioned schema for the ticket database.
//!
//! Each migration is an SQL file compiled into the binary. The names of the
//! applied ones are kept in `_helpdesk_migrations`; on startup the missing
//! ones run in list order, each inside its own transaction together with
//! its tracking row.

use rusqlite::Connection;
use std::collections::HashSet;
use thiserror::Error;

const TRACKING_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS _helpdesk_migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// Append only; names are never reused.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "000_tickets",
        sql: include_str!("migrations/000_tickets.sql"),
    },
    Migration {
        name: "001_ticket_identity_index",
        sql: include_str!("migrations/001_ticket_identity_index.sql"),
    },
];

/// Errors that can occur while bringing the schema up to date.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration (or the tracking table bootstrap) failed and was rolled
    /// back.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        name: String,
        source: rusqlite::Error,
    },

    /// The set of applied migrations could not be read.
    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),
}

impl MigrationError {
    fn failed(name: &str) -> impl Fn(rusqlite::Error) -> Self + '_ {
        move |source| Self::ExecutionFailed {
            name: name.to_string(),
            source,
        }
    }
}

/// Applies every migration the database has not seen yet.
///
/// Returns how many were applied by this call; `0` means the schema was
/// already current.
///
/// # Errors
///
/// Returns `MigrationError` if the applied set cannot be read or a
/// migration fails. Migrations before the failing one stay applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    conn.execute_batch(TRACKING_TABLE_DDL)
        .map_err(MigrationError::failed("_helpdesk_migrations_bootstrap"))?;

    let done = applied_names(conn)?;
    let pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !done.contains(m.name))
        .collect();

    if pending.is_empty() {
        tracing::debug!(known = done.len(), "schema is current");
        return Ok(0);
    }

    for migration in &pending {
        apply(conn, migration)?;
    }
    Ok(pending.len())
}

fn applied_names(conn: &Connection) -> Result<HashSet<String>, MigrationError> {
    let mut stmt = conn
        .prepare("SELECT name FROM _helpdesk_migrations")
        .map_err(MigrationError::StateQuery)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<HashSet<String>, _>>())
        .map_err(MigrationError::StateQuery)?;
    Ok(names)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), MigrationError> {
    tracing::info!(migration = migration.name, "applying migration");
    let failed = MigrationError::failed(migration.name);

    let tx = conn.unchecked_transaction().map_err(&failed)?;
    tx.execute_batch(migration.sql).map_err(&failed)?;
    tx.execute(
        "INSERT INTO _helpdesk_migrations (name) VALUES (?1)",
        [migration.name],
    )
    .map_err(&failed)?;
    tx.commit().map_err(&failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn run_migrations_on_fresh_db() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, MIGRATIONS.len());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM _helpdesk_migrations", [], |row| {
                row.get(0)
            })
            .expect("should query migration count");
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn run_migrations_idempotent() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");

        run_migrations(&conn).expect("first run should succeed");
        let second = run_migrations(&conn).expect("second run should succeed");
        assert_eq!(second, 0, "no new migrations to apply");
    }

    #[test]
    fn tickets_table_has_expected_columns() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");

        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info('tickets') ORDER BY cid")
            .expect("should prepare");
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("should query")
            .collect::<Result<_, _>>()
            .expect("should read column names");

        assert_eq!(
            columns,
            [
                "id",
                "name",
                "email",
                "phone",
                "address",
                "issue",
                "price",
                "confirmation_number",
                "created_at"
            ]
        );
    }

    #[test]
    fn created_at_defaults_to_now() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");

        conn.execute(
            "INSERT INTO tickets (name, email, phone, address, issue, price, confirmation_number)
             VALUES ('a', 'b', 'c', 'd', 'e', 10, 12345)",
            [],
        )
        .expect("insert should succeed");

        let created_at: String = conn
            .query_row("SELECT created_at FROM tickets", [], |row| row.get(0))
            .expect("should read created_at");
        assert_eq!(created_at.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn schema_rejects_out_of_range_confirmation_numbers() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");

        let result = conn.execute(
            "INSERT INTO tickets (name, email, phone, address, issue, price, confirmation_number)
             VALUES ('a', 'b', 'c', 'd', 'e', 10, 123)",
            [],
        );
        assert!(result.is_err(), "4-digit codes must be rejected");
    }

    #[test]
    fn migration_side_effects_rollback_when_tracking_insert_fails() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let migrations = [Migration {
            name: "001_tracking_insert_conflict",
            sql: "
                CREATE TABLE rollback_marker (id INTEGER PRIMARY KEY);
                INSERT INTO _helpdesk_migrations (name) VALUES ('001_tracking_insert_conflict');
            ",
        }];

        let err = run_migrations_from_list(&conn, &migrations)
            .expect_err("tracking insert conflict should fail migration");

        match err {
            MigrationError::ExecutionFailed { name, .. } => {
                assert_eq!(name, "001_tracking_insert_conflict")
            }
            other => panic!("unexpected error type: {other:?}"),
        }

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'rollback_marker')",
                [],
                |row| row.get(0),
            )
            .expect("should query sqlite_master");

        assert!(
            !exists,
            "schema side effects should be rolled back when tracking insert fails"
        );
    }
}
