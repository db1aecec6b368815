//! Ticket persistence for the help desk.
//!
//! Implements create, point lookup, caller-identity lookup, partial update,
//! delete, and listing over the `tickets` table. Every operation takes a
//! borrowed [`rusqlite::Connection`] and runs as a single statement, so a
//! concurrent reader never observes a half-written row and concurrent writers
//! to the same row serialize inside SQLite.
//!
//! The store never classifies issues: callers hand it an already-resolved
//! issue text and price.

use helpdesk_types::{
    CreatedTicket, NewTicket, Ticket, TicketUpdate, CONFIRMATION_CODE_MAX, CONFIRMATION_CODE_MIN,
};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

/// Errors that can occur during ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

const TICKET_COLUMNS: &str =
    "id, name, email, phone, address, issue, price, confirmation_number, created_at";

/// Draws a confirmation code uniformly from the five-digit range.
///
/// Codes are not checked for uniqueness; two tickets may share one.
pub fn generate_confirmation_code<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(CONFIRMATION_CODE_MIN..=CONFIRMATION_CODE_MAX)
}

/// Persists a new ticket with a freshly drawn confirmation code.
pub fn create_ticket(conn: &Connection, ticket: &NewTicket) -> Result<CreatedTicket, TicketError> {
    let code = generate_confirmation_code(&mut rand::thread_rng());
    create_ticket_with_code(conn, ticket, code)
}

/// Persists a new ticket with a caller-chosen confirmation code.
pub fn create_ticket_with_code(
    conn: &Connection,
    ticket: &NewTicket,
    confirmation_code: u32,
) -> Result<CreatedTicket, TicketError> {
    let id: i64 = conn.query_row(
        "INSERT INTO tickets (name, email, phone, address, issue, price, confirmation_number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING id",
        params![
            ticket.name,
            ticket.email,
            ticket.phone,
            ticket.address,
            ticket.issue,
            ticket.price,
            confirmation_code,
        ],
        |row| row.get(0),
    )?;

    tracing::info!(
        ticket_id = id,
        confirmation_code,
        issue = %ticket.issue,
        price = ticket.price,
        "created ticket"
    );

    Ok(CreatedTicket {
        id,
        confirmation_code,
        issue: ticket.issue.clone(),
        price: ticket.price,
    })
}

/// Retrieves a ticket by id.
pub fn get_ticket(conn: &Connection, id: i64) -> Result<Option<Ticket>, TicketError> {
    let ticket = conn
        .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
            [id],
            map_row_to_ticket,
        )
        .optional()?;
    Ok(ticket)
}

/// Finds the ticket a caller identifies by name, email, and confirmation code.
///
/// Name and email compare trimmed and case-insensitively; the code must
/// match exactly. When several tickets match, the most recently created one
/// wins.
pub fn find_by_identity(
    conn: &Connection,
    name: &str,
    email: &str,
    confirmation_code: u32,
) -> Result<Option<Ticket>, TicketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets
         WHERE confirmation_number = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;

    let name = normalize(name);
    let email = normalize(email);

    let rows = stmt.query_map([confirmation_code], map_row_to_ticket)?;
    for row in rows {
        let ticket = row?;
        if normalize(&ticket.name) == name && normalize(&ticket.email) == email {
            return Ok(Some(ticket));
        }
    }

    tracing::debug!(confirmation_code, "no ticket matched caller identity");
    Ok(None)
}

/// Applies `updates` to ticket `id` in one atomic `UPDATE` statement.
///
/// Returns `false` when `updates` is empty or no ticket has that id. If the
/// same column appears twice, the later update wins.
pub fn update_ticket(
    conn: &Connection,
    id: i64,
    updates: &[TicketUpdate],
) -> Result<bool, TicketError> {
    if updates.is_empty() {
        return Ok(false);
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    let mut push = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
        values.push(value);
        set_parts.push(format!("{} = ?{}", column, values.len()));
    };

    for update in updates {
        match update {
            TicketUpdate::Name(v) => push("name", Box::new(v.clone())),
            TicketUpdate::Email(v) => push("email", Box::new(v.clone())),
            TicketUpdate::Phone(v) => push("phone", Box::new(v.clone())),
            TicketUpdate::Address(v) => push("address", Box::new(v.clone())),
            TicketUpdate::Issue { issue, price } => {
                push("issue", Box::new(issue.clone()));
                push("price", Box::new(*price));
            }
            TicketUpdate::Price(price) => push("price", Box::new(*price)),
        }
    }

    let sql = format!(
        "UPDATE tickets SET {} WHERE id = ?{}",
        set_parts.join(", "),
        values.len() + 1
    );
    values.push(Box::new(id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, params.as_slice())?;

    if count == 0 {
        tracing::debug!(ticket_id = id, "update matched no ticket");
        return Ok(false);
    }

    tracing::info!(ticket_id = id, fields = updates.len(), "updated ticket");
    Ok(true)
}

/// Deletes a ticket. Returns `false` if it did not exist.
pub fn delete_ticket(conn: &Connection, id: i64) -> Result<bool, TicketError> {
    let count = conn.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
    if count > 0 {
        tracing::info!(ticket_id = id, "deleted ticket");
    }
    Ok(count > 0)
}

/// Lists every ticket, most recently created first.
pub fn list_tickets(conn: &Connection) -> Result<Vec<Ticket>, TicketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map([], map_row_to_ticket)?;
    let mut tickets = Vec::new();
    for row in rows {
        tickets.push(row?);
    }
    Ok(tickets)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn map_row_to_ticket(row: &Row) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        issue: row.get(5)?,
        price: row.get(6)?,
        confirmation_code: row.get(7)?,
        created_at: row.get(8)?,
    })
}
