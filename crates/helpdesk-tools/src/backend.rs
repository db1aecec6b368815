//! Ticket backends reachable from the tools.

use crate::error::BackendError;
use crate::remote::RemoteTicketClient;
use helpdesk_db::DbPool;
use helpdesk_tickets::TicketError;
use helpdesk_types::{CreatedTicket, NewTicket, Ticket, TicketUpdate};
use rusqlite::Connection;

/// The embedded SQLite store, driven off the async runtime.
///
/// Each call checks out one pooled connection inside `spawn_blocking` and
/// returns it before completing; no lock is held between calls.
#[derive(Clone)]
pub struct LocalTicketStore {
    pool: DbPool,
}

impl LocalTicketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn run<T, F>(&self, op: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, TicketError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            Ok(op(&*conn)?)
        })
        .await?
    }

    pub async fn create(&self, ticket: NewTicket) -> Result<CreatedTicket, BackendError> {
        self.run(move |conn| helpdesk_tickets::create_ticket(conn, &ticket))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Ticket>, BackendError> {
        self.run(move |conn| helpdesk_tickets::get_ticket(conn, id))
            .await
    }

    pub async fn find_by_identity(
        &self,
        name: &str,
        email: &str,
        confirmation_code: u32,
    ) -> Result<Option<Ticket>, BackendError> {
        let name = name.to_string();
        let email = email.to_string();
        self.run(move |conn| {
            helpdesk_tickets::find_by_identity(conn, &name, &email, confirmation_code)
        })
        .await
    }

    /// Applies `updates` and reads the ticket back in one transaction.
    ///
    /// `None` when no ticket has that id.
    pub async fn update(
        &self,
        id: i64,
        updates: Vec<TicketUpdate>,
    ) -> Result<Option<Ticket>, BackendError> {
        self.run(move |conn| {
            let tx = conn.unchecked_transaction()?;
            if !helpdesk_tickets::update_ticket(&tx, id, &updates)? {
                return Ok(None);
            }
            let ticket = helpdesk_tickets::get_ticket(&tx, id)?;
            tx.commit()?;
            Ok(ticket)
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, BackendError> {
        self.run(move |conn| helpdesk_tickets::delete_ticket(conn, id))
            .await
    }

    pub async fn list(&self) -> Result<Vec<Ticket>, BackendError> {
        self.run(helpdesk_tickets::list_tickets).await
    }
}

/// Where the tools read and write tickets.
#[derive(Clone)]
pub enum TicketBackend {
    Local(LocalTicketStore),
    Remote(RemoteTicketClient),
}

impl TicketBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }

    pub async fn create(&self, ticket: NewTicket) -> Result<CreatedTicket, BackendError> {
        match self {
            Self::Local(store) => store.create(ticket).await,
            Self::Remote(client) => client.create(&ticket).await,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Ticket>, BackendError> {
        match self {
            Self::Local(store) => store.get(id).await,
            Self::Remote(client) => client.get(id).await,
        }
    }

    pub async fn find_by_identity(
        &self,
        name: &str,
        email: &str,
        confirmation_code: u32,
    ) -> Result<Option<Ticket>, BackendError> {
        match self {
            Self::Local(store) => store.find_by_identity(name, email, confirmation_code).await,
            Self::Remote(client) => client.lookup(name, email, confirmation_code).await,
        }
    }

    /// Applies `updates` and returns the ticket as stored afterwards, or
    /// `None` when no ticket has that id.
    pub async fn update(
        &self,
        id: i64,
        updates: Vec<TicketUpdate>,
    ) -> Result<Option<Ticket>, BackendError> {
        match self {
            Self::Local(store) => store.update(id, updates).await,
            Self::Remote(client) => {
                if !client.update(id, &updates).await? {
                    return Ok(None);
                }
                client.get(id).await
            }
        }
    }
}

impl From<LocalTicketStore> for TicketBackend {
    fn from(store: LocalTicketStore) -> Self {
        Self::Local(store)
    }
}

impl From<RemoteTicketClient> for TicketBackend {
    fn from(client: RemoteTicketClient) -> Self {
        Self::Remote(client)
    }
}
