//! Client use-cases that span the `clients` and `client_details` tables.
//!
//! # Responsibility
//! - Save a client together with its detail as one atomic unit.
//! - Delete a client and its detail as one atomic unit.
//! - Read clients joined with their details in one consistent snapshot.
//!
//! # Invariants
//! - Every write here runs on one connection inside one IMMEDIATE transaction:
//!   it commits when all statements succeed and rolls back otherwise.
//! - The client row is written before its detail and deleted after it.
//! - A failed operation returns the original store error after rollback.

use crate::db::ConnectionProvider;
use crate::model::client::{Client, ClientDetail, ClientWithDetail};
use crate::model::EntityId;
use crate::repo::entity_repo::{RepoError, RepoResult};
use crate::repo::table::{delete_row, insert_row, select_all, select_by_id, update_row};
use log::{error, info, warn};
use rusqlite::{Transaction, TransactionBehavior};
use std::time::Instant;

/// Composite client operations over a connection provider.
pub struct ClientService<P> {
    provider: P,
}

impl<P: ConnectionProvider> ClientService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Inserts `client` and then `detail` atomically.
    ///
    /// # Errors
    /// - [`RepoError::DetailIdMismatch`] before touching the store when ids differ.
    /// - The first failing insert's error, after the transaction was rolled back.
    pub fn save_client_with_detail(&self, client: &Client, detail: &ClientDetail) -> RepoResult<()> {
        if detail.id != client.id {
            return Err(RepoError::DetailIdMismatch {
                client_id: client.id,
                detail_id: detail.id,
            });
        }

        self.write_atomically("client_save", client.id, |tx| {
            insert_row(tx, client)?;
            insert_row(tx, detail)
        })
    }

    /// Adds or replaces the detail of an existing client.
    ///
    /// Fails with a constraint violation when the client does not exist.
    pub fn save_detail(&self, detail: &ClientDetail) -> RepoResult<()> {
        self.write_atomically("client_detail_save", detail.id, |tx| {
            if update_row(tx, detail)? == 0 {
                insert_row(tx, detail)?;
            }
            Ok(())
        })
    }

    /// Removes the detail (if any) and then the client.
    ///
    /// Returns the number of client rows removed (0 or 1).
    pub fn delete_client_with_detail(&self, id: EntityId) -> RepoResult<usize> {
        self.write_atomically("client_delete", id, |tx| {
            delete_row::<ClientDetail>(tx, id)?;
            delete_row::<Client>(tx, id)
        })
    }

    pub fn find_with_detail(&self, id: EntityId) -> RepoResult<Option<ClientWithDetail>> {
        let mut conn = self.provider.connect()?;
        let tx = conn.transaction()?;
        let Some(client) = select_by_id::<Client>(&tx, id)? else {
            return Ok(None);
        };
        let detail = select_by_id::<ClientDetail>(&tx, id)?;
        tx.commit()?;
        Ok(Some(ClientWithDetail { client, detail }))
    }

    /// Lists every client ordered by id, each joined with its detail.
    pub fn list_with_details(&self) -> RepoResult<Vec<ClientWithDetail>> {
        let mut conn = self.provider.connect()?;
        let tx = conn.transaction()?;
        let clients = select_all::<Client>(&tx)?;
        let mut merged = Vec::with_capacity(clients.len());
        for client in clients {
            let detail = select_by_id::<ClientDetail>(&tx, client.id)?;
            merged.push(ClientWithDetail { client, detail });
        }
        tx.commit()?;
        Ok(merged)
    }

    fn write_atomically<T>(
        &self,
        event: &str,
        client_id: EntityId,
        work: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let mut conn = self.provider.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        info!("event={event} module=client_service status=start client_id={client_id}");

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                info!(
                    "event={event} module=client_service status=ok client_id={client_id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event={event} module=client_service status=error client_id={client_id} error_code=rollback_failed error={rollback_err}"
                    );
                }
                warn!(
                    "event={event} module=client_service status=rolled_back client_id={client_id} duration_ms={} error_kind={}",
                    started_at.elapsed().as_millis(),
                    err.kind().as_str()
                );
                Err(err)
            }
        }
    }
}
