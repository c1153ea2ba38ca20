//! Repository contract for directory records and its SQLite implementation.
//!
//! # Responsibility
//! - Expose insert/find/list/update/delete/search per record type.
//! - Acquire one connection per call and release it on every exit path.
//!
//! # Invariants
//! - Missing rows are `None` or a zero count, never an error.
//! - Store failures propagate unchanged; nothing is retried or swallowed.

use crate::db::{ConnectionProvider, DbError};
use crate::model::agent::Agent;
use crate::model::client::{Client, ClientDetail};
use crate::model::driver::Driver;
use crate::model::EntityId;
use crate::repo::table::{self, TableEntity};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Data-access error for repository and composite operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A stored row could not be mapped to its record type.
    InvalidData(String),
    /// A detail was offered for a client with a different id.
    DetailIdMismatch {
        client_id: EntityId,
        detail_id: EntityId,
    },
}

/// Coarse failure class, for callers that map errors to user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connection,
    ConstraintViolation,
    Query,
    InvalidData,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Connection => "connection",
            Self::ConstraintViolation => "constraint_violation",
            Self::Query => "query",
            Self::InvalidData => "invalid_data",
        }
    }
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(DbError::Config(_)) => ErrorKind::Configuration,
            Self::Db(DbError::Connection { .. } | DbError::UnsupportedSchemaVersion { .. }) => {
                ErrorKind::Connection
            }
            Self::Db(err) if err.is_constraint_violation() => ErrorKind::ConstraintViolation,
            Self::Db(DbError::Sqlite(_)) => ErrorKind::Query,
            Self::InvalidData(_) => ErrorKind::InvalidData,
            Self::DetailIdMismatch { .. } => ErrorKind::ConstraintViolation,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind() == ErrorKind::ConstraintViolation
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::DetailIdMismatch {
                client_id,
                detail_id,
            } => write!(
                f,
                "client detail id {detail_id} does not match client id {client_id}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::DetailIdMismatch { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract shared by every directory record.
pub trait EntityRepository<E> {
    /// Fails with a constraint violation when `entity.id` already exists.
    fn insert(&self, entity: &E) -> RepoResult<()>;
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<E>>;
    /// All rows ordered by id; empty when the table is empty.
    fn find_all(&self) -> RepoResult<Vec<E>>;
    /// Returns rows changed: 1 when `entity.id` exists, 0 otherwise.
    fn update(&self, entity: &E) -> RepoResult<usize>;
    /// Returns rows removed: 1 when `id` exists, 0 otherwise.
    fn delete_by_id(&self, id: EntityId) -> RepoResult<usize>;
    /// Case-insensitive literal substring match over id and text columns.
    fn search(&self, text: &str) -> RepoResult<Vec<E>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite repository for any [`TableEntity`].
pub struct SqliteRepository<E, P> {
    provider: P,
    _entity: PhantomData<fn() -> E>,
}

pub type ClientRepository<P> = SqliteRepository<Client, P>;
pub type ClientDetailRepository<P> = SqliteRepository<ClientDetail, P>;
pub type AgentRepository<P> = SqliteRepository<Agent, P>;
pub type DriverRepository<P> = SqliteRepository<Driver, P>;

impl<E: TableEntity, P: ConnectionProvider> SqliteRepository<E, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _entity: PhantomData,
        }
    }
}

impl<E: TableEntity, P: ConnectionProvider> EntityRepository<E> for SqliteRepository<E, P> {
    fn insert(&self, entity: &E) -> RepoResult<()> {
        let conn = self.provider.connect()?;
        table::insert_row(&conn, entity)?;
        debug!(
            "event=repo_insert module=repo status=ok table={} id={}",
            E::TABLE,
            entity.id()
        );
        Ok(())
    }

    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<E>> {
        let conn = self.provider.connect()?;
        table::select_by_id(&conn, id)
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        let conn = self.provider.connect()?;
        table::select_all(&conn)
    }

    fn update(&self, entity: &E) -> RepoResult<usize> {
        let conn = self.provider.connect()?;
        let changed = table::update_row(&conn, entity)?;
        debug!(
            "event=repo_update module=repo status=ok table={} id={} changed={changed}",
            E::TABLE,
            entity.id()
        );
        Ok(changed)
    }

    fn delete_by_id(&self, id: EntityId) -> RepoResult<usize> {
        let conn = self.provider.connect()?;
        let removed = table::delete_row::<E>(&conn, id)?;
        debug!(
            "event=repo_delete module=repo status=ok table={} id={id} removed={removed}",
            E::TABLE
        );
        Ok(removed)
    }

    fn search(&self, text: &str) -> RepoResult<Vec<E>> {
        let conn = self.provider.connect()?;
        table::select_matching(&conn, text)
    }

    fn count(&self) -> RepoResult<u64> {
        let conn = self.provider.connect()?;
        table::count_rows::<E>(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, RepoError};
    use crate::db::DbError;
    use crate::settings::ConfigError;

    #[test]
    fn missing_settings_classify_as_configuration() {
        let err = RepoError::from(DbError::Config(ConfigError::MissingKeys(vec!["db.url"])));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("db.url"));
    }

    #[test]
    fn detail_mismatch_classifies_as_constraint_violation() {
        let err = RepoError::DetailIdMismatch {
            client_id: 1,
            detail_id: 2,
        };
        assert!(err.is_constraint_violation());
    }
}
