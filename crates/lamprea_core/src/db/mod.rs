//! SQLite storage bootstrap and per-operation connection acquisition.
//!
//! # Responsibility
//! - Open and configure SQLite connections (pragmas, search function, schema).
//! - Hand out one fresh connection per repository or composite operation.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Connections are never pooled or shared between operations.

use crate::settings::{ConfigError, DbConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{contains_folded, open_db, open_db_in_memory, TEXT_CONTAINS_FN};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Connection settings are incomplete.
    Config(ConfigError),
    /// The database at `target` could not be opened.
    Connection {
        target: String,
        source: rusqlite::Error,
    },
    /// Query, statement or constraint failure on an open connection.
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Returns whether the store rejected a write on a key or foreign-key constraint.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(err) => matches!(
                err.sqlite_error_code(),
                Some(rusqlite::ErrorCode::ConstraintViolation)
            ),
            _ => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Connection { target, source } => {
                write!(f, "cannot open database `{target}`: {source}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Connection { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ConfigError> for DbError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Source of ready-to-use connections.
///
/// Each call returns a new connection owned by the caller; dropping it
/// releases it.
pub trait ConnectionProvider {
    fn connect(&self) -> DbResult<rusqlite::Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn connect(&self) -> DbResult<rusqlite::Connection> {
        (**self).connect()
    }
}

/// Opens the configured SQLite database file on every call.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    config: DbConfig,
}

impl SqliteConnectionProvider {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    /// Builds a provider from optional settings values, failing before any
    /// connection attempt when a key is missing.
    pub fn from_parts(
        url: Option<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> DbResult<Self> {
        Ok(Self::new(DbConfig::from_parts(url, user, password)?))
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn connect(&self) -> DbResult<rusqlite::Connection> {
        log::debug!(
            "event=db_connect module=db status=start user={}",
            self.config.user
        );
        open_db(self.config.database_path())
    }
}
