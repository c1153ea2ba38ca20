//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a 5 s busy timeout.
//! - Returned connections expose the `text_contains` search function.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// SQL name of the case-insensitive substring predicate used by entity search.
pub const TEXT_CONTAINS_FN: &str = "text_contains";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the database file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let target = path.as_ref().display().to_string();
    open_with("file", &target, || Connection::open(path.as_ref()))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", ":memory:", Connection::open_in_memory)
}

/// Case-insensitive substring test shared by SQL search and in-memory filtering.
///
/// An empty needle matches every haystack.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn open_with(
    mode: &str,
    target: &str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = opener().map_err(|source| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={source}",
            started_at.elapsed().as_millis()
        );
        DbError::Connection {
            target: target.to_string(),
            source,
        }
    })?;

    if let Err(err) = bootstrap_connection(&mut conn) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.create_scalar_function(
        TEXT_CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<Option<String>>(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_folded(&haystack, &needle),
                _ => false,
            })
        },
    )?;
    apply_migrations(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{contains_folded, open_db_in_memory};

    #[test]
    fn contains_folded_ignores_case_beyond_ascii() {
        assert!(contains_folded("Ángela Núñez", "ÁNGELA"));
        assert!(contains_folded("Ana", "nA"));
        assert!(!contains_folded("Ana", "Bea"));
    }

    #[test]
    fn empty_needle_matches_everything() {
        assert!(contains_folded("", ""));
        assert!(contains_folded("anything", ""));
    }

    #[test]
    fn search_function_is_registered_on_open() {
        let conn = open_db_in_memory().unwrap();
        let hit: bool = conn
            .query_row("SELECT text_contains('Calle Mayor', 'MAYOR');", [], |row| {
                row.get(0)
            })
            .unwrap();
        let null_hit: bool = conn
            .query_row("SELECT text_contains(NULL, 'x');", [], |row| row.get(0))
            .unwrap();
        assert!(hit);
        assert!(!null_hit);
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = open_db_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
