//! Back-office schema, embedded as ordered SQL steps.
//!
//! - v1 `directory`: `clients`, `agents` and `drivers`, each keyed by a
//!   caller-assigned integer `id`.
//! - v2 `client_details`: one optional row per client sharing the client's
//!   `id`, which is also a foreign key to `clients` (no delete cascade).
//!
//! # Invariants
//! - Step versions increase by one; the applied version is `PRAGMA user_version`.
//! - Pending steps apply in one transaction, or none do.
//! - A file stamped with a version this build does not know is never touched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "directory",
        sql: include_str!("0001_directory.sql"),
    },
    SchemaStep {
        version: 2,
        name: "client_details",
        sql: include_str!("0002_client_details.sql"),
    },
];

/// Returns the newest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the schema on `conn` up to [`latest_version`].
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }
    if stored == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().skip_while(|step| step.version <= stored) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={stored} to_version={latest}");
    Ok(())
}
