//! Connection-scoped table operations shared by every directory record.
//!
//! # Responsibility
//! - Describe a table once ([`TableEntity`]) and derive all SQL from it.
//! - Run single statements against any `&Connection`, including an open
//!   transaction, so composite operations can reuse them.
//!
//! # Invariants
//! - Every value is bound as a parameter; only static table metadata is
//!   interpolated into SQL text.
//! - The key column is always named `id` and is never part of an UPDATE SET.
//! - Multi-row reads are ordered by `id ASC`.

use crate::db::TEXT_CONTAINS_FN;
use crate::model::EntityId;
use crate::repo::entity_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::iter;

/// Table metadata and row mapping for one record type.
pub trait TableEntity: Sized {
    /// Table holding the rows.
    const TABLE: &'static str;
    /// Non-key columns in declaration order.
    const COLUMNS: &'static [&'static str];
    /// Text columns matched by search, in addition to `id`.
    const SEARCH_COLUMNS: &'static [&'static str];

    fn id(&self) -> EntityId;

    /// Values for [`Self::COLUMNS`], same order.
    fn column_values(&self) -> Vec<Value>;

    /// Maps one row selected with `id` followed by [`Self::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Current values of [`Self::SEARCH_COLUMNS`], skipping unset ones.
    fn search_fields(&self) -> Vec<&str>;
}

pub fn insert_row<E: TableEntity>(conn: &Connection, entity: &E) -> RepoResult<()> {
    let placeholders = (1..=E::COLUMNS.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (id, {}) VALUES ({placeholders});",
        E::TABLE,
        E::COLUMNS.join(", ")
    );

    let values = iter::once(Value::Integer(entity.id())).chain(entity.column_values());
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

pub fn select_by_id<E: TableEntity>(conn: &Connection, id: EntityId) -> RepoResult<Option<E>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?1;", select_sql::<E>()))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(read_row(row)?)),
        None => Ok(None),
    }
}

pub fn select_all<E: TableEntity>(conn: &Connection) -> RepoResult<Vec<E>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC;", select_sql::<E>()))?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(read_row(row)?);
    }
    Ok(items)
}

/// Rewrites every non-key column of the row keyed by `entity.id()`.
///
/// Returns the number of rows changed (0 when the id does not exist).
pub fn update_row<E: TableEntity>(conn: &Connection, entity: &E) -> RepoResult<usize> {
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{};",
        E::TABLE,
        E::COLUMNS.len() + 1
    );

    let values = entity
        .column_values()
        .into_iter()
        .chain(iter::once(Value::Integer(entity.id())));
    Ok(conn.execute(&sql, params_from_iter(values))?)
}

pub fn delete_row<E: TableEntity>(conn: &Connection, id: EntityId) -> RepoResult<usize> {
    let sql = format!("DELETE FROM {} WHERE id = ?1;", E::TABLE);
    Ok(conn.execute(&sql, [id])?)
}

/// Rows whose id (as text) or any search column contains `text`, ignoring case.
///
/// `text` is matched literally; an empty string matches every row.
pub fn select_matching<E: TableEntity>(conn: &Connection, text: &str) -> RepoResult<Vec<E>> {
    let predicate = iter::once("CAST(id AS TEXT)")
        .chain(E::SEARCH_COLUMNS.iter().copied())
        .map(|column| format!("{TEXT_CONTAINS_FN}({column}, ?1)"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let sql = format!("{} WHERE {predicate} ORDER BY id ASC;", select_sql::<E>());

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([text])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(read_row(row)?);
    }
    Ok(items)
}

pub fn count_rows<E: TableEntity>(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {};", E::TABLE), [], |row| {
        row.get(0)
    })?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count {count} in {}", E::TABLE)))
}

fn select_sql<E: TableEntity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn read_row<E: TableEntity>(row: &Row<'_>) -> RepoResult<E> {
    E::from_row(row).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            RepoError::InvalidData(format!("{}: {err}", E::TABLE))
        }
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        count_rows, delete_row, insert_row, select_all, select_by_id, select_matching, update_row,
    };
    use crate::db::open_db_in_memory;
    use crate::model::driver::Driver;
    use crate::repo::entity_repo::RepoError;

    #[test]
    fn table_functions_cover_one_row_lifecycle() {
        let conn = open_db_in_memory().unwrap();
        let driver = Driver::new(7, "Luis", "600111222", "1234-BCD");

        insert_row(&conn, &driver).unwrap();
        assert_eq!(count_rows::<Driver>(&conn).unwrap(), 1);
        assert_eq!(select_by_id::<Driver>(&conn, 7).unwrap(), Some(driver.clone()));

        let moved = Driver::new(7, "Luis", "600999888", "9999-XYZ");
        assert_eq!(update_row(&conn, &moved).unwrap(), 1);
        assert_eq!(select_all::<Driver>(&conn).unwrap(), vec![moved]);

        assert_eq!(delete_row::<Driver>(&conn, 7).unwrap(), 1);
        assert!(select_by_id::<Driver>(&conn, 7).unwrap().is_none());
    }

    #[test]
    fn search_matches_the_id_as_text() {
        let conn = open_db_in_memory().unwrap();
        insert_row(&conn, &Driver::new(415, "Marta", "611", "0000-AAA")).unwrap();
        insert_row(&conn, &Driver::new(9, "Pablo", "622", "1111-BBB")).unwrap();

        let hits = select_matching::<Driver>(&conn, "41").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 415);
    }

    #[test]
    fn mistyped_column_is_reported_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO drivers (id, name, phone, license_plate) VALUES (1, 'Eva', X'00FF', 'P');",
            [],
        )
        .unwrap();

        let err = select_by_id::<Driver>(&conn, 1).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.starts_with("drivers")));
    }
}
