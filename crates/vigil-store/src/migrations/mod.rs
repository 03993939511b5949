//! Schema versioning for the session store.
//!
//! Each version's SQL is compiled in with [`include_str!`] and applied in
//! its own transaction together with its `schema_version` row, so a failed
//! step leaves the previous version intact. Re-running is a no-op.

use rusqlite::Connection;
use tracing::info;

use crate::errors::{Result, StoreError};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Sessions, measurements, diagnoses",
    sql: include_str!("v001_schema.sql"),
}];

fn migration_error(context: impl std::fmt::Display, e: &rusqlite::Error) -> StoreError {
    StoreError::Migration {
        message: format!("{context}: {e}"),
    }
}

/// Apply every version newer than the database's. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| migration_error("cannot create schema_version", &e))?;

    let current = current_version(conn)?;
    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(version = migration.version, description = migration.description, "upgrading schema");
        apply(conn, migration)?;
        applied += 1;
    }
    Ok(applied)
}

/// Highest applied version, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_error("cannot read schema_version", &e))
}

/// Newest version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let label = format!("v{} ({})", migration.version, migration.description);
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| migration_error(&label, &e))?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(&label, &e))?;
    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES (?1, datetime('now'), ?2)",
            rusqlite::params![migration.version, migration.description],
        )
        .map_err(|e| migration_error(&label, &e))?;
    tx.commit().map_err(|e| migration_error(&label, &e))
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;

    fn open_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    fn names(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .collect()
    }

    #[test]
    fn creates_all_tables() {
        let conn = open_memory();
        assert_eq!(run_migrations(&conn).unwrap(), 1);

        let tables = names(&conn, "table");
        for table in ["sessions", "measurements", "diagnoses", "schema_version"] {
            assert!(tables.contains(&table.to_string()), "missing table: {table}");
        }
    }

    #[test]
    fn creates_guard_triggers() {
        let conn = open_memory();
        run_migrations(&conn).unwrap();
        let triggers = names(&conn, "trigger");
        for trigger in ["sessions_close_once", "sessions_no_delete", "measurements_immutable"] {
            assert!(triggers.contains(&trigger.to_string()), "missing trigger: {trigger}");
        }
    }

    #[test]
    fn is_idempotent() {
        let conn = open_memory();
        assert_eq!(run_migrations(&conn).unwrap(), 1);
        assert_eq!(run_migrations(&conn).unwrap(), 0);
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn current_version_without_table_is_an_error() {
        let conn = open_memory();
        assert!(matches!(current_version(&conn), Err(StoreError::Migration { .. })));
    }

    #[test]
    fn schema_version_records_description() {
        let conn = open_memory();
        run_migrations(&conn).unwrap();
        let desc: String = conn
            .query_row(
                "SELECT description FROM schema_version WHERE version = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(desc.contains("Sessions"));
    }
}
