//! `SQLite` connection pool for the session store.
//!
//! `r2d2` hands out connections; every new connection gets WAL journaling,
//! a busy timeout, and foreign-key enforcement before first use. Foreign keys
//! are what make a measurement for an unknown session fail at insert time.
//!
//! The pool is the only shared mutable resource in the service. Callers check
//! out a connection, run one short transaction, and drop it; nothing holds a
//! connection across an external call.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};

use crate::errors::Result;

/// Shared pool handle, cloned into every component that touches storage.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// A checked-out connection, returned to the pool on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool sizing and per-connection tuning.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum open connections (default: 16).
    pub pool_size: u32,
    /// How long a writer waits on the database lock, in milliseconds
    /// (default: 30 000).
    pub busy_timeout_ms: u32,
    /// Page cache per connection, in KiB (default: 8192).
    pub cache_size_kib: i64,
    /// How long a checkout waits for a free connection (default: 5 s).
    pub checkout_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
            checkout_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
struct SessionStorePragmas {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl SessionStorePragmas {
    fn sql(&self) -> String {
        format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {};
             PRAGMA cache_size = -{};",
            self.busy_timeout_ms, self.cache_size_kib
        )
    }
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SessionStorePragmas {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&self.sql())
    }
}

fn build(manager: SqliteConnectionManager, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pragmas = SessionStorePragmas {
        busy_timeout_ms: config.busy_timeout_ms,
        cache_size_kib: config.cache_size_kib,
    };
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.checkout_timeout)
        .connection_customizer(Box::new(pragmas))
        .build(manager)?;
    Ok(pool)
}

/// Pool over a private in-memory database.
///
/// Every pooled connection attaches to the same named shared-cache database,
/// so a row written through one handle is visible through the next. The name
/// is unique per call, so two pools never see each other's data.
///
/// Single-writer use only. `journal_mode = WAL` is ignored for memory
/// databases, and shared-cache connections report `SQLITE_LOCKED` on a
/// contended table instead of `SQLITE_BUSY`, which `busy_timeout` never
/// retries. Tests that write from several tasks at once need [`new_file`]
/// on a temporary path.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    let uri = format!("file:vigil_{}?mode=memory&cache=shared", uuid::Uuid::now_v7().simple());
    let manager = SqliteConnectionManager::file(uri).with_flags(
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    );
    build(manager, config)
}

/// Pool over a database file, created if missing.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    build(SqliteConnectionManager::file(path), config)
}

/// Check out a connection and run a trivial query. Used by `/health`.
pub fn ping(pool: &ConnectionPool) -> Result<()> {
    let conn = pool.get()?;
    let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    Ok(())
}
