//! The vault store: one SQLite connection owned by a single writer.
//!
//! Domain operations are implemented on [`Vault`] across the sibling modules
//! (`placeholder`, `placeholder_set`, `command`, `steps`, `note`, `tag`,
//! `auth`). Every multi-statement mutation runs inside one
//! [`rusqlite::Transaction`]; dropping it on an error path rolls back.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::migrations;

pub struct Vault {
    pub(crate) conn: Connection,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Vault {
    /// Open or create the database at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::configure(conn)
    }

    /// Open the vault configured under `root`. Fails with `NotInitialized`
    /// when `root` has no config.
    pub fn open_root(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Self::open(&config.database_path(root))
    }

    /// A private in-memory vault, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(5000))?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

// ---------------------------------------------------------------------------
// Shared row helpers
// ---------------------------------------------------------------------------

/// Case-insensitive uniqueness probe on `table.column`, optionally ignoring
/// the row being renamed. `table` and `column` are crate-internal constants.
pub(crate) fn name_taken(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let sql = format!(
        "SELECT id FROM {table} WHERE LOWER({column}) = LOWER(?1) AND id != ?2 LIMIT 1"
    );
    let found: Option<i64> = conn
        .query_row(&sql, params![value, exclude_id.unwrap_or(-1)], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Fail with `NotFound` unless `table` has a row with `id`.
pub(crate) fn ensure_exists(
    conn: &Connection,
    table: &str,
    kind: &'static str,
    id: i64,
) -> Result<()> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    let found: Option<i64> = conn.query_row(&sql, [id], |row| row.get(0)).optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(VaultError::not_found(kind, id)),
    }
}
