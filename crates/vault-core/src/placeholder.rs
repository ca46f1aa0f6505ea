//! The placeholder registry: the global list of token names offered when
//! authoring commands.
//!
//! The registry is advisory. Removing or renaming an entry never rewrites
//! command text or placeholder values that mention the old name; those become
//! inert `{{name}}` literals (or orphaned values) but keep working.

use rusqlite::{params, Row};

use crate::db::{self, ensure_exists, name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::validate_placeholder_name;
use crate::types::Placeholder;

fn placeholder_from_row(row: &Row<'_>) -> rusqlite::Result<Placeholder> {
    Ok(Placeholder {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

impl Vault {
    pub fn list_placeholders(&self) -> Result<Vec<Placeholder>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM placeholders ORDER BY name ASC")?;
        let rows = stmt.query_map([], placeholder_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_placeholder(&mut self, name: &str) -> Result<Placeholder> {
        let name = name.trim();
        validate_placeholder_name(name)?;
        if name_taken(&self.conn, "placeholders", "name", name, None)? {
            return Err(VaultError::duplicate("placeholder", name));
        }
        let now = db::now();
        self.conn.execute(
            "INSERT INTO placeholders (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name, "placeholder created");
        Ok(Placeholder {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub fn rename_placeholder(&mut self, id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        validate_placeholder_name(name)?;
        ensure_exists(&self.conn, "placeholders", "placeholder", id)?;
        if name_taken(&self.conn, "placeholders", "name", name, Some(id))? {
            return Err(VaultError::duplicate("placeholder", name));
        }
        self.conn.execute(
            "UPDATE placeholders SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        tracing::debug!(id, name, "placeholder renamed");
        Ok(())
    }

    /// Unconditional; deleting a missing id is a no-op.
    pub fn delete_placeholder(&mut self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM placeholders WHERE id = ?1", [id])?;
        tracing::debug!(id, removed = n, "placeholder deleted");
        Ok(())
    }

    /// Registry names starting with `prefix`, for token completion.
    pub fn placeholder_candidates(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .list_placeholders()?
            .into_iter()
            .map(|p| p.name)
            .filter(|n| n.starts_with(prefix))
            .collect())
    }
}
