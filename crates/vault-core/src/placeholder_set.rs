//! Placeholder value sets: named bundles of default values, one per token
//! name, so one command library can be rendered per engagement.

use std::collections::HashMap;

use rusqlite::{params, Connection, Row};

use crate::db::{self, ensure_exists, name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::validate_set_name;
use crate::types::{PlaceholderSet, PlaceholderValue};

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<PlaceholderSet> {
    Ok(PlaceholderSet {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

fn value_from_row(row: &Row<'_>) -> rusqlite::Result<PlaceholderValue> {
    Ok(PlaceholderValue {
        id: row.get("id")?,
        set_id: row.get("set_id")?,
        placeholder_name: row.get("placeholder_name")?,
        default_value: row.get("default_value")?,
        created_at: row.get("created_at")?,
    })
}

fn upsert(conn: &Connection, set_id: i64, placeholder_name: &str, value: &str) -> Result<()> {
    let placeholder_name = placeholder_name.trim();
    if placeholder_name.is_empty() {
        return Err(VaultError::validation("placeholder name is required"));
    }
    conn.execute(
        "INSERT INTO placeholder_values (set_id, placeholder_name, default_value, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(set_id, placeholder_name)
         DO UPDATE SET default_value = excluded.default_value",
        params![set_id, placeholder_name, value, db::now()],
    )?;
    tracing::debug!(set_id, placeholder_name, "placeholder value upserted");
    Ok(())
}

impl Vault {
    pub fn list_placeholder_sets(&self) -> Result<Vec<PlaceholderSet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM placeholder_sets ORDER BY name ASC")?;
        let rows = stmt.query_map([], set_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_placeholder_set(&self, id: i64) -> Result<PlaceholderSet> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM placeholder_sets WHERE id = ?1",
                [id],
                set_from_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    VaultError::not_found("placeholder set", id)
                }
                other => other.into(),
            })
    }

    /// Look a set up by exact name.
    pub fn find_placeholder_set(&self, name: &str) -> Result<Option<PlaceholderSet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM placeholder_sets WHERE name = ?1")?;
        let mut rows = stmt.query_map([name.trim()], set_from_row)?;
        Ok(rows.next().transpose()?)
    }

    pub fn create_placeholder_set(&mut self, name: &str) -> Result<PlaceholderSet> {
        let name = name.trim();
        validate_set_name(name)?;
        if name_taken(&self.conn, "placeholder_sets", "name", name, None)? {
            return Err(VaultError::duplicate("placeholder set", name));
        }
        let now = db::now();
        self.conn.execute(
            "INSERT INTO placeholder_sets (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name, "placeholder set created");
        Ok(PlaceholderSet {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub fn rename_placeholder_set(&mut self, id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        validate_set_name(name)?;
        ensure_exists(&self.conn, "placeholder_sets", "placeholder set", id)?;
        if name_taken(&self.conn, "placeholder_sets", "name", name, Some(id))? {
            return Err(VaultError::duplicate("placeholder set", name));
        }
        self.conn.execute(
            "UPDATE placeholder_sets SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        Ok(())
    }

    /// Deletes the set and, by cascade, all of its values.
    pub fn delete_placeholder_set(&mut self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM placeholder_sets WHERE id = ?1", [id])?;
        tracing::debug!(id, removed = n, "placeholder set deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Values
    // -----------------------------------------------------------------------

    pub fn list_values(&self, set_id: i64) -> Result<Vec<PlaceholderValue>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, set_id, placeholder_name, default_value, created_at
             FROM placeholder_values WHERE set_id = ?1
             ORDER BY placeholder_name ASC",
        )?;
        let rows = stmt.query_map([set_id], value_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Insert or update the value for `(set_id, placeholder_name)` in one
    /// statement. The name is not checked against the registry.
    pub fn upsert_value(&mut self, set_id: i64, placeholder_name: &str, value: &str) -> Result<()> {
        ensure_exists(&self.conn, "placeholder_sets", "placeholder set", set_id)?;
        upsert(&self.conn, set_id, placeholder_name, value)
    }

    /// Upsert several values; either all are written or none.
    pub fn upsert_values(&mut self, set_id: i64, values: &[(String, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        ensure_exists(&tx, "placeholder_sets", "placeholder set", set_id)?;
        for (name, value) in values {
            upsert(&tx, set_id, name, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete_value(&mut self, value_id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM placeholder_values WHERE id = ?1", [value_id])?;
        Ok(())
    }

    /// Remove the value for one name from a set, if present.
    pub fn unset_value(&mut self, set_id: i64, placeholder_name: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM placeholder_values WHERE set_id = ?1 AND placeholder_name = ?2",
            params![set_id, placeholder_name],
        )?;
        Ok(n > 0)
    }

    /// The set as a substitution map.
    pub fn value_map(&self, set_id: i64) -> Result<HashMap<String, String>> {
        Ok(self
            .list_values(set_id)?
            .into_iter()
            .map(|v| (v.placeholder_name, v.default_value))
            .collect())
    }
}
