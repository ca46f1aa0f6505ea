use std::collections::HashMap;

use rusqlite::{params, Connection, Row, Transaction};

use crate::db::{self, ensure_exists, name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::required;
use crate::types::Tag;

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

impl Vault {
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM tags ORDER BY name ASC")?;
        let rows = stmt.query_map([], tag_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_tag(&mut self, name: &str) -> Result<Tag> {
        let name = required("tag name", name)?;
        if name_taken(&self.conn, "tags", "name", name, None)? {
            return Err(VaultError::duplicate("tag", name));
        }
        let now = db::now();
        self.conn.execute(
            "INSERT INTO tags (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name, "tag created");
        Ok(Tag {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub fn rename_tag(&mut self, id: i64, name: &str) -> Result<()> {
        let name = required("tag name", name)?;
        ensure_exists(&self.conn, "tags", "tag", id)?;
        if name_taken(&self.conn, "tags", "name", name, Some(id))? {
            return Err(VaultError::duplicate("tag", name));
        }
        self.conn
            .execute("UPDATE tags SET name = ?1 WHERE id = ?2", params![name, id])?;
        tracing::debug!(id, name, "tag renamed");
        Ok(())
    }

    /// Deleting a tag unlinks it from every command and note.
    pub fn delete_tag(&mut self, id: i64) -> Result<()> {
        let n = self.conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        tracing::debug!(id, removed = n, "tag deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tag links (command_tags / note_tags)
// ---------------------------------------------------------------------------

/// Which link table a replace-all targets.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TagLinks {
    Command,
    Note,
}

impl TagLinks {
    fn table(self) -> &'static str {
        match self {
            TagLinks::Command => "command_tags",
            TagLinks::Note => "note_tags",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            TagLinks::Command => "command_id",
            TagLinks::Note => "note_id",
        }
    }
}

/// Replace every tag link of `owner_id` with `tag_ids`, inside the caller's
/// transaction. Duplicate ids are collapsed; unknown tag ids fail with
/// `NotFound` before anything is written.
pub(crate) fn replace_tag_links(
    tx: &Transaction<'_>,
    links: TagLinks,
    owner_id: i64,
    tag_ids: &[i64],
) -> Result<()> {
    let mut unique: Vec<i64> = Vec::with_capacity(tag_ids.len());
    for &tag_id in tag_ids {
        if !unique.contains(&tag_id) {
            ensure_exists(tx, "tags", "tag", tag_id)?;
            unique.push(tag_id);
        }
    }

    tx.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1",
            links.table(),
            links.owner_column()
        ),
        [owner_id],
    )?;

    let now = db::now();
    let mut insert = tx.prepare(&format!(
        "INSERT INTO {} ({}, tag_id, created_at) VALUES (?1, ?2, ?3)",
        links.table(),
        links.owner_column()
    ))?;
    for tag_id in unique {
        insert.execute(params![owner_id, tag_id, now])?;
    }
    Ok(())
}

/// All tags grouped by owner id, each list ordered by tag name.
pub(crate) fn tags_by_owner(conn: &Connection, links: TagLinks) -> Result<HashMap<i64, Vec<Tag>>> {
    let sql = format!(
        "SELECT l.{owner} AS owner_id, t.id, t.name, t.created_at
         FROM {table} l JOIN tags t ON t.id = l.tag_id
         ORDER BY t.name ASC",
        owner = links.owner_column(),
        table = links.table(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>("owner_id")?, tag_from_row(row)?)))?;

    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in rows {
        let (owner, tag) = row?;
        map.entry(owner).or_default().push(tag);
    }
    Ok(map)
}

pub(crate) fn tags_for(conn: &Connection, links: TagLinks, owner_id: i64) -> Result<Vec<Tag>> {
    let sql = format!(
        "SELECT t.id, t.name, t.created_at
         FROM {table} l JOIN tags t ON t.id = l.tag_id
         WHERE l.{owner} = ?1
         ORDER BY t.name ASC",
        owner = links.owner_column(),
        table = links.table(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([owner_id], tag_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_and_lists_by_name() {
        let mut vault = Vault::open_in_memory().unwrap();
        vault.create_tag("  Exploitation ").unwrap();
        vault.create_tag("Enumeration").unwrap();
        let names: Vec<String> = vault.list_tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Enumeration", "Exploitation"]);
    }

    #[test]
    fn duplicate_tag_differing_in_case_is_rejected() {
        let mut vault = Vault::open_in_memory().unwrap();
        vault.create_tag("Recon").unwrap();
        let err = vault.create_tag("recon").unwrap_err();
        assert!(matches!(err, VaultError::DuplicateName { .. }));
    }

    #[test]
    fn blank_tag_is_invalid() {
        let mut vault = Vault::open_in_memory().unwrap();
        assert!(matches!(
            vault.create_tag("   ").unwrap_err(),
            VaultError::Validation(_)
        ));
    }

    #[test]
    fn rename_to_own_name_with_new_case_is_allowed() {
        let mut vault = Vault::open_in_memory().unwrap();
        let tag = vault.create_tag("recon").unwrap();
        vault.rename_tag(tag.id, "Recon").unwrap();
        assert_eq!(vault.list_tags().unwrap()[0].name, "Recon");
    }

    #[test]
    fn rename_missing_tag_is_not_found() {
        let mut vault = Vault::open_in_memory().unwrap();
        assert!(matches!(
            vault.rename_tag(42, "x").unwrap_err(),
            VaultError::NotFound { .. }
        ));
    }

    #[test]
    fn deleting_tag_unlinks_commands() {
        let mut vault = Vault::open_in_memory().unwrap();
        let tag = vault.create_tag("Recon").unwrap();
        let cmd = crate::command::tests::flat(&mut vault, "Ping", "ping {{ip}}");
        vault.set_command_tags(cmd.id, &[tag.id]).unwrap();
        vault.delete_tag(tag.id).unwrap();
        assert!(vault.get_command(cmd.id).unwrap().tags.is_empty());
    }
}
