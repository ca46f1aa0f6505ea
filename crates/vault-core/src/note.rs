use rusqlite::{params, OptionalExtension, Row};

use crate::db::{self, ensure_exists, name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::required;
use crate::tag::{replace_tag_links, tags_by_owner, tags_for, TagLinks};
use crate::types::{NewNote, Note, NotePatch};

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        tags: Vec::new(),
    })
}

impl Vault {
    /// Ordered by title.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, created_at FROM notes ORDER BY title COLLATE NOCASE ASC",
        )?;
        let mut notes = stmt
            .query_map([], note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut tags = tags_by_owner(&self.conn, TagLinks::Note)?;
        for note in &mut notes {
            note.tags = tags.remove(&note.id).unwrap_or_default();
        }
        Ok(notes)
    }

    pub fn get_note(&self, id: i64) -> Result<Note> {
        let mut note = self
            .conn
            .query_row(
                "SELECT id, title, content, created_at FROM notes WHERE id = ?1",
                [id],
                note_from_row,
            )
            .optional()?
            .ok_or_else(|| VaultError::not_found("note", id))?;
        note.tags = tags_for(&self.conn, TagLinks::Note, id)?;
        Ok(note)
    }

    pub fn create_note(&mut self, new: NewNote) -> Result<Note> {
        let title = required("title", &new.title)?.to_string();
        if new.content.trim().is_empty() {
            return Err(VaultError::validation("content is required"));
        }
        if name_taken(&self.conn, "notes", "title", &title, None)? {
            return Err(VaultError::duplicate("note", title));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO notes (title, content, created_at) VALUES (?1, ?2, ?3)",
            params![title, new.content, db::now()],
        )?;
        let id = tx.last_insert_rowid();
        replace_tag_links(&tx, TagLinks::Note, id, &new.tag_ids)?;
        tx.commit()?;

        tracing::info!(id, title = %title, "note created");
        self.get_note(id)
    }

    pub fn update_note(&mut self, id: i64, patch: NotePatch) -> Result<Note> {
        let current = self.get_note(id)?;
        let title = match &patch.title {
            Some(t) => required("title", t)?.to_string(),
            None => current.title,
        };
        let content = match patch.content {
            Some(c) if c.trim().is_empty() => {
                return Err(VaultError::validation("content is required"))
            }
            Some(c) => c,
            None => current.content,
        };
        if name_taken(&self.conn, "notes", "title", &title, Some(id))? {
            return Err(VaultError::duplicate("note", title));
        }
        self.conn.execute(
            "UPDATE notes SET title = ?1, content = ?2 WHERE id = ?3",
            params![title, content, id],
        )?;
        tracing::info!(id, "note updated");
        self.get_note(id)
    }

    pub fn delete_note(&mut self, id: i64) -> Result<()> {
        let n = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        tracing::info!(id, removed = n, "note deleted");
        Ok(())
    }

    pub fn set_note_tags(&mut self, id: i64, tag_ids: &[i64]) -> Result<()> {
        let tx = self.conn.transaction()?;
        ensure_exists(&tx, "notes", "note", id)?;
        replace_tag_links(&tx, TagLinks::Note, id, tag_ids)?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn note(vault: &mut Vault, title: &str, content: &str) -> Note {
        vault
            .create_note(NewNote {
                title: title.into(),
                content: content.into(),
                tag_ids: Vec::new(),
            })
            .unwrap()
    }

    #[test]
    fn create_and_get_with_tags() {
        let mut vault = Vault::open_in_memory().unwrap();
        let tag = vault.create_tag("AD").unwrap();
        let n = vault
            .create_note(NewNote {
                title: "Kerberoasting".into(),
                content: "# Steps\nRequest TGS for {{user}}".into(),
                tag_ids: vec![tag.id],
            })
            .unwrap();
        let got = vault.get_note(n.id).unwrap();
        assert_eq!(got.content, "# Steps\nRequest TGS for {{user}}");
        assert_eq!(got.tags[0].name, "AD");
    }

    #[test]
    fn list_is_ordered_by_title() {
        let mut vault = Vault::open_in_memory().unwrap();
        note(&mut vault, "bravo", "b");
        note(&mut vault, "Alpha", "a");
        note(&mut vault, "Charlie", "c");
        let titles: Vec<String> = vault
            .list_notes()
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "bravo", "Charlie"]);
    }

    #[test]
    fn title_and_content_required() {
        let mut vault = Vault::open_in_memory().unwrap();
        for (title, content) in [("", "body"), ("t", "  ")] {
            let err = vault
                .create_note(NewNote {
                    title: title.into(),
                    content: content.into(),
                    tag_ids: vec![],
                })
                .unwrap_err();
            assert!(matches!(err, VaultError::Validation(_)));
        }
    }

    #[test]
    fn duplicate_title_rejected_on_update() {
        let mut vault = Vault::open_in_memory().unwrap();
        note(&mut vault, "First", "a");
        let second = note(&mut vault, "Second", "b");
        let err = vault
            .update_note(
                second.id,
                NotePatch {
                    title: Some("FIRST".into()),
                    content: Some("changed".into()),
                },
            )
            .unwrap_err();
        assert!(matches!(err, VaultError::DuplicateName { kind: "note", .. }));
        assert_eq!(vault.get_note(second.id).unwrap().content, "b");
    }

    #[test]
    fn update_and_delete() {
        let mut vault = Vault::open_in_memory().unwrap();
        let n = note(&mut vault, "Draft", "x");
        let updated = vault
            .update_note(
                n.id,
                NotePatch {
                    content: Some("y".into()),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.content, "y");
        vault.delete_note(n.id).unwrap();
        vault.delete_note(n.id).unwrap();
        assert!(vault.list_notes().unwrap().is_empty());
    }

    #[test]
    fn set_note_tags_on_missing_note_fails() {
        let mut vault = Vault::open_in_memory().unwrap();
        assert!(matches!(
            vault.set_note_tags(9, &[]).unwrap_err(),
            VaultError::NotFound { kind: "note", .. }
        ));
    }
}
