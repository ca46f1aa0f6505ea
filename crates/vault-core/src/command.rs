use rusqlite::{params, OptionalExtension, Row};

use crate::db::{self, ensure_exists, name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::required;
use crate::steps;
use crate::tag::{replace_tag_links, tags_by_owner, tags_for, TagLinks};
use crate::types::{Command, CommandBody, CommandPatch, Mode, NewCommand, Step};

const COMMAND_COLUMNS: &str = "id, name, command, description, is_multi_step, created_at";

fn command_from_row(row: &Row<'_>) -> rusqlite::Result<Command> {
    Ok(Command {
        id: row.get("id")?,
        name: row.get("name")?,
        command: row.get("command")?,
        description: row.get("description")?,
        is_multi_step: row.get("is_multi_step")?,
        created_at: row.get("created_at")?,
        tags: Vec::new(),
    })
}

/// Reject a body with nothing to run.
fn validate_body(body: &CommandBody) -> Result<()> {
    match body {
        CommandBody::Flat { command } => {
            required("command", command)?;
        }
        CommandBody::Stepped { steps } => steps::validate_steps(steps)?,
    }
    Ok(())
}

impl Vault {
    /// All commands ordered by name, each with its tags.
    pub fn list_commands(&self) -> Result<Vec<Command>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMAND_COLUMNS} FROM commands ORDER BY name COLLATE NOCASE ASC"
        ))?;
        let mut commands = stmt
            .query_map([], command_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut tags = tags_by_owner(&self.conn, TagLinks::Command)?;
        for cmd in &mut commands {
            cmd.tags = tags.remove(&cmd.id).unwrap_or_default();
        }
        Ok(commands)
    }

    pub fn get_command(&self, id: i64) -> Result<Command> {
        let mut cmd = self
            .conn
            .query_row(
                &format!("SELECT {COMMAND_COLUMNS} FROM commands WHERE id = ?1"),
                [id],
                command_from_row,
            )
            .optional()?
            .ok_or_else(|| VaultError::not_found("command", id))?;
        cmd.tags = tags_for(&self.conn, TagLinks::Command, id)?;
        Ok(cmd)
    }

    /// Create a command with its steps (when stepped) and tags in one
    /// transaction.
    pub fn create_command(&mut self, new: NewCommand) -> Result<Command> {
        let name = required("name", &new.name)?.to_string();
        let description = required("description", &new.description)?.to_string();
        validate_body(&new.body)?;
        if name_taken(&self.conn, "commands", "name", &name, None)? {
            return Err(VaultError::duplicate("command", name));
        }

        let flat = new.body.flattened();
        let is_multi_step = new.body.mode() == Mode::Stepped;
        let now = db::now();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO commands (name, command, description, is_multi_step, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, flat, description, is_multi_step, now],
        )?;
        let id = tx.last_insert_rowid();
        if let CommandBody::Stepped { steps } = &new.body {
            steps::insert_steps(&tx, id, steps)?;
        }
        replace_tag_links(&tx, TagLinks::Command, id, &new.tag_ids)?;
        tx.commit()?;

        tracing::info!(id, name = %name, mode = %new.body.mode(), "command created");
        self.get_command(id)
    }

    /// Apply a partial update. Every check runs before the first write, and
    /// all writes share one transaction.
    ///
    /// - `steps: Some(..)` saves the list and marks the command stepped.
    /// - `is_multi_step: Some(false)` without steps converts to flat; the
    ///   text is `command` if given, else the join of the existing steps.
    /// - `is_multi_step: Some(true)` without steps converts to stepped from
    ///   the (possibly new) flat text.
    pub fn update_command(&mut self, id: i64, patch: CommandPatch) -> Result<Command> {
        let current = self.get_command(id)?;

        let name = match &patch.name {
            Some(n) => required("name", n)?.to_string(),
            None => current.name.clone(),
        };
        let description = match &patch.description {
            Some(d) => required("description", d)?.to_string(),
            None => current.description.clone(),
        };
        if patch.name.is_some() && name_taken(&self.conn, "commands", "name", &name, Some(id))? {
            return Err(VaultError::duplicate("command", name));
        }

        // Decide the resulting body before touching the store.
        let body: Option<CommandBody> = match (&patch.steps, patch.is_multi_step) {
            (Some(steps), _) => Some(CommandBody::Stepped {
                steps: steps.clone(),
            }),
            (None, Some(false)) => {
                let command = match &patch.command {
                    Some(c) => c.clone(),
                    None if current.is_multi_step => {
                        let existing = steps::read_steps(&self.conn, id)?;
                        let list: Vec<Step> = existing.iter().map(Step::from).collect();
                        if list.is_empty() {
                            current.command.clone()
                        } else {
                            steps::flatten(&list)
                        }
                    }
                    None => current.command.clone(),
                };
                Some(CommandBody::Flat { command })
            }
            (None, Some(true)) => {
                let source = patch.command.as_deref().unwrap_or(&current.command);
                if current.is_multi_step && patch.command.is_none() {
                    None
                } else {
                    Some(CommandBody::Stepped {
                        steps: steps::to_stepped(source),
                    })
                }
            }
            (None, None) => patch.command.as_ref().map(|c| {
                if current.is_multi_step {
                    CommandBody::Stepped {
                        steps: steps::split_flat(c),
                    }
                } else {
                    CommandBody::Flat { command: c.clone() }
                }
            }),
        };
        if let Some(body) = &body {
            validate_body(body)?;
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE commands SET name = ?1, description = ?2 WHERE id = ?3",
            params![name, description, id],
        )?;
        match &body {
            Some(CommandBody::Flat { command }) => {
                tx.execute(
                    "UPDATE commands SET command = ?1, is_multi_step = 0 WHERE id = ?2",
                    params![command, id],
                )?;
                tx.execute("DELETE FROM command_steps WHERE command_id = ?1", [id])?;
            }
            Some(CommandBody::Stepped { steps: list }) => {
                tx.execute(
                    "UPDATE commands SET command = ?1, is_multi_step = 1 WHERE id = ?2",
                    params![steps::flatten(list), id],
                )?;
                tx.execute("DELETE FROM command_steps WHERE command_id = ?1", [id])?;
                steps::insert_steps(&tx, id, list)?;
            }
            None => {}
        }
        tx.commit()?;

        tracing::info!(id, name = %name, "command updated");
        self.get_command(id)
    }

    /// Deleting a missing id is a no-op. Steps and tag links cascade.
    pub fn delete_command(&mut self, id: i64) -> Result<()> {
        let n = self.conn.execute("DELETE FROM commands WHERE id = ?1", [id])?;
        tracing::info!(id, removed = n, "command deleted");
        Ok(())
    }

    /// Replace the command's tag set.
    pub fn set_command_tags(&mut self, id: i64, tag_ids: &[i64]) -> Result<()> {
        let tx = self.conn.transaction()?;
        ensure_exists(&tx, "commands", "command", id)?;
        replace_tag_links(&tx, TagLinks::Command, id, tag_ids)?;
        tx.commit()?;
        Ok(())
    }

    /// Switch mode with the standard conversion. Switching to the current
    /// mode changes nothing.
    pub fn set_mode(&mut self, id: i64, mode: Mode) -> Result<Command> {
        let current = self.get_command(id)?;
        if current.mode() == mode {
            return Ok(current);
        }
        self.update_command(
            id,
            CommandPatch {
                is_multi_step: Some(mode == Mode::Stepped),
                ..CommandPatch::default()
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
