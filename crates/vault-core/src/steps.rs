//! Conversion between the flat command string and the ordered step list,
//! plus persistence of the step list.
//!
//! A stepped command keeps two representations: the `command_steps` rows are
//! authoritative and `commands.command` holds their newline join for
//! single-string display. [`Vault::save_steps`] writes both in one
//! transaction. [`Vault::load_steps`] tolerates missing or unreadable rows by
//! deriving steps from the flat string.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::{self, ensure_exists, Vault};
use crate::error::{Result, VaultError};
use crate::types::{Command, CommandStep, Step};

// ---------------------------------------------------------------------------
// Pure conversions
// ---------------------------------------------------------------------------

/// Split flat text into steps: one per non-blank line, trimmed, numbered from
/// 1 with empty comments.
pub fn split_flat(command: &str) -> Vec<Step> {
    let mut steps: Vec<Step> = command
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Step::new(line, ""))
        .collect();
    renumber(&mut steps);
    steps
}

/// flat -> stepped. Never returns an empty list: an editor always gets at
/// least one (empty) step to type into.
pub fn to_stepped(command: &str) -> Vec<Step> {
    let mut steps = split_flat(command);
    if steps.is_empty() {
        steps.push(Step {
            step_number: Some(1),
            ..Step::default()
        });
    }
    steps
}

/// stepped -> flat: the newline join of each step's command, in list order.
pub fn flatten(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| s.command.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A step list needs at least one non-blank step.
pub(crate) fn validate_steps(steps: &[Step]) -> Result<()> {
    if steps.iter().all(|s| s.command.trim().is_empty()) {
        return Err(VaultError::validation("at least one step is required"));
    }
    Ok(())
}

/// Assign contiguous 1-based numbers by position, discarding whatever the
/// caller supplied.
pub fn renumber(steps: &mut [Step]) {
    for (i, step) in steps.iter_mut().enumerate() {
        step.step_number = Some(i as u32 + 1);
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Where a loaded step list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StepSource {
    /// Read from `command_steps`.
    Persisted,
    /// No rows exist; derived from the flat command. Not saved.
    Derived,
    /// Reading rows failed; derived from the flat command. Carries the error.
    Recovered(String),
    /// The command does not exist (or was deleted). The list is empty.
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedSteps {
    pub steps: Vec<Step>,
    pub source: StepSource,
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<CommandStep> {
    Ok(CommandStep {
        id: row.get("id")?,
        command_id: row.get("command_id")?,
        step_number: row.get("step_number")?,
        command: row.get("command")?,
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn read_steps(conn: &Connection, command_id: i64) -> Result<Vec<CommandStep>> {
    let mut stmt = conn.prepare(
        "SELECT id, command_id, step_number, command, comment, created_at
         FROM command_steps WHERE command_id = ?1
         ORDER BY step_number ASC",
    )?;
    let rows = stmt.query_map([command_id], step_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Resolve the editable step list for `command` from the outcome of reading
/// its rows. Never fails.
pub(crate) fn resolve_steps(command: &Command, rows: Result<Vec<CommandStep>>) -> LoadedSteps {
    match rows {
        Ok(rows) if !rows.is_empty() => LoadedSteps {
            steps: rows.iter().map(Step::from).collect(),
            source: StepSource::Persisted,
        },
        Ok(_) => LoadedSteps {
            steps: split_flat(&command.command),
            source: StepSource::Derived,
        },
        Err(e) => {
            tracing::warn!(
                command_id = command.id,
                error = %e,
                "failed to read steps, deriving from command text"
            );
            LoadedSteps {
                steps: split_flat(&command.command),
                source: StepSource::Recovered(e.to_string()),
            }
        }
    }
}

/// Insert `steps` for `command_id`, numbered by position. The caller owns the
/// transaction and has already cleared the old rows.
pub(crate) fn insert_steps(conn: &Connection, command_id: i64, steps: &[Step]) -> Result<()> {
    let now = db::now();
    let mut insert = conn.prepare(
        "INSERT INTO command_steps (command_id, step_number, command, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (i, step) in steps.iter().enumerate() {
        insert.execute(params![
            command_id,
            i as u32 + 1,
            step.command,
            step.comment,
            now
        ])?;
    }
    Ok(())
}

impl Vault {
    /// Persisted step rows only, ordered by `step_number`. Empty for flat or
    /// deleted commands.
    pub fn command_steps(&self, command_id: i64) -> Result<Vec<CommandStep>> {
        read_steps(&self.conn, command_id)
    }

    /// The editable step list for a command. A missing command yields an
    /// empty list; problems reading step rows fall back to the derived list.
    pub fn load_steps(&self, command_id: i64) -> Result<LoadedSteps> {
        let command = match self.get_command(command_id) {
            Ok(command) => command,
            Err(VaultError::NotFound { .. }) => {
                return Ok(LoadedSteps {
                    steps: Vec::new(),
                    source: StepSource::Missing,
                })
            }
            Err(e) => return Err(e),
        };
        Ok(resolve_steps(&command, read_steps(&self.conn, command_id)))
    }

    /// Replace the step list and the flattened command text together, and
    /// mark the command stepped. An empty or all-blank list is rejected
    /// before anything is written.
    pub fn save_steps(&mut self, command_id: i64, steps: &[Step]) -> Result<()> {
        validate_steps(steps)?;
        let flat = flatten(steps);
        let tx = self.conn.transaction()?;
        ensure_exists(&tx, "commands", "command", command_id)?;
        tx.execute(
            "UPDATE commands SET command = ?1, is_multi_step = 1 WHERE id = ?2",
            params![flat, command_id],
        )?;
        tx.execute("DELETE FROM command_steps WHERE command_id = ?1", [command_id])?;
        insert_steps(&tx, command_id, steps)?;
        tx.commit()?;
        tracing::debug!(command_id, count = steps.len(), "steps saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::flat;

    fn commands(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(|s| s.command.as_str()).collect()
    }

    #[test]
    fn split_drops_blank_lines_and_numbers_from_one() {
        let steps = split_flat("nmap -sS x\n\n  \n  whoami  \nid");
        assert_eq!(commands(&steps), vec!["nmap -sS x", "whoami", "id"]);
        let numbers: Vec<_> = steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
        assert!(steps.iter().all(|s| s.comment.is_empty()));
    }

    #[test]
    fn flat_stepped_flat_round_trip() {
        assert_eq!(flatten(&to_stepped("a\nb\nc")), "a\nb\nc");
    }

    #[test]
    fn to_stepped_seeds_one_empty_step() {
        let steps = to_stepped("\n \n");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].command, "");
        assert_eq!(steps[0].step_number, Some(1));
    }

    #[test]
    fn flatten_of_nothing_is_empty() {
        assert_eq!(flatten(&[]), "");
    }

    #[test]
    fn save_renumbers_by_position() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "x");
        let input = vec![
            Step { step_number: Some(3), command: "x".into(), comment: String::new() },
            Step { step_number: Some(1), command: "y".into(), comment: String::new() },
            Step { step_number: Some(2), command: "z".into(), comment: String::new() },
        ];
        vault.save_steps(cmd.id, &input).unwrap();

        let stored = vault.command_steps(cmd.id).unwrap();
        let pairs: Vec<(u32, &str)> = stored
            .iter()
            .map(|s| (s.step_number, s.command.as_str()))
            .collect();
        assert_eq!(pairs, vec![(1, "x"), (2, "y"), (3, "z")]);

        let reloaded = vault.get_command(cmd.id).unwrap();
        assert!(reloaded.is_multi_step);
        assert_eq!(reloaded.command, "x\ny\nz");
    }

    #[test]
    fn save_replaces_previous_steps_and_keeps_comments() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "x");
        vault
            .save_steps(cmd.id, &[Step::new("a", ""), Step::new("b", ""), Step::new("c", "")])
            .unwrap();
        vault
            .save_steps(cmd.id, &[Step::new("whoami", "who am i")])
            .unwrap();
        let stored = vault.command_steps(cmd.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].comment, "who am i");
        assert_eq!(vault.get_command(cmd.id).unwrap().command, "whoami");
    }

    #[test]
    fn save_on_missing_command_writes_nothing() {
        let mut vault = Vault::open_in_memory().unwrap();
        let err = vault.save_steps(404, &[Step::new("id", "")]).unwrap_err();
        assert!(matches!(err, VaultError::NotFound { .. }));
        let n: i64 = vault
            .conn
            .query_row("SELECT COUNT(*) FROM command_steps", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn load_prefers_persisted_rows() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "ignored");
        vault
            .save_steps(cmd.id, &[Step::new("one", "first"), Step::new("two", "")])
            .unwrap();
        let loaded = vault.load_steps(cmd.id).unwrap();
        assert_eq!(loaded.source, StepSource::Persisted);
        assert_eq!(commands(&loaded.steps), vec!["one", "two"]);
        assert_eq!(loaded.steps[0].comment, "first");
    }

    #[test]
    fn load_derives_when_no_rows_exist() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Legacy", "cd /tmp\n\nls -la");
        // Simulate a stepped command written before step rows existed.
        vault
            .conn
            .execute("UPDATE commands SET is_multi_step = 1 WHERE id = ?1", [cmd.id])
            .unwrap();
        let loaded = vault.load_steps(cmd.id).unwrap();
        assert_eq!(loaded.source, StepSource::Derived);
        assert_eq!(commands(&loaded.steps), vec!["cd /tmp", "ls -la"]);
        assert!(vault.command_steps(cmd.id).unwrap().is_empty());
    }

    #[test]
    fn read_failure_recovers_with_derived_steps() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Broken", "a\nb");
        let rows = Err(VaultError::Io(std::io::Error::other("disk gone")));
        let loaded = resolve_steps(&cmd, rows);
        assert!(matches!(loaded.source, StepSource::Recovered(ref msg) if msg.contains("disk gone")));
        assert_eq!(commands(&loaded.steps), vec!["a", "b"]);
    }

    #[test]
    fn blank_step_lists_are_rejected_without_writing() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Scan", "nmap {{target}}");

        let err = vault.save_steps(cmd.id, &[]).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        let err = vault
            .save_steps(cmd.id, &[Step::new("  ", ""), Step::new("", "note")])
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));

        let after = vault.get_command(cmd.id).unwrap();
        assert!(!after.is_multi_step);
        assert_eq!(after.command, "nmap {{target}}");
        assert!(vault.command_steps(cmd.id).unwrap().is_empty());
    }

    #[test]
    fn rejected_save_keeps_existing_steps() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "x");
        vault
            .save_steps(cmd.id, &[Step::new("a", "first"), Step::new("b", "")])
            .unwrap();
        assert!(vault.save_steps(cmd.id, &[Step::new(" ", "")]).is_err());

        let stored = vault.command_steps(cmd.id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].comment, "first");
        assert_eq!(vault.get_command(cmd.id).unwrap().command, "a\nb");
    }

    #[test]
    fn load_after_delete_is_empty() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "x");
        vault
            .save_steps(cmd.id, &[Step::new("a", ""), Step::new("b", ""), Step::new("c", "")])
            .unwrap();
        vault.delete_command(cmd.id).unwrap();

        let loaded = vault.load_steps(cmd.id).unwrap();
        assert_eq!(loaded.source, StepSource::Missing);
        assert!(loaded.steps.is_empty());
    }

    #[test]
    fn deleting_command_cascades_steps() {
        let mut vault = Vault::open_in_memory().unwrap();
        let cmd = flat(&mut vault, "Multi", "x");
        vault
            .save_steps(cmd.id, &[Step::new("a", ""), Step::new("b", ""), Step::new("c", "")])
            .unwrap();
        assert_eq!(vault.command_steps(cmd.id).unwrap().len(), 3);
        vault.delete_command(cmd.id).unwrap();
        assert!(vault.command_steps(cmd.id).unwrap().is_empty());
    }
}
