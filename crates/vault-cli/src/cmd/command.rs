use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use clap::Subcommand;
use std::path::Path;
use vault_core::steps::StepSource;
use vault_core::types::{CommandBody, CommandPatch, Mode, NewCommand, Step};

use super::{find_set, open_vault, tag_ids, tag_names};

#[derive(Subcommand)]
pub enum CommandSubcommand {
    /// List commands
    List {
        /// Only commands carrying this tag (repeatable; all must match)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one command, with its steps when stepped
    Show { id: i64 },
    /// Add a command. Use --command for flat text or repeat --step
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long, conflicts_with = "steps")]
        command: Option<String>,
        /// One step (repeatable, in order)
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change name, description, or text
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        command: Option<String>,
    },
    /// Delete a command and its steps
    Delete { id: i64 },
    /// Replace a command's tags
    Tags {
        id: i64,
        /// Tag name (repeatable); none clears all tags
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show the editable step list
    Steps { id: i64 },
    /// Replace all steps; numbering follows argument order
    SaveSteps {
        id: i64,
        /// Step text (repeatable, in order)
        #[arg(long = "step", required = true)]
        steps: Vec<String>,
        /// Comment for the step at the same position (repeatable)
        #[arg(long = "comment")]
        comments: Vec<String>,
    },
    /// Switch between flat and stepped
    Mode {
        id: i64,
        /// flat | stepped
        mode: String,
    },
    /// Print the command with a placeholder set's values substituted
    Render {
        id: i64,
        /// Placeholder set name
        #[arg(long)]
        set: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: CommandSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CommandSubcommand::List { tags } => list(root, &tags, json),
        CommandSubcommand::Show { id } => show(root, id, json),
        CommandSubcommand::Add {
            name,
            description,
            command,
            steps,
            tags,
        } => add(root, name, description, command, steps, &tags, json),
        CommandSubcommand::Edit {
            id,
            name,
            description,
            command,
        } => edit(
            root,
            id,
            CommandPatch {
                name,
                description,
                command,
                ..CommandPatch::default()
            },
            json,
        ),
        CommandSubcommand::Delete { id } => delete(root, id, json),
        CommandSubcommand::Tags { id, tags } => set_tags(root, id, &tags, json),
        CommandSubcommand::Steps { id } => steps(root, id, json),
        CommandSubcommand::SaveSteps {
            id,
            steps,
            comments,
        } => save_steps(root, id, steps, comments, json),
        CommandSubcommand::Mode { id, mode } => set_mode(root, id, &mode, json),
        CommandSubcommand::Render { id, set } => render(root, id, set.as_deref(), json),
    }
}

fn list(root: &Path, tags: &[String], json: bool) -> anyhow::Result<()> {
    let vault = open_vault(root)?;
    let ids = tag_ids(&vault, tags)?;
    let commands: Vec<_> = vault
        .list_commands()?
        .into_iter()
        .filter(|c| ids.iter().all(|id| c.tags.iter().any(|t| t.id == *id)))
        .collect();

    if json {
        return print_json(&commands);
    }
    if commands.is_empty() {
        println!("No commands.");
        return Ok(());
    }
    let rows = commands
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.mode().to_string(),
                tag_names(&c.tags),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "MODE", "TAGS"], rows);
    Ok(())
}

fn show(root: &Path, id: i64, json: bool) -> anyhow::Result<()> {
    let vault = open_vault(root)?;
    let cmd = vault.get_command(id)?;
    let loaded = if cmd.is_multi_step {
        Some(vault.load_steps(id)?)
    } else {
        None
    };

    if json {
        return print_json(&serde_json::json!({
            "command": cmd,
            "steps": loaded.as_ref().map(|l| &l.steps),
        }));
    }

    println!("{} (#{})", cmd.name, cmd.id);
    println!("  {}", cmd.description);
    if !cmd.tags.is_empty() {
        println!("  tags: {}", tag_names(&cmd.tags));
    }
    println!();
    match loaded {
        Some(loaded) => {
            for step in &loaded.steps {
                let n = step.step_number.unwrap_or_default();
                if step.comment.is_empty() {
                    println!("  {n}. {}", step.command);
                } else {
                    println!("  {n}. {}    # {}", step.command, step.comment);
                }
            }
        }
        None => {
            for line in cmd.command.lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

fn add(
    root: &Path,
    name: String,
    description: String,
    command: Option<String>,
    steps: Vec<String>,
    tags: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let body = match command {
        Some(command) => CommandBody::Flat { command },
        None if !steps.is_empty() => CommandBody::Stepped {
            steps: steps.into_iter().map(|s| Step::new(s, "")).collect(),
        },
        None => bail!("provide --command or at least one --step"),
    };

    let mut vault = open_vault(root)?;
    let tag_ids = tag_ids(&vault, tags)?;
    let cmd = vault
        .create_command(NewCommand {
            name,
            description,
            body,
            tag_ids,
        })
        .context("failed to add command")?;

    if json {
        print_json(&cmd)
    } else {
        println!("Added command '{}' (#{})", cmd.name, cmd.id);
        Ok(())
    }
}

fn edit(root: &Path, id: i64, patch: CommandPatch, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    let cmd = vault.update_command(id, patch)?;
    if json {
        print_json(&cmd)
    } else {
        println!("Updated command '{}' (#{})", cmd.name, cmd.id);
        Ok(())
    }
}

fn delete(root: &Path, id: i64, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    vault.delete_command(id)?;
    if json {
        print_json(&serde_json::json!({ "deleted": id }))
    } else {
        println!("Deleted command #{id}");
        Ok(())
    }
}

fn set_tags(root: &Path, id: i64, tags: &[String], json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    let ids = tag_ids(&vault, tags)?;
    vault.set_command_tags(id, &ids)?;
    let cmd = vault.get_command(id)?;
    if json {
        print_json(&cmd)
    } else {
        println!("Tags for '{}': {}", cmd.name, tag_names(&cmd.tags));
        Ok(())
    }
}

fn steps(root: &Path, id: i64, json: bool) -> anyhow::Result<()> {
    let vault = open_vault(root)?;
    let loaded = vault.load_steps(id)?;
    if loaded.source == StepSource::Missing {
        bail!("command not found: {id}");
    }
    if json {
        return print_json(&loaded);
    }
    let rows = loaded
        .steps
        .iter()
        .map(|s| {
            vec![
                s.step_number.unwrap_or_default().to_string(),
                s.command.clone(),
                s.comment.clone(),
            ]
        })
        .collect();
    print_table(&["#", "COMMAND", "COMMENT"], rows);
    if loaded.source != StepSource::Persisted {
        println!("(derived from command text; not saved)");
    }
    Ok(())
}

fn save_steps(
    root: &Path,
    id: i64,
    steps: Vec<String>,
    comments: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    if comments.len() > steps.len() {
        bail!("{} comments given for {} steps", comments.len(), steps.len());
    }
    let mut comments = comments.into_iter();
    let steps: Vec<Step> = steps
        .into_iter()
        .map(|s| Step::new(s, comments.next().unwrap_or_default()))
        .collect();

    let mut vault = open_vault(root)?;
    vault.save_steps(id, &steps)?;
    let cmd = vault.get_command(id)?;
    if json {
        print_json(&serde_json::json!({
            "command": cmd,
            "steps": vault.command_steps(id)?,
        }))
    } else {
        println!("Saved {} steps for '{}'", steps.len(), cmd.name);
        Ok(())
    }
}

fn set_mode(root: &Path, id: i64, mode: &str, json: bool) -> anyhow::Result<()> {
    let mode: Mode = mode.parse()?;
    let mut vault = open_vault(root)?;
    let cmd = vault.set_mode(id, mode)?;
    if json {
        print_json(&cmd)
    } else {
        println!("'{}' is now {}", cmd.name, cmd.mode());
        Ok(())
    }
}

fn render(root: &Path, id: i64, set: Option<&str>, json: bool) -> anyhow::Result<()> {
    let vault = open_vault(root)?;
    let set_id = match set {
        Some(name) => Some(find_set(&vault, name)?.id),
        None => None,
    };
    let rendered = vault.render_command(id, set_id)?;

    if json {
        return print_json(&rendered);
    }
    for line in &rendered.lines {
        if line.comment.is_empty() {
            println!("{}", line.text);
        } else {
            println!("{}    # {}", line.text, line.comment);
        }
    }
    if !rendered.unresolved.is_empty() {
        eprintln!("unresolved: {}", rendered.unresolved.join(", "));
    }
    Ok(())
}
