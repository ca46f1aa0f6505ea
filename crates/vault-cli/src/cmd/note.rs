use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use vault_core::types::{NewNote, NotePatch};

use super::{open_vault, tag_ids, tag_names};

#[derive(Subcommand)]
pub enum NoteSubcommand {
    /// List notes by title
    List,
    /// Print a note
    Show { id: i64 },
    /// Add a note
    Add {
        #[arg(long)]
        title: String,
        /// Markdown body
        #[arg(long)]
        content: String,
        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change title or content
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete { id: i64 },
    /// Replace a note's tags
    Tags {
        id: i64,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

pub fn run(root: &Path, subcmd: NoteSubcommand, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    match subcmd {
        NoteSubcommand::List => {
            let notes = vault.list_notes()?;
            if json {
                return print_json(&notes);
            }
            if notes.is_empty() {
                println!("No notes.");
                return Ok(());
            }
            let rows = notes
                .iter()
                .map(|n| {
                    vec![
                        n.id.to_string(),
                        n.title.clone(),
                        tag_names(&n.tags),
                        n.created_at.format("%Y-%m-%d").to_string(),
                    ]
                })
                .collect();
            print_table(&["ID", "TITLE", "TAGS", "CREATED"], rows);
            Ok(())
        }
        NoteSubcommand::Show { id } => {
            let note = vault.get_note(id)?;
            if json {
                return print_json(&note);
            }
            println!("# {}", note.title);
            if !note.tags.is_empty() {
                println!("tags: {}", tag_names(&note.tags));
            }
            println!();
            println!("{}", note.content);
            Ok(())
        }
        NoteSubcommand::Add {
            title,
            content,
            tags,
        } => {
            let tag_ids = tag_ids(&vault, &tags)?;
            let note = vault.create_note(NewNote {
                title,
                content,
                tag_ids,
            })?;
            if json {
                print_json(&note)
            } else {
                println!("Added note '{}' (#{})", note.title, note.id);
                Ok(())
            }
        }
        NoteSubcommand::Edit { id, title, content } => {
            let note = vault.update_note(id, NotePatch { title, content })?;
            if json {
                print_json(&note)
            } else {
                println!("Updated note '{}' (#{})", note.title, note.id);
                Ok(())
            }
        }
        NoteSubcommand::Delete { id } => {
            vault.delete_note(id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted note #{id}");
                Ok(())
            }
        }
        NoteSubcommand::Tags { id, tags } => {
            let ids = tag_ids(&vault, &tags)?;
            vault.set_note_tags(id, &ids)?;
            let note = vault.get_note(id)?;
            if json {
                print_json(&note)
            } else {
                println!("Tags for '{}': {}", note.title, tag_names(&note.tags));
                Ok(())
            }
        }
    }
}
