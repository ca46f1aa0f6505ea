use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

use super::{open_vault, tag_ids};

#[derive(Subcommand)]
pub enum TagSubcommand {
    /// List tags
    List,
    /// Create a tag
    Add { name: String },
    /// Rename a tag
    Rename { name: String, new_name: String },
    /// Delete a tag, unlinking it from every command and note
    Delete { name: String },
}

pub fn run(root: &Path, subcmd: TagSubcommand, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    match subcmd {
        TagSubcommand::List => {
            let tags = vault.list_tags()?;
            if json {
                return print_json(&tags);
            }
            let rows = tags
                .iter()
                .map(|t| vec![t.id.to_string(), t.name.clone()])
                .collect();
            print_table(&["ID", "NAME"], rows);
            Ok(())
        }
        TagSubcommand::Add { name } => {
            let tag = vault.create_tag(&name)?;
            if json {
                print_json(&tag)
            } else {
                println!("Added tag '{}' (#{})", tag.name, tag.id);
                Ok(())
            }
        }
        TagSubcommand::Rename { name, new_name } => {
            let id = single_tag(&vault, &name)?;
            vault.rename_tag(id, &new_name)?;
            if json {
                print_json(&serde_json::json!({ "id": id, "name": new_name.trim() }))
            } else {
                println!("Renamed tag '{name}' to '{}'", new_name.trim());
                Ok(())
            }
        }
        TagSubcommand::Delete { name } => {
            let id = single_tag(&vault, &name)?;
            vault.delete_tag(id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted tag '{name}'");
                Ok(())
            }
        }
    }
}

fn single_tag(vault: &vault_core::Vault, name: &str) -> anyhow::Result<i64> {
    tag_ids(vault, &[name.to_string()])?
        .into_iter()
        .next()
        .context("tag lookup returned nothing")
}
