use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;

use super::open_vault;

#[derive(Subcommand)]
pub enum PlaceholderSubcommand {
    /// List registered placeholder names
    List {
        /// Only names starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Register a placeholder name
    Add { name: String },
    /// Rename a placeholder (command text is not rewritten)
    Rename { id: i64, name: String },
    /// Remove a placeholder from the registry
    Delete { id: i64 },
}

pub fn run(root: &Path, subcmd: PlaceholderSubcommand, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    match subcmd {
        PlaceholderSubcommand::List { prefix: Some(prefix) } => {
            let names = vault.placeholder_candidates(&prefix)?;
            if json {
                return print_json(&names);
            }
            for name in names {
                println!("{{{{{name}}}}}");
            }
            Ok(())
        }
        PlaceholderSubcommand::List { prefix: None } => {
            let list = vault.list_placeholders()?;
            if json {
                return print_json(&list);
            }
            let rows = list
                .iter()
                .map(|p| vec![p.id.to_string(), p.name.clone()])
                .collect();
            print_table(&["ID", "NAME"], rows);
            Ok(())
        }
        PlaceholderSubcommand::Add { name } => {
            let p = vault.create_placeholder(&name)?;
            if json {
                print_json(&p)
            } else {
                println!("Added placeholder '{}' (#{})", p.name, p.id);
                Ok(())
            }
        }
        PlaceholderSubcommand::Rename { id, name } => {
            vault.rename_placeholder(id, &name)?;
            if json {
                print_json(&serde_json::json!({ "id": id, "name": name }))
            } else {
                println!("Renamed placeholder #{id} to '{name}'");
                Ok(())
            }
        }
        PlaceholderSubcommand::Delete { id } => {
            vault.delete_placeholder(id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted placeholder #{id}");
                Ok(())
            }
        }
    }
}
