use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;

use super::{find_set, open_vault};

#[derive(Subcommand)]
pub enum SetSubcommand {
    /// List placeholder sets
    List,
    /// Create a set
    Add { name: String },
    /// Rename a set
    Rename { name: String, new_name: String },
    /// Delete a set and all of its values
    Delete { name: String },
    /// Show a set's values
    Values { name: String },
    /// Set the value of one placeholder in a set
    Put {
        name: String,
        placeholder: String,
        /// May be empty
        value: String,
    },
    /// Remove the value of one placeholder from a set
    Unset { name: String, placeholder: String },
}

pub fn run(root: &Path, subcmd: SetSubcommand, json: bool) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    match subcmd {
        SetSubcommand::List => {
            let sets = vault.list_placeholder_sets()?;
            if json {
                return print_json(&sets);
            }
            let rows = sets
                .iter()
                .map(|s| vec![s.id.to_string(), s.name.clone()])
                .collect();
            print_table(&["ID", "NAME"], rows);
            Ok(())
        }
        SetSubcommand::Add { name } => {
            let set = vault.create_placeholder_set(&name)?;
            if json {
                print_json(&set)
            } else {
                println!("Added set '{}' (#{})", set.name, set.id);
                Ok(())
            }
        }
        SetSubcommand::Rename { name, new_name } => {
            let set = find_set(&vault, &name)?;
            vault.rename_placeholder_set(set.id, &new_name)?;
            if json {
                print_json(&vault.get_placeholder_set(set.id)?)
            } else {
                println!("Renamed set '{name}' to '{new_name}'");
                Ok(())
            }
        }
        SetSubcommand::Delete { name } => {
            let set = find_set(&vault, &name)?;
            vault.delete_placeholder_set(set.id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": set.id }))
            } else {
                println!("Deleted set '{name}'");
                Ok(())
            }
        }
        SetSubcommand::Values { name } => {
            let set = find_set(&vault, &name)?;
            let values = vault.list_values(set.id)?;
            if json {
                return print_json(&values);
            }
            let rows = values
                .iter()
                .map(|v| vec![v.placeholder_name.clone(), v.default_value.clone()])
                .collect();
            print_table(&["PLACEHOLDER", "VALUE"], rows);
            Ok(())
        }
        SetSubcommand::Put {
            name,
            placeholder,
            value,
        } => {
            let set = find_set(&vault, &name)?;
            vault.upsert_value(set.id, &placeholder, &value)?;
            if json {
                print_json(&vault.list_values(set.id)?)
            } else {
                println!("{name}: {placeholder} = {value}");
                Ok(())
            }
        }
        SetSubcommand::Unset { name, placeholder } => {
            let set = find_set(&vault, &name)?;
            let removed = vault.unset_value(set.id, &placeholder)?;
            if json {
                print_json(&serde_json::json!({ "removed": removed }))
            } else {
                if removed {
                    println!("{name}: {placeholder} unset");
                } else {
                    println!("{name}: {placeholder} had no value");
                }
                Ok(())
            }
        }
    }
}
