use crate::output::{print_json, print_table};
use std::path::Path;

use super::{open_vault, tag_ids, tag_names};

pub fn run(root: &Path, query: &str, tags: &[String], json: bool) -> anyhow::Result<()> {
    let vault = open_vault(root)?;
    let ids = tag_ids(&vault, tags)?;
    let results = vault.search(query, &ids)?;

    if json {
        return print_json(&results);
    }

    if results.commands.is_empty() && results.notes.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    if !results.commands.is_empty() {
        let rows = results
            .commands
            .iter()
            .map(|c| vec![c.id.to_string(), c.name.clone(), tag_names(&c.tags)])
            .collect();
        print_table(&["ID", "COMMAND", "TAGS"], rows);
    }
    if !results.notes.is_empty() {
        if !results.commands.is_empty() {
            println!();
        }
        let rows = results
            .notes
            .iter()
            .map(|n| vec![n.id.to_string(), n.title.clone(), tag_names(&n.tags)])
            .collect();
        print_table(&["ID", "NOTE", "TAGS"], rows);
    }
    Ok(())
}
