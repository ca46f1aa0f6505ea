use std::path::Path;

use super::open_vault;
use crate::output::print_json;

pub fn run(
    root: &Path,
    username: &str,
    current: &str,
    new_username: Option<&str>,
    new_password: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let mut vault = open_vault(root)?;
    let effective = vault.update_profile(username, current, new_username, new_password)?;
    if json {
        print_json(&serde_json::json!({ "username": effective }))
    } else {
        println!("Updated credentials for '{effective}'");
        Ok(())
    }
}
