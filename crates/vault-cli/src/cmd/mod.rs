pub mod command;
pub mod init;
pub mod note;
pub mod passwd;
pub mod placeholder;
pub mod search;
pub mod serve;
pub mod set;
pub mod tag;

use anyhow::{bail, Context};
use std::path::Path;
use vault_core::types::{PlaceholderSet, Tag};
use vault_core::Vault;

/// Open the vault configured under `root`.
pub fn open_vault(root: &Path) -> anyhow::Result<Vault> {
    Vault::open_root(root).with_context(|| format!("failed to open vault in {}", root.display()))
}

/// Map tag names (case-insensitive) to ids.
pub fn tag_ids(vault: &Vault, names: &[String]) -> anyhow::Result<Vec<i64>> {
    let tags = vault.list_tags()?;
    names
        .iter()
        .map(|name| {
            tags.iter()
                .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
                .map(|t| t.id)
                .with_context(|| format!("unknown tag '{name}'"))
        })
        .collect()
}

pub fn find_set(vault: &Vault, name: &str) -> anyhow::Result<PlaceholderSet> {
    match vault.find_placeholder_set(name)? {
        Some(set) => Ok(set),
        None => bail!("unknown placeholder set '{name}'"),
    }
}

pub fn tag_names(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
