//! Substring search across commands and notes, narrowed by tags.

use serde::Serialize;

use crate::db::Vault;
use crate::error::Result;
use crate::types::{Command, Note, Tag};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub commands: Vec<Command>,
    pub notes: Vec<Note>,
}

/// Case-insensitive substring match of `query` against any field. An empty
/// query matches everything.
fn text_matches(query: &str, fields: &[&str]) -> bool {
    query.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(query))
}

/// The item carries every tag in `tag_ids`.
fn has_all_tags(tags: &[Tag], tag_ids: &[i64]) -> bool {
    tag_ids.iter().all(|id| tags.iter().any(|t| t.id == *id))
}

impl Vault {
    pub fn search(&self, query: &str, tag_ids: &[i64]) -> Result<SearchResults> {
        let query = query.trim().to_lowercase();

        let commands = self
            .list_commands()?
            .into_iter()
            .filter(|c| {
                text_matches(&query, &[c.name.as_str(), c.description.as_str(), c.command.as_str()])
                    && has_all_tags(&c.tags, tag_ids)
            })
            .collect();
        let notes = self
            .list_notes()?
            .into_iter()
            .filter(|n| {
                text_matches(&query, &[n.title.as_str(), n.content.as_str()]) && has_all_tags(&n.tags, tag_ids)
            })
            .collect();

        Ok(SearchResults { commands, notes })
    }
}
