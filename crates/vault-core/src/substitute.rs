//! The `{{token}}` template language.
//!
//! A token is `{{` + one or more ASCII word characters + `}}`. Substitution is
//! one textual pass: tokens whose name is in the map are replaced by the
//! value, all other tokens stay literal, and replaced values are never
//! rescanned.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap())
}

/// Distinct token names in order of first appearance.
pub fn extract_tokens(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in token_re().captures_iter(text) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every known token. Case-sensitive; `""` values blank the token.
pub fn substitute(text: &str, values: &HashMap<String, String>) -> String {
    token_re()
        .replace_all(text, |cap: &Captures<'_>| match values.get(&cap[1]) {
            Some(v) => v.clone(),
            None => cap[0].to_string(),
        })
        .into_owned()
}

/// Token names in `text` that `values` does not cover.
pub fn unresolved(text: &str, values: &HashMap<String, String>) -> Vec<String> {
    extract_tokens(text)
        .into_iter()
        .filter(|n| !values.contains_key(n))
        .collect()
}

/// Editor completion: if the text before `cursor` ends with `{{`, return the
/// edit that inserts `{{name}}` there and the new cursor position.
pub fn complete_token(text: &str, cursor: usize, name: &str) -> Option<(String, usize)> {
    let before = text.get(..cursor)?;
    let stem = before.strip_suffix("{{")?;
    let inserted = format!("{{{{{name}}}}}");
    let new_cursor = stem.len() + inserted.len();
    Some((format!("{stem}{inserted}{}", &text[cursor..]), new_cursor))
}
