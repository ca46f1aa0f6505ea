use crate::error::{Result, VaultError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const VAULT_DIR: &str = ".cmdvault";
pub const CONFIG_FILE: &str = ".cmdvault/config.yaml";
pub const DEFAULT_DATABASE: &str = "vault.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn vault_dir(root: &Path) -> PathBuf {
    root.join(VAULT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the configured database location. Relative paths live inside the
/// vault directory; absolute paths are used as-is.
pub fn database_path(root: &Path, database: &str) -> PathBuf {
    let p = Path::new(database);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        vault_dir(root).join(p)
    }
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

/// ASCII word characters only, matching the `{{identifier}}` token syntax.
fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap())
}

pub fn is_identifier(name: &str) -> bool {
    ident_re().is_match(name)
}

/// Placeholder names: non-empty, `[A-Za-z0-9_]` only.
pub fn validate_placeholder_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::validation("placeholder name is required"));
    }
    if !is_identifier(name) {
        return Err(VaultError::validation(format!(
            "invalid placeholder name '{name}': only letters, numbers, and underscores"
        )));
    }
    Ok(())
}

/// Placeholder set names follow the same word-character rule.
pub fn validate_set_name(name: &str) -> Result<()> {
    if !is_identifier(name) {
        return Err(VaultError::validation(format!(
            "invalid set name '{name}': only letters, numbers, and underscores"
        )));
    }
    Ok(())
}

/// Trim and reject blank values for a required text field.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VaultError::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
