use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderSet {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A default value inside a set. `placeholder_name` is a soft reference: the
/// registry entry it names may have been renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderValue {
    pub id: i64,
    pub set_id: i64,
    pub placeholder_name: String,
    pub default_value: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Flat,
    Stepped,
}

impl Mode {
    pub fn from_multi_step(is_multi_step: bool) -> Self {
        if is_multi_step {
            Mode::Stepped
        } else {
            Mode::Flat
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Flat => "flat",
            Mode::Stepped => "stepped",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::error::VaultError;
    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "flat" => Ok(Mode::Flat),
            "stepped" | "multi-step" | "multi_step" => Ok(Mode::Stepped),
            other => Err(crate::error::VaultError::validation(format!(
                "unknown mode '{other}': expected flat or stepped"
            ))),
        }
    }
}

/// One editable step. `step_number` is accepted from callers but never
/// trusted: saving renumbers by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    pub command: String,
    #[serde(default)]
    pub comment: String,
}

impl Step {
    pub fn new(command: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            step_number: None,
            command: command.into(),
            comment: comment.into(),
        }
    }
}

/// Authoring payload of a command: either literal text or an ordered step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommandBody {
    Flat { command: String },
    Stepped { steps: Vec<Step> },
}

impl CommandBody {
    pub fn mode(&self) -> Mode {
        match self {
            CommandBody::Flat { .. } => Mode::Flat,
            CommandBody::Stepped { .. } => Mode::Stepped,
        }
    }

    /// The legacy single-string form stored in `commands.command`.
    pub fn flattened(&self) -> String {
        match self {
            CommandBody::Flat { command } => command.clone(),
            CommandBody::Stepped { steps } => crate::steps::flatten(steps),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: i64,
    pub name: String,
    /// Literal text when flat; derived newline-join of the steps when stepped.
    pub command: String,
    pub description: String,
    pub is_multi_step: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Command {
    pub fn mode(&self) -> Mode {
        Mode::from_multi_step(self.is_multi_step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStep {
    pub id: i64,
    pub command_id: i64,
    pub step_number: u32,
    pub command: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<&CommandStep> for Step {
    fn from(s: &CommandStep) -> Self {
        Step {
            step_number: Some(s.step_number),
            command: s.command.clone(),
            comment: s.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCommand {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub body: CommandBody,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandPatch {
    pub name: Option<String>,
    pub command: Option<String>,
    pub description: Option<String>,
    pub is_multi_step: Option<bool>,
    pub steps: Option<Vec<Step>>,
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    /// Markdown. `{{token}}` text here is never substituted.
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}
