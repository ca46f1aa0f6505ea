use std::collections::HashMap;

use serde::Serialize;

use crate::db::{ensure_exists, Vault};
use crate::error::Result;
use crate::substitute::{extract_tokens, substitute};

/// One display/copy line of a rendered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    /// Set for stepped commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedCommand {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub set_id: Option<i64>,
    pub lines: Vec<RenderedLine>,
    /// Tokens left literal because the set has no value for them.
    pub unresolved: Vec<String>,
}

impl RenderedCommand {
    /// The rendered lines joined for copying.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Vault {
    /// Render a command against a value set. Without a set every token stays
    /// literal.
    pub fn render_command(&self, id: i64, set_id: Option<i64>) -> Result<RenderedCommand> {
        let command = self.get_command(id)?;
        let values = match set_id {
            Some(sid) => {
                ensure_exists(&self.conn, "placeholder_sets", "placeholder set", sid)?;
                self.value_map(sid)?
            }
            None => HashMap::new(),
        };

        let lines: Vec<RenderedLine> = if command.is_multi_step {
            self.load_steps(id)?
                .steps
                .into_iter()
                .map(|step| RenderedLine {
                    step_number: step.step_number,
                    text: substitute(&step.command, &values),
                    comment: step.comment,
                })
                .filter(|l| !l.text.trim().is_empty())
                .collect()
        } else {
            substitute(&command.command, &values)
                .split('\n')
                .filter(|l| !l.trim().is_empty())
                .map(|l| RenderedLine {
                    step_number: None,
                    text: l.to_string(),
                    comment: String::new(),
                })
                .collect()
        };

        let unresolved = extract_tokens(&command.command)
            .into_iter()
            .filter(|n| !values.contains_key(n))
            .collect();

        Ok(RenderedCommand {
            id,
            name: command.name,
            description: command.description,
            set_id,
            lines,
            unresolved,
        })
    }
}
