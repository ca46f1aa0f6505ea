use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use vault_core::substitute::{substitute, unresolved};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SubstituteBody {
    pub text: String,
    /// Values come from this set...
    #[serde(default)]
    pub set_id: Option<i64>,
    /// ...overridden by these.
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// POST /api/substitute — render arbitrary text, line by line.
pub async fn substitute_text(
    State(app): State<AppState>,
    Json(body): Json<SubstituteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            let mut values = match body.set_id {
                Some(id) => {
                    vault.get_placeholder_set(id)?;
                    vault.value_map(id)?
                }
                None => HashMap::new(),
            };
            values.extend(body.values);
            let lines: Vec<String> = body
                .text
                .split('\n')
                .map(|line| substitute(line, &values))
                .collect();
            Ok(serde_json::json!({
                "text": lines.join("\n"),
                "unresolved": unresolved(&body.text, &values),
            }))
        })
        .await?;
    Ok(Json(result))
}
