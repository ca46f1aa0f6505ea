use axum::extract::{Path, State};
use axum::Json;
use vault_core::types::Step;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/commands/:id/steps — the editable step list. Falls back to steps
/// derived from the command text when none are stored; `source` says which.
pub async fn get_steps(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.load_steps(id)?)))
        .await?;
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct StepsBody {
    pub steps: Vec<Step>,
}

/// PUT /api/commands/:id/steps — replace all steps and the flattened text.
pub async fn save_steps(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StepsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            vault.save_steps(id, &body.steps)?;
            let command = vault.get_command(id)?;
            let steps = vault.command_steps(id)?;
            Ok(serde_json::json!({ "command": command, "steps": steps }))
        })
        .await?;
    Ok(Json(result))
}
