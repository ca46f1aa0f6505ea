use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use vault_core::types::{CommandPatch, Mode, NewCommand};

use super::TagIdsBody;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/commands — all commands with their tags, ordered by name.
pub async fn list_commands(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(|vault| Ok(serde_json::json!(vault.list_commands()?)))
        .await?;
    Ok(Json(result))
}

/// POST /api/commands — create a flat or stepped command.
pub async fn create_command(
    State(app): State<AppState>,
    Json(body): Json<NewCommand>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.create_command(body)?)))
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/commands/:id
pub async fn get_command(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.get_command(id)?)))
        .await?;
    Ok(Json(result))
}

/// PUT /api/commands/:id — partial update.
pub async fn update_command(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CommandPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.update_command(id, body)?)))
        .await?;
    Ok(Json(result))
}

/// DELETE /api/commands/:id
pub async fn delete_command(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_command(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// PUT /api/commands/:id/tags — replace the tag set.
pub async fn set_command_tags(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TagIdsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            vault.set_command_tags(id, &body.tag_ids)?;
            Ok(serde_json::json!(vault.get_command(id)?))
        })
        .await?;
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct ModeBody {
    pub mode: String,
}

/// PUT /api/commands/:id/mode — switch between flat and stepped.
pub async fn set_mode(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ModeBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            let mode: Mode = body.mode.parse()?;
            Ok(serde_json::json!(vault.set_mode(id, mode)?))
        })
        .await?;
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub set_id: Option<i64>,
}

/// GET /api/commands/:id/render?set_id= — substitute the set's values into
/// every line.
pub async fn render_command(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            let rendered = vault.render_command(id, query.set_id)?;
            Ok(serde_json::json!({
                "id": rendered.id,
                "name": rendered.name,
                "description": rendered.description,
                "set_id": rendered.set_id,
                "text": rendered.text(),
                "lines": rendered.lines,
                "unresolved": rendered.unresolved,
            }))
        })
        .await?;
    Ok(Json(result))
}
