use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use vault_core::types::{NewNote, NotePatch};

use super::TagIdsBody;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/notes — ordered by title.
pub async fn list_notes(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(|vault| Ok(serde_json::json!(vault.list_notes()?)))
        .await?;
    Ok(Json(result))
}

/// POST /api/notes
pub async fn create_note(
    State(app): State<AppState>,
    Json(body): Json<NewNote>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.create_note(body)?)))
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/notes/:id
pub async fn get_note(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.get_note(id)?)))
        .await?;
    Ok(Json(result))
}

/// PUT /api/notes/:id
pub async fn update_note(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NotePatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.update_note(id, body)?)))
        .await?;
    Ok(Json(result))
}

/// DELETE /api/notes/:id
pub async fn delete_note(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_note(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// PUT /api/notes/:id/tags
pub async fn set_note_tags(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TagIdsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            vault.set_note_tags(id, &body.tag_ids)?;
            Ok(serde_json::json!(vault.get_note(id)?))
        })
        .await?;
    Ok(Json(result))
}
