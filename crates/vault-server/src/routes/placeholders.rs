use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::NameBody;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/placeholders — the registry, ordered by name.
pub async fn list_placeholders(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(|vault| Ok(serde_json::json!(vault.list_placeholders()?)))
        .await?;
    Ok(Json(result))
}

/// POST /api/placeholders
pub async fn create_placeholder(
    State(app): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.create_placeholder(&body.name)?)))
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// PUT /api/placeholders/:id — rename. Command text is not rewritten.
pub async fn rename_placeholder(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NameBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.rename_placeholder(id, &body.name))
        .await?;
    Ok(Json(serde_json::json!({ "id": id })))
}

/// DELETE /api/placeholders/:id
pub async fn delete_placeholder(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_placeholder(id))
        .await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
