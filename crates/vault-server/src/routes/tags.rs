use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::NameBody;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/tags
pub async fn list_tags(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(|vault| Ok(serde_json::json!(vault.list_tags()?)))
        .await?;
    Ok(Json(result))
}

/// POST /api/tags
pub async fn create_tag(
    State(app): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.create_tag(&body.name)?)))
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// PUT /api/tags/:id
pub async fn rename_tag(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NameBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.rename_tag(id, &body.name))
        .await?;
    Ok(Json(serde_json::json!({ "id": id })))
}

/// DELETE /api/tags/:id — unlinks the tag everywhere.
pub async fn delete_tag(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_tag(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
