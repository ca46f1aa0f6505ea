use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::NameBody;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/placeholder-sets
pub async fn list_sets(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(|vault| Ok(serde_json::json!(vault.list_placeholder_sets()?)))
        .await?;
    Ok(Json(result))
}

/// POST /api/placeholder-sets
pub async fn create_set(
    State(app): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.create_placeholder_set(&body.name)?)))
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// PUT /api/placeholder-sets/:id — rename.
pub async fn rename_set(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NameBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            vault.rename_placeholder_set(id, &body.name)?;
            Ok(serde_json::json!(vault.get_placeholder_set(id)?))
        })
        .await?;
    Ok(Json(result))
}

/// DELETE /api/placeholder-sets/:id — also removes the set's values.
pub async fn delete_set(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_placeholder_set(id))
        .await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// GET /api/placeholder-sets/:id/values
pub async fn list_values(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            vault.get_placeholder_set(id)?;
            Ok(serde_json::json!(vault.list_values(id)?))
        })
        .await?;
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct ValuesBody {
    /// placeholder name -> default value
    pub values: BTreeMap<String, String>,
}

/// PUT /api/placeholder-sets/:id/values — upsert every name/value pair in
/// one transaction. Names not mentioned are left alone.
pub async fn put_values(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ValuesBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_vault(move |vault| {
            let pairs: Vec<(String, String)> = body.values.into_iter().collect();
            vault.upsert_values(id, &pairs)?;
            Ok(serde_json::json!(vault.list_values(id)?))
        })
        .await?;
    Ok(Json(result))
}

/// DELETE /api/placeholder-values/:id
pub async fn delete_value(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_vault(move |vault| vault.delete_value(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
