use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    /// Comma-separated tag ids; every one must be present.
    #[serde(default)]
    pub tags: Option<String>,
}

fn parse_tag_ids(raw: Option<&str>) -> Result<Vec<i64>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::bad_request(format!("invalid tag id '{s}'")))
        })
        .collect()
}

/// GET /api/search?q=&tags=1,2
pub async fn search(
    State(app): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tag_ids = parse_tag_ids(query.tags.as_deref())?;
    let result = app
        .with_vault(move |vault| Ok(serde_json::json!(vault.search(&query.q, &tag_ids)?)))
        .await?;
    Ok(Json(result))
}
