use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse};
use axum::{Extension, Json};
use vault_core::VaultError;

use crate::auth::{clear_cookie, session_cookie, session_token, SessionUser};
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /api/login — check credentials and start a session.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, AppError> {
    let username = body.username.clone();
    let ok = app
        .with_vault(move |vault| vault.verify_login(&body.username, &body.password))
        .await?;
    if !ok {
        tracing::warn!(username = %username, "failed login");
        return Err(VaultError::InvalidCredentials.into());
    }

    let token = app.start_session(&username).await;
    tracing::info!(username = %username, "login");
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(serde_json::json!({ "username": username })),
    ))
}

/// POST /api/logout — drop the session, if any.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        app.end_session(&token).await;
    }
    (
        AppendHeaders([(header::SET_COOKIE, clear_cookie())]),
        Json(serde_json::json!({ "ok": true })),
    )
}

#[derive(serde::Deserialize)]
pub struct ProfileBody {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(default, alias = "newUsername")]
    pub new_username: Option<String>,
    #[serde(default, alias = "newPassword")]
    pub new_password: Option<String>,
}

/// POST /api/profile — change username and/or password.
pub async fn update_profile(
    State(app): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<ProfileBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let old = user.username.clone();
    let username = app
        .with_vault(move |vault| {
            vault.update_profile(
                &user.username,
                &body.current_password,
                body.new_username.as_deref(),
                body.new_password.as_deref(),
            )
        })
        .await?;
    if username != old {
        app.rename_sessions(&old, &username).await;
    }
    Ok(Json(serde_json::json!({ "username": username })))
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
