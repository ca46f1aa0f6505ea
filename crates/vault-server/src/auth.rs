use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "cmdvault_session";

/// The logged-in operator, inserted into request extensions by
/// [`session_middleware`].
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
    pub token: String,
}

/// Paths reachable without a session.
fn is_public(path: &str) -> bool {
    path == "/api/login" || path == "/api/health" || !path.starts_with("/api/")
}

/// Gate `/api/*` behind a session cookie.
///
/// 1. Public path → passthrough
/// 2. Cookie `cmdvault_session` names a live session → passthrough with
///    [`SessionUser`] attached
/// 3. Otherwise → 401 JSON
pub async fn session_middleware(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    if let Some(token) = session_token(req.headers()) {
        if let Some(username) = app.session_user(&token).await {
            req.extensions_mut().insert(SessionUser { username, token });
            return next.run(req).await;
        }
    }

    Response::builder()
        .status(401)
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"error":"unauthorized"}"#))
        .expect("infallible: all header values are valid ASCII")
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    let prefix = format!("{SESSION_COOKIE}=");
    cookies
        .split(';')
        .find_map(|part| part.trim().strip_prefix(prefix.as_str()))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
