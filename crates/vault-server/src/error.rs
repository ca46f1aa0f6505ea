use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vault_core::VaultError;

// ---------------------------------------------------------------------------
// Internal sentinels
// ---------------------------------------------------------------------------

/// Carries an explicit 400 through the `anyhow::Error` chain for request
/// problems the core never sees (bad query strings and the like).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

#[derive(Debug)]
struct UnauthorizedError;

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unauthorized")
    }
}

impl std::error::Error for UnauthorizedError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. The body is always
/// `{"error": "<message>"}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn unauthorized() -> Self {
        Self(UnauthorizedError.into())
    }
}

fn status_for(e: &VaultError) -> StatusCode {
    match e {
        VaultError::Validation(_) | VaultError::NotInitialized => StatusCode::BAD_REQUEST,
        VaultError::DuplicateName { .. } => StatusCode::CONFLICT,
        VaultError::NotFound { .. } => StatusCode::NOT_FOUND,
        VaultError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        VaultError::PasswordHash(_)
        | VaultError::Store(_)
        | VaultError::Io(_)
        | VaultError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            let body = serde_json::json!({ "error": "unauthorized" });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }

        let status = self
            .0
            .downcast_ref::<VaultError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Store and I/O details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
            "operation failed".to_string()
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
