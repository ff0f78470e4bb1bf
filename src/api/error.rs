use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The login or registration endpoint turned the attempt down.
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// The server has revoked this account; the session was force-closed.
    #[error("account revoked by the server: {0}")]
    AccountRevoked(String),

    /// Forbidden without the revocation flag — the caller lacks permission
    /// for this one action, nothing more.
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request contradicts existing state, e.g. a taken username.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid dragging huge payloads around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = ErrorBody::parse(body)
            .detail()
            .unwrap_or_else(|| Self::truncate_body(body.trim()));
        match status.as_u16() {
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            409 => ApiError::Conflict(detail),
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("status {}: {}", status, detail)),
        }
    }
}

/// Error body shape the backend uses. Auth failures arrive as plain text,
/// feature errors as `{message}`, and the JWT filter writes
/// `{error, banned}` — all of them have to parse.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub banned: bool,
}

impl ErrorBody {
    /// Non-JSON bodies decode to the default (no message, not banned).
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn detail(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}
