//! Shared fixtures for unit tests: canned credentials, a recording
//! navigator, and a scriptable auth transport.

use std::future::Future;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;

use crate::api::{ApiError, AuthTransport};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::nav::{Navigator, Route};

/// Build an unsigned three-segment token around the given claims. The
/// signature segment is junk; nothing client-side verifies it.
pub(crate) fn token_with_claims(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.fixturesig")
}

/// A credential valid for another hour.
pub(crate) fn live_token(subject: &str) -> String {
    token_with_claims(&serde_json::json!({
        "sub": subject,
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600,
    }))
}

/// A credential whose expiry has just passed.
pub(crate) fn expired_token(subject: &str) -> String {
    token_with_claims(&serde_json::json!({
        "sub": subject,
        "iat": Utc::now().timestamp() - 3600,
        "exp": Utc::now().timestamp() - 1,
    }))
}

/// Navigator that records every transition.
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn visited(&self) -> Vec<Route> {
        self.routes.lock().expect("navigator lock poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes
            .lock()
            .expect("navigator lock poisoned")
            .push(route);
    }
}

enum StubOutcome {
    Succeed(AuthResponse),
    Reject(String),
    ServerError,
}

/// Auth transport with a scripted outcome, replayed on every call.
pub(crate) struct StubTransport {
    outcome: StubOutcome,
}

impl StubTransport {
    pub(crate) fn succeeding(response: AuthResponse) -> Self {
        Self {
            outcome: StubOutcome::Succeed(response),
        }
    }

    pub(crate) fn rejecting(message: &str) -> Self {
        Self {
            outcome: StubOutcome::Reject(message.to_string()),
        }
    }

    pub(crate) fn server_error() -> Self {
        Self {
            outcome: StubOutcome::ServerError,
        }
    }

    fn respond(&self) -> Result<AuthResponse, ApiError> {
        match &self.outcome {
            StubOutcome::Succeed(response) => Ok(response.clone()),
            StubOutcome::Reject(message) => Err(ApiError::Unauthorized(message.clone())),
            StubOutcome::ServerError => Err(ApiError::ServerError("backend unavailable".into())),
        }
    }
}

impl AuthTransport for StubTransport {
    fn login(
        &self,
        _request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        let result = self.respond();
        async move { result }
    }

    fn register(
        &self,
        _request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        let result = self.respond();
        async move { result }
    }
}
