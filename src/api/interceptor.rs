//! The request authorizer: the per-request hook that attaches the stored
//! credential to outbound calls and watches responses for the server's
//! revocation signal.
//!
//! Attachment is skipped for the two endpoints that are reachable without
//! a session (login, registration). Revocation is *not* any 403 — it is a
//! rejected status whose body explicitly flags the account as banned;
//! plain authorization failures pass through untouched so feature code
//! can interpret them.

use std::sync::{Arc, RwLock, Weak};

use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, warn};

use super::error::{ApiError, ErrorBody};
use crate::auth::store::CredentialStore;

/// Endpoints that never carry a credential, matched by exact path suffix.
const EXEMPT_SUFFIXES: [&str; 2] = ["/auth/login", "/auth/register"];

/// Notified at most once per revoked response, after which the error is
/// still surfaced to the caller.
pub trait RevocationObserver: Send + Sync {
    fn on_account_revoked(&self);
}

pub struct RequestAuthorizer {
    store: Arc<dyn CredentialStore>,
    observer: RwLock<Option<Weak<dyn RevocationObserver>>>,
}

impl RequestAuthorizer {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            observer: RwLock::new(None),
        }
    }

    /// Install the observer for forced logout. Held weakly: the observer
    /// owns the transport, not the other way around.
    pub fn set_observer(&self, observer: Weak<dyn RevocationObserver>) {
        *self.observer.write().expect("observer lock poisoned") = Some(observer);
    }

    pub fn is_exempt(path: &str) -> bool {
        EXEMPT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
    }

    /// Decorate an outgoing request with the bearer credential, if one is
    /// stored and the endpoint is not exempt. Returns a new builder; the
    /// caller's original request value is never mutated.
    pub fn decorate(&self, path: &str, builder: RequestBuilder) -> RequestBuilder {
        if Self::is_exempt(path) {
            return builder;
        }
        match self.store.credential() {
            Some(credential) => builder.bearer_auth(credential),
            None => builder,
        }
    }

    /// Inspect a rejected response for the revocation signal.
    ///
    /// Returns the error to surface when the account was revoked, after
    /// notifying the observer exactly once. Any other rejection returns
    /// `None` and is mapped through the ordinary taxonomy by the caller.
    pub fn observe(&self, status: StatusCode, body: &str) -> Option<ApiError> {
        if status != StatusCode::FORBIDDEN && status != StatusCode::UNAUTHORIZED {
            return None;
        }

        let parsed = ErrorBody::parse(body);
        if !parsed.banned {
            return None;
        }

        let detail = parsed
            .detail()
            .unwrap_or_else(|| "account has been banned".to_string());
        warn!(status = %status, "server revoked the account");

        let observer = self
            .observer
            .read()
            .expect("observer lock poisoned")
            .as_ref()
            .and_then(Weak::upgrade);
        match observer {
            Some(observer) => observer.on_account_revoked(),
            None => debug!("no revocation observer installed"),
        }

        Some(ApiError::AccountRevoked(detail))
    }
}
