//! Session lifecycle management.
//!
//! `SessionManager` is the only writer of the credential store: login and
//! registration populate it, logout clears it, and the liveness query
//! heals stale state it finds along the way. Everything else in the
//! client reads session state through here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::{CredentialStore, StoredSession};
use super::token;
use crate::api::{ApiError, AuthTransport, RevocationObserver};
use crate::models::{LoginRequest, Principal, RegisterRequest, Role};
use crate::nav::{Navigator, Route};
use crate::notify::{Severity, ToastSink};

/// Read-only view of session state, consulted by every route guard.
pub trait SessionQuery: Send + Sync {
    fn is_logged_in(&self) -> bool;
    fn principal(&self) -> Option<Principal>;

    fn role(&self) -> Option<Role> {
        self.principal().map(|p| p.role)
    }
}

pub struct SessionManager<A: AuthTransport> {
    store: Arc<dyn CredentialStore>,
    transport: A,
    navigator: Arc<dyn Navigator>,
    toasts: ToastSink,
}

impl<A: AuthTransport> SessionManager<A> {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        transport: A,
        navigator: Arc<dyn Navigator>,
        toasts: ToastSink,
    ) -> Self {
        Self {
            store,
            transport,
            navigator,
            toasts,
        }
    }

    /// Authenticate with a username or email.
    ///
    /// On success the credential and principal snapshot are stored as one
    /// record and navigation moves to the landing view. On failure
    /// nothing is mutated and the rejection is returned for the caller to
    /// display.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Principal, ApiError> {
        let request = LoginRequest::for_identifier(identifier, password);
        match self.transport.login(&request).await {
            Ok(response) => Ok(self.establish(response)),
            Err(e) => {
                debug!(error = %e, "login attempt failed");
                Err(Self::as_rejection(e))
            }
        }
    }

    /// Create an account. The registration response carries a usable
    /// credential, so a successful registration is also a login.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Principal, ApiError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.transport.register(&request).await {
            Ok(response) => Ok(self.establish(response)),
            Err(e) => {
                debug!(error = %e, "registration attempt failed");
                Err(Self::as_rejection(e))
            }
        }
    }

    /// Close the session.
    ///
    /// The non-navigating form exists so liveness checks can clear stale
    /// state mid-navigation without starting a second redirect.
    pub fn logout(&self, navigate: bool) {
        self.store.clear();
        debug!(navigate, "session cleared");
        if navigate {
            self.navigator.navigate(Route::Login);
        }
    }

    pub fn principal(&self) -> Option<Principal> {
        self.store.principal()
    }

    pub fn role(&self) -> Option<Role> {
        self.principal().map(|p| p.role)
    }

    /// Whether a live session exists right now.
    ///
    /// A credential that no longer decodes, or has expired, is cleared on
    /// the spot (without navigation) so no caller ever has to remember a
    /// separate cleanup step.
    pub fn is_logged_in(&self) -> bool {
        let Some(credential) = self.store.credential() else {
            return false;
        };

        match token::decode(&credential) {
            Ok(claims) if !claims.is_expired() => true,
            Ok(_) => {
                debug!("stored credential has expired, clearing session");
                self.logout(false);
                false
            }
            Err(e) => {
                warn!(error = %e, "stored credential is unreadable, clearing session");
                self.logout(false);
                false
            }
        }
    }

    fn establish(&self, response: crate::models::AuthResponse) -> Principal {
        let principal = response.principal();
        self.store
            .store(&StoredSession::new(response.access_token, principal.clone()));
        info!(username = %principal.username, role = %principal.role, "session established");
        self.navigator.navigate(Route::Home);
        principal
    }

    /// A 4xx answer from the auth endpoints is a rejection of the
    /// attempt, not a transport fault; network and server errors stay
    /// what they are.
    fn as_rejection(error: ApiError) -> ApiError {
        match error {
            ApiError::Unauthorized(m)
            | ApiError::AccessDenied(m)
            | ApiError::Conflict(m)
            | ApiError::NotFound(m) => ApiError::AuthenticationRejected(m),
            other => other,
        }
    }
}

impl<A: AuthTransport> SessionQuery for SessionManager<A> {
    fn is_logged_in(&self) -> bool {
        SessionManager::is_logged_in(self)
    }

    fn principal(&self) -> Option<Principal> {
        SessionManager::principal(self)
    }
}

impl<A: AuthTransport> RevocationObserver for SessionManager<A> {
    fn on_account_revoked(&self) {
        warn!("account revoked by the server, forcing logout");
        self.toasts.show(
            "Your account has been suspended. You have been signed out.",
            Severity::Error,
        );
        self.logout(true);
    }
}
