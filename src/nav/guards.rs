//! Route guards: navigation-time predicates over session state.
//!
//! Each guard is evaluated at the instant of a navigation attempt and
//! never caches its decision. Denial is not an error — the guard
//! redirects to the view that explains the situation and reports the
//! denial to the navigation layer by returning `false`.

use std::sync::Arc;

use tracing::debug;

use super::{Navigator, Route};
use crate::auth::SessionQuery;
use crate::models::Role;

/// Admits only live sessions; anonymous visitors are sent to login.
pub struct AuthGuard {
    session: Arc<dyn SessionQuery>,
    navigator: Arc<dyn Navigator>,
}

impl AuthGuard {
    pub fn new(session: Arc<dyn SessionQuery>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn allows(&self) -> bool {
        if self.session.is_logged_in() {
            return true;
        }
        debug!("navigation denied: not authenticated");
        self.navigator.navigate(Route::Login);
        false
    }
}

/// Admits only anonymous visitors; a signed-in user has no business on
/// the login or registration views and is sent home instead.
pub struct GuestGuard {
    session: Arc<dyn SessionQuery>,
    navigator: Arc<dyn Navigator>,
}

impl GuestGuard {
    pub fn new(session: Arc<dyn SessionQuery>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn allows(&self) -> bool {
        if !self.session.is_logged_in() {
            return true;
        }
        debug!("navigation denied: already signed in");
        self.navigator.navigate(Route::Home);
        false
    }
}

/// Admits only administrators. The two denial cases land on different
/// views on purpose: an anonymous visitor is asked to log in, while a
/// signed-in non-admin is told the area is off limits.
pub struct AdminGuard {
    session: Arc<dyn SessionQuery>,
    navigator: Arc<dyn Navigator>,
}

impl AdminGuard {
    pub fn new(session: Arc<dyn SessionQuery>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn allows(&self) -> bool {
        if !self.session.is_logged_in() {
            debug!("navigation denied: not authenticated");
            self.navigator.navigate(Route::Login);
            return false;
        }
        if self.session.role() == Some(Role::Admin) {
            return true;
        }
        debug!("navigation denied: not an administrator");
        self.navigator.navigate(Route::Unauthorized);
        false
    }
}
