//! Navigation primitives and route guards.
//!
//! The client addresses views by logical route; the actual view layer
//! implements `Navigator` and decides what a transition looks like. The
//! guards in [`guards`] sit between the two: consulted before a route
//! activates, they permit or redirect based on current session state.

pub mod guards;

pub use guards::{AdminGuard, AuthGuard, GuestGuard};

/// Logical destinations within the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Unauthorized,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::Unauthorized => "/unauthorized",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Performs view transitions. Implemented by whatever hosts the UI;
/// synchronous because guards run inline with navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
