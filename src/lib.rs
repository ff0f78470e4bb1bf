//! inkpost — session and authorization core for a blogging client.
//!
//! The library owns the client side of authentication against the
//! inkpost backend: the credential store, token inspection, the session
//! lifecycle, route guards, the request authorizer every outbound call
//! passes through, and the toast notification channel the UI listens on.
//!
//! Everything else a front-end does (feeds, posts, profiles) talks to
//! the backend through [`api::ApiClient`] and reads session state
//! through [`auth::SessionManager`].

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod notify;

#[cfg(test)]
pub(crate) mod testutil;
