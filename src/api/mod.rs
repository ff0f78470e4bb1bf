//! REST transport layer for the inkpost backend.
//!
//! This module provides the `ApiClient` for talking to the backend, the
//! `RequestAuthorizer` hook that every outbound request passes through,
//! and the `ApiError` taxonomy the rest of the client matches on.
//!
//! Authentication uses bearer tokens obtained from the `/auth` endpoints.

pub mod client;
pub mod error;
pub mod interceptor;

pub use client::{ApiClient, AuthTransport, LOGIN_PATH, REGISTER_PATH};
pub use error::ApiError;
pub use interceptor::{RequestAuthorizer, RevocationObserver};
