//! Data models for the inkpost client.
//!
//! This module contains the identity types shared across the client
//! (`Principal`, `Role`) and the wire shapes of the authentication
//! endpoints, which mirror the backend JSON exactly.

pub mod user;

pub use user::{AuthResponse, LoginRequest, Principal, RegisterRequest, Role};
