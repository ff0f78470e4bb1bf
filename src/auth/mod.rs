//! Session and credential management.
//!
//! This module provides:
//! - `SessionManager`: the session lifecycle — login, registration,
//!   logout, and the self-healing liveness query
//! - `CredentialStore` with in-memory and sealed-on-disk backends
//! - `token`: claim inspection for bearer credentials
//! - `Vault`: at-rest sealing keyed through the OS keychain
//! - `SavedLogin`: optional "remember me" password storage
//!
//! The stored credential and principal snapshot are one record; only the
//! session manager ever writes it.

pub mod credentials;
pub mod session;
pub mod store;
pub mod token;
pub mod vault;

pub use credentials::SavedLogin;
pub use session::{SessionManager, SessionQuery};
pub use store::{CredentialStore, DiskStore, MemoryStore, StoredSession};
pub use token::{Claims, TokenError};
pub use vault::{Vault, VaultError};
