//! Storage for the current session credential and principal snapshot.
//!
//! The credential and the principal are one record: they are stored and
//! cleared together, so no reader can ever observe one without the other.
//! The store is pure persistence — it validates nothing and decides
//! nothing; expiry is the token inspector's business and lifecycle is the
//! session manager's.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::vault::Vault;
use crate::models::Principal;

/// Session file name in the data directory.
const SESSION_FILE: &str = "session.seal";

/// The stored pair, plus when it was written (for display only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub credential: String,
    pub principal: Principal,
    pub stored_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(credential: String, principal: Principal) -> Self {
        Self {
            credential,
            principal,
            stored_at: Utc::now(),
        }
    }
}

/// Synchronous storage for the session record.
///
/// All operations are idempotent; `store` replaces whatever is present
/// and `clear` on an empty store is a no-op.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<StoredSession>;
    fn store(&self, session: &StoredSession);
    fn clear(&self);

    fn credential(&self) -> Option<String> {
        self.load().map(|s| s.credential)
    }

    fn principal(&self) -> Option<Principal> {
        self.load().map(|s| s.principal)
    }
}

/// In-memory store; the default for tests and for sessions that should
/// not outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Option<StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<StoredSession> {
        self.inner.read().expect("store lock poisoned").clone()
    }

    fn store(&self, session: &StoredSession) {
        *self.inner.write().expect("store lock poisoned") = Some(session.clone());
    }

    fn clear(&self) {
        *self.inner.write().expect("store lock poisoned") = None;
    }
}

/// Disk-backed store: the record survives process restarts, sealed at
/// rest by the vault. Reads are served from memory; the file is only
/// touched on writes and at construction.
///
/// Persistence failures are logged and otherwise swallowed — a session
/// that cannot be written to disk still works for the current process.
pub struct DiskStore {
    path: PathBuf,
    vault: Vault,
    cached: RwLock<Option<StoredSession>>,
}

impl DiskStore {
    pub fn new(data_dir: &Path, vault: Vault) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let path = data_dir.join(SESSION_FILE);
        let cached = Self::read_sealed(&path, &vault);
        Ok(Self {
            path,
            vault,
            cached: RwLock::new(cached),
        })
    }

    fn read_sealed(path: &Path, vault: &Vault) -> Option<StoredSession> {
        if !path.exists() {
            return None;
        }

        let blob = match std::fs::read(path) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to read session file");
                return None;
            }
        };

        let plaintext = match vault.open(&blob) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "stored session cannot be unsealed, ignoring it");
                return None;
            }
        };

        match serde_json::from_slice(&plaintext) {
            Ok(session) => {
                debug!("session record loaded from disk");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "stored session is unparseable, ignoring it");
                None
            }
        }
    }

    fn write_sealed(&self, session: &StoredSession) -> Result<()> {
        let plaintext = serde_json::to_vec(session).context("failed to serialize session")?;
        let blob = self
            .vault
            .seal(&plaintext)
            .context("failed to seal session")?;
        std::fs::write(&self.path, blob)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl CredentialStore for DiskStore {
    fn load(&self) -> Option<StoredSession> {
        self.cached.read().expect("store lock poisoned").clone()
    }

    fn store(&self, session: &StoredSession) {
        *self.cached.write().expect("store lock poisoned") = Some(session.clone());
        if let Err(e) = self.write_sealed(session) {
            warn!(error = %e, "failed to persist session record");
        }
    }

    fn clear(&self) {
        *self.cached.write().expect("store lock poisoned") = None;
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(error = %e, "failed to remove session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample() -> StoredSession {
        StoredSession::new(
            "aaa.bbb.ccc".to_string(),
            Principal {
                id: 42,
                username: "maria".to_string(),
                email: "maria@example.com".to_string(),
                role: Role::User,
            },
        )
    }

    fn test_vault() -> Vault {
        Vault::from_passphrase("test passphrase", b"0123456789abcdef").expect("vault")
    }

    #[test]
    fn memory_store_round_trips_every_field() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        let session = sample();
        store.store(&session);
        assert_eq!(store.load(), Some(session.clone()));
        assert_eq!(store.credential().as_deref(), Some("aaa.bbb.ccc"));
        assert_eq!(store.principal(), Some(session.principal));

        store.clear();
        assert!(store.load().is_none());
        assert!(store.credential().is_none());
        assert!(store.principal().is_none());
        // Idempotent.
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn principal_is_never_present_without_credential() {
        let store = MemoryStore::new();
        store.store(&sample());
        store.clear();
        assert!(store.principal().is_none());

        store.store(&sample());
        let loaded = store.load().expect("stored");
        assert!(!loaded.credential.is_empty());
    }

    #[test]
    fn disk_store_round_trips_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = sample();

        {
            let store = DiskStore::new(dir.path(), test_vault()).expect("store");
            assert!(store.load().is_none());
            store.store(&session);
        }

        let reopened = DiskStore::new(dir.path(), test_vault()).expect("store");
        assert_eq!(reopened.load(), Some(session));
    }

    #[test]
    fn disk_store_clear_removes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path(), test_vault()).expect("store");
        store.store(&sample());
        store.clear();
        assert!(store.load().is_none());

        let reopened = DiskStore::new(dir.path(), test_vault()).expect("store");
        assert!(reopened.load().is_none());
    }

    #[test]
    fn disk_store_ignores_records_sealed_with_another_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = DiskStore::new(dir.path(), test_vault()).expect("store");
            store.store(&sample());
        }

        let other_vault =
            Vault::from_passphrase("different passphrase", b"0123456789abcdef").expect("vault");
        let reopened = DiskStore::new(dir.path(), other_vault).expect("store");
        assert!(reopened.load().is_none());
    }

    #[test]
    fn session_file_is_not_plaintext() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path(), test_vault()).expect("store");
        store.store(&sample());

        let raw = std::fs::read(dir.path().join(SESSION_FILE)).expect("file");
        let raw_text = String::from_utf8_lossy(&raw);
        assert!(!raw_text.contains("aaa.bbb.ccc"));
        assert!(!raw_text.contains("maria"));
    }
}
