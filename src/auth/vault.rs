//! Sealing of the persisted session record.
//!
//! The session file holds a live bearer credential, so it is never
//! written in the clear. A `Vault` wraps ChaCha20-Poly1305 with a key
//! derived (Argon2id) from a passphrase held in the OS keychain; the
//! derivation salt sits next to the sealed file. Losing either the
//! keychain entry or the salt just means the stored session cannot be
//! opened and the user logs in again.

use std::path::{Path, PathBuf};

use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;

/// Salt file name in the data directory.
const SALT_FILE: &str = "vault.salt";

/// Keychain account name the passphrase is filed under.
const KEYRING_USER: &str = "vault-passphrase";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("key derivation failed: {0}")]
    Kdf(String),
    #[error("sealing failed")]
    Seal,
    #[error("sealed data is corrupt or the key is wrong")]
    Unseal,
    #[error("keychain access failed: {0}")]
    Keyring(#[from] keyring::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct Vault {
    cipher: ChaCha20Poly1305,
}

impl Vault {
    /// Derive the sealing key from an explicit passphrase and salt.
    /// Deterministic; this is also the construction tests use.
    pub fn from_passphrase(passphrase: &str, salt: &[u8]) -> Result<Self, VaultError> {
        let mut key = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, &mut key)
            .map_err(|e| VaultError::Kdf(e.to_string()))?;
        Ok(Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        })
    }

    /// Open the vault backed by the OS keychain, generating a passphrase
    /// and salt on first use.
    pub fn open_keyring(service: &str, data_dir: &Path) -> Result<Self, VaultError> {
        let entry = keyring::Entry::new(service, KEYRING_USER)?;
        let passphrase = match entry.get_password() {
            Ok(existing) => existing,
            Err(keyring::Error::NoEntry) => {
                let generated = generate_passphrase();
                entry.set_password(&generated)?;
                generated
            }
            Err(e) => return Err(e.into()),
        };

        let salt = load_or_create_salt(&data_dir.join(SALT_FILE))?;
        Self::from_passphrase(&passphrase, &salt)
    }

    /// Seal a plaintext into a `nonce ‖ ciphertext` blob.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| VaultError::Seal)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Open a blob produced by `seal`. Any tampering, truncation, or key
    /// mismatch fails the authentication tag check.
    pub fn open(&self, blob: &[u8]) -> Result<Vec<u8>, VaultError> {
        if blob.len() < NONCE_LEN {
            return Err(VaultError::Unseal);
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::Unseal)
    }
}

fn generate_passphrase() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn load_or_create_salt(path: &PathBuf) -> Result<Vec<u8>, std::io::Error> {
    if path.exists() {
        let salt = std::fs::read(path)?;
        if salt.len() == SALT_LEN {
            return Ok(salt);
        }
        // Unusable salt file; regenerate below.
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, salt)?;
    Ok(salt.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &[u8] = b"0123456789abcdef";

    #[test]
    fn seal_open_round_trip() {
        let vault = Vault::from_passphrase("correct horse", SALT).expect("vault");
        let blob = vault.seal(b"session record").expect("seal");
        assert_ne!(&blob[NONCE_LEN..], b"session record".as_slice());
        assert_eq!(vault.open(&blob).expect("open"), b"session record");
    }

    #[test]
    fn wrong_passphrase_fails_to_open() {
        let sealer = Vault::from_passphrase("correct horse", SALT).expect("vault");
        let opener = Vault::from_passphrase("battery staple", SALT).expect("vault");
        let blob = sealer.seal(b"secret").expect("seal");
        assert!(matches!(opener.open(&blob), Err(VaultError::Unseal)));
    }

    #[test]
    fn tampered_blob_fails_to_open() {
        let vault = Vault::from_passphrase("correct horse", SALT).expect("vault");
        let mut blob = vault.seal(b"secret").expect("seal");
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(matches!(vault.open(&blob), Err(VaultError::Unseal)));
    }

    #[test]
    fn truncated_blob_fails_to_open() {
        let vault = Vault::from_passphrase("correct horse", SALT).expect("vault");
        assert!(matches!(vault.open(&[0u8; 4]), Err(VaultError::Unseal)));
    }

    #[test]
    fn salt_file_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SALT_FILE);
        let first = load_or_create_salt(&path).expect("create");
        let second = load_or_create_salt(&path).expect("reload");
        assert_eq!(first, second);
        assert_eq!(first.len(), SALT_LEN);
    }
}
