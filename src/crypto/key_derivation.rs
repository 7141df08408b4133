//! Key derivation for the dump token scheme
//!
//! Derives a 256-bit AES key as a single SHA-256 hash of the passphrase.
//! There is no per-install salt: the same passphrase always yields the same
//! key, which keeps previously produced dumps decryptable. This is a known
//! weakness of the scheme and is preserved for compatibility.

use sha2::{Digest, Sha256};

/// A derived encryption key
pub struct DerivedKey {
    /// The 32-byte key for AES-256
    key: [u8; 32],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        // Zero out the key when dropped
        self.key.iter_mut().for_each(|b| *b = 0);
    }
}

/// Derive an encryption key from a passphrase
pub fn derive_key(passphrase: &str) -> DerivedKey {
    let digest = Sha256::digest(passphrase.as_bytes());

    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);

    DerivedKey { key }
}
