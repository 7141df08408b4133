//! Cryptographic functions for dbvault
//!
//! Implements the dump token scheme: AES-256-CBC over the plaintext plus an
//! embedded md5 integrity tag, with a SHA-256 passphrase-derived key. The
//! on-disk format is compatible with dumps produced by earlier versions of
//! this tool.

pub mod encryption;
pub mod key_derivation;

pub use encryption::{decrypt, decrypt_file, encrypt, encrypt_file};
pub use key_derivation::{derive_key, DerivedKey};
