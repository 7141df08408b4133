//! The dump token scheme: AES-256-CBC with an embedded md5 integrity tag
//!
//! A token is `base64(IV)` with trailing `=` padding stripped (always
//! exactly 22 characters for a 16-byte IV) followed by
//! `base64(ciphertext)`, where the ciphertext covers
//! `plaintext ++ md5_hex(plaintext)` padded with PKCS#7.
//!
//! Nothing on disk marks a file as encrypted; the restore pipeline learns
//! encryption state by probing, so `decrypt` reports every malformed or
//! mismatching input as [`VaultError::Integrity`] rather than a mix of
//! error kinds.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use md5::{Digest, Md5};
use rand::{rngs::OsRng, RngCore};
use std::path::Path;

use crate::error::{VaultError, VaultResult};

use super::DerivedKey;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the CBC initialization vector in bytes (one AES block)
const IV_SIZE: usize = 16;

/// Length of the base64 IV prefix once trailing `=` padding is stripped
const IV_PREFIX_LEN: usize = 22;

/// Length of the hex-encoded md5 integrity tag appended to the plaintext
const TAG_LEN: usize = 32;

/// Encrypt a buffer into a dump token
///
/// Generates a fresh random IV per call. The 22-character check guards
/// against a malformed random source ever emitting a token whose prefix
/// cannot be split back off.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> VaultResult<String> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let iv_b64: String = STANDARD.encode(iv).trim_end_matches('=').to_string();
    if iv_b64.len() != IV_PREFIX_LEN {
        return Err(VaultError::EncryptionFailed(format!(
            "IV prefix is {} characters, expected {}",
            iv_b64.len(),
            IV_PREFIX_LEN
        )));
    }

    // Integrity tag: the hex md5 of the plaintext, appended before encryption
    let tag = format!("{:x}", Md5::digest(plaintext));
    let mut tagged = Vec::with_capacity(plaintext.len() + TAG_LEN);
    tagged.extend_from_slice(plaintext);
    tagged.extend_from_slice(tag.as_bytes());

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| VaultError::EncryptionFailed(format!("Failed to create cipher: {}", e)))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(&tagged);

    Ok(format!("{}{}", iv_b64, STANDARD.encode(ciphertext)))
}

/// Decrypt a dump token back into the original buffer
///
/// Any failure - short token, bad base64, bad padding, or a tag mismatch -
/// comes back as `Integrity`, meaning "this buffer was not encrypted with
/// this key/scheme". The restore pipeline relies on that as a probe signal.
pub fn decrypt(token: &str, key: &DerivedKey) -> VaultResult<Vec<u8>> {
    if token.len() < IV_PREFIX_LEN {
        return Err(VaultError::Integrity("token shorter than IV prefix".into()));
    }
    // A multi-byte character straddling the prefix boundary means this is
    // arbitrary text, not a token; splitting there would panic.
    if !token.is_char_boundary(IV_PREFIX_LEN) {
        return Err(VaultError::Integrity("IV prefix is not ASCII".into()));
    }
    let (iv_b64, body) = token.split_at(IV_PREFIX_LEN);

    let iv = STANDARD
        .decode(format!("{}==", iv_b64))
        .map_err(|e| VaultError::Integrity(format!("Invalid IV encoding: {}", e)))?;
    if iv.len() != IV_SIZE {
        return Err(VaultError::Integrity(format!(
            "Invalid IV size: expected {}, got {}",
            IV_SIZE,
            iv.len()
        )));
    }

    let ciphertext = STANDARD
        .decode(body)
        .map_err(|e| VaultError::Integrity(format!("Invalid ciphertext encoding: {}", e)))?;

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| VaultError::EncryptionFailed(format!("Failed to create cipher: {}", e)))?;
    let tagged = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| VaultError::Integrity("invalid padding".into()))?;

    if tagged.len() < TAG_LEN {
        return Err(VaultError::Integrity("decrypted data shorter than tag".into()));
    }
    let (plaintext, tag) = tagged.split_at(tagged.len() - TAG_LEN);

    let expected = format!("{:x}", Md5::digest(plaintext));
    if tag != expected.as_bytes() {
        return Err(VaultError::Integrity("tag mismatch".into()));
    }

    Ok(plaintext.to_vec())
}

/// Encrypt a file in place
///
/// Reads the whole file into memory, encrypts it, and overwrites the same
/// path with the token. Fails with `NotFound` if the path is not a regular
/// file.
pub fn encrypt_file(path: &Path, key: &DerivedKey) -> VaultResult<()> {
    if !path.is_file() {
        return Err(VaultError::dump_not_found(path.display().to_string()));
    }

    let plaintext = std::fs::read(path)
        .map_err(|e| VaultError::Io(format!("Failed to read file for encryption: {}", e)))?;

    let token = encrypt(&plaintext, key)?;

    std::fs::write(path, token)
        .map_err(|e| VaultError::Io(format!("Failed to write encrypted file: {}", e)))?;

    Ok(())
}

/// Decrypt a file in place
///
/// The inverse of [`encrypt_file`]; the same `Integrity` soft-failure
/// semantics as [`decrypt`] apply when the file was never encrypted.
pub fn decrypt_file(path: &Path, key: &DerivedKey) -> VaultResult<()> {
    if !path.is_file() {
        return Err(VaultError::dump_not_found(path.display().to_string()));
    }

    let contents = std::fs::read(path)
        .map_err(|e| VaultError::Io(format!("Failed to read file for decryption: {}", e)))?;

    let token = std::str::from_utf8(&contents)
        .map_err(|_| VaultError::Integrity("file is not a valid token".into()))?;

    let plaintext = decrypt(token, key)?;

    std::fs::write(path, plaintext)
        .map_err(|e| VaultError::Io(format!("Failed to write decrypted file: {}", e)))?;

    Ok(())
}
