//! Custom error types for dbvault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for dbvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// The database driver reported a failed dump; message is verbatim
    #[error("Dump failed: {0}")]
    DumpFailed(String),

    /// The external compressor exited with a non-zero status
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    /// Encryption could not produce a well-formed token
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption produced data whose integrity tag does not match.
    ///
    /// The restore pipeline treats this as a probe signal ("this file was
    /// not encrypted with this key/scheme"); direct decrypt callers treat
    /// it as a hard error.
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// A remote upload or download did not complete
    #[error("Remote transfer failed: {0}")]
    RemoteTransferFailed(String),

    /// Both the plain and the decrypt-fallback restore attempts failed
    #[error("Database restore failed")]
    RestoreFailed,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl VaultError {
    /// Create a "not found" error for dump files
    pub fn dump_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Dump",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for remote objects
    pub fn remote_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Remote object",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an integrity failure (the restore probe signal)
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for dbvault operations
pub type VaultResult<T> = Result<T, VaultError>;
