//! Gzip compression via the external `gzip` binary
//!
//! Compression state is signaled by the `.gz` filename suffix and nothing
//! else; file content is never inspected. `gzip` itself removes the
//! uncompressed original on success, and decompression writes a sibling
//! file, leaving the compressed one for the caller to clean up.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{VaultError, VaultResult};

/// Filename suffix marking a compressed dump
pub const GZ_SUFFIX: &str = ".gz";

/// Wrapper around the external gzip process
#[derive(Debug, Clone)]
pub struct Compressor {
    /// Name or path of the gzip binary
    gzip: String,
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            gzip: "gzip".to_string(),
        }
    }
}

impl Compressor {
    /// Create a compressor using a specific gzip binary
    pub fn with_binary(gzip: impl Into<String>) -> Self {
        Self { gzip: gzip.into() }
    }

    /// Compress a file, returning the new `.gz` path
    ///
    /// Runs `gzip -9 <path>`; gzip replaces the original with the
    /// compressed file as its own side effect.
    pub fn compress(&self, path: &Path) -> VaultResult<PathBuf> {
        let status = Command::new(&self.gzip)
            .arg("-9")
            .arg(path)
            .status()
            .map_err(|e| {
                VaultError::CompressionFailed(format!("failed to run {}: {}", self.gzip, e))
            })?;

        if !status.success() {
            return Err(VaultError::CompressionFailed(format!(
                "{} -9 {} exited with {}",
                self.gzip,
                path.display(),
                status
            )));
        }

        Ok(append_gz_suffix(path))
    }

    /// Decompress a `.gz` file to its suffix-stripped sibling path
    ///
    /// Runs `gzip -dc <path>` with stdout redirected to the sibling, so the
    /// compressed file stays on disk until the caller cleans it up.
    pub fn decompress(&self, path: &Path) -> VaultResult<PathBuf> {
        let target = strip_gz_suffix(path);

        let out = std::fs::File::create(&target)
            .map_err(|e| VaultError::Io(format!("Failed to create decompressed file: {}", e)))?;

        let status = Command::new(&self.gzip)
            .arg("-dc")
            .arg(path)
            .stdout(Stdio::from(out))
            .status()
            .map_err(|e| {
                VaultError::CompressionFailed(format!("failed to run {}: {}", self.gzip, e))
            })?;

        if !status.success() {
            return Err(VaultError::CompressionFailed(format!(
                "{} -dc {} exited with {}",
                self.gzip,
                path.display(),
                status
            )));
        }

        Ok(target)
    }
}

/// Whether a path carries the compression suffix
pub fn is_compressed(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GZ_SUFFIX)
}

/// Append the `.gz` suffix to a path
pub fn append_gz_suffix(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{}", path.display(), GZ_SUFFIX))
}

/// Strip a trailing `.gz` suffix, if present
pub fn strip_gz_suffix(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_suffix(GZ_SUFFIX) {
        Some(stripped) => PathBuf::from(stripped),
        None => path.to_path_buf(),
    }
}
