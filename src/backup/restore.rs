//! The restore pipeline
//!
//! Source resolution precedence (first match wins): explicit remote key,
//! latest remote artifact from the index, explicit local filename, latest
//! local dump by numeric filename suffix, or nothing - in which case local
//! dumps are listed for selection and no restore runs.
//!
//! Once a file is located: decompress if the name carries the `.gz`
//! suffix, probe a plain restore, and on failure decrypt in place and try
//! exactly once more. Encryption state is never recorded on disk, so the
//! failed probe is the only signal that a file is encrypted. Artifacts
//! whose index record says `encrypted` skip the doomed probe; files with
//! no record always get it.

use std::path::{Path, PathBuf};

use crate::compress::{is_compressed, Compressor};
use crate::config::Settings;
use crate::crypto::{decrypt_file, derive_key};
use crate::error::{VaultError, VaultResult};
use crate::external::{DatabaseDriver, ObjectStore};
use crate::index::DumpIndex;

/// Per-run restore options
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Explicit local dump filename
    pub filename: Option<String>,
    /// Restore the most recent local dump
    pub last_dump: bool,
    /// Explicit remote dump filename
    pub remote_dump: Option<String>,
    /// Restore the most recent remotely staged artifact
    pub remote_last_dump: bool,
}

/// Terminal state of a restore run
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The database was restored from `file_name`
    Restored {
        file_name: String,
        /// Whether the decrypt fallback was needed
        used_decrypt_fallback: bool,
    },
    /// Nothing was specified; these local dumps are available
    Listing(Vec<String>),
}

/// Orchestrates one restore run
pub struct RestorePipeline<'a> {
    driver: &'a dyn DatabaseDriver,
    index: &'a dyn DumpIndex,
    store: Option<&'a dyn ObjectStore>,
    compressor: Compressor,
    settings: &'a Settings,
    dumps_dir: PathBuf,
}

impl<'a> RestorePipeline<'a> {
    pub fn new(
        driver: &'a dyn DatabaseDriver,
        index: &'a dyn DumpIndex,
        store: Option<&'a dyn ObjectStore>,
        settings: &'a Settings,
        dumps_dir: PathBuf,
    ) -> Self {
        Self {
            driver,
            index,
            store,
            compressor: Compressor::default(),
            settings,
            dumps_dir,
        }
    }

    /// Resolve the source and run the restore state machine
    pub fn run(&self, opts: &RestoreOptions) -> VaultResult<RestoreOutcome> {
        if let Some(name) = &opts.remote_dump {
            return self.restore_from_remote(name, None);
        }

        if opts.remote_last_dump {
            let artifact = self
                .index
                .latest()?
                .ok_or_else(|| VaultError::dump_not_found("latest remote"))?;
            return self.restore_from_remote(&artifact.file_name, Some(artifact.encrypted));
        }

        if let Some(name) = &opts.filename {
            return self.restore_file(&self.dumps_dir.join(name), None);
        }

        if opts.last_dump {
            let name = self
                .latest_local_dump()?
                .ok_or_else(|| VaultError::dump_not_found("latest"))?;
            return self.restore_file(&self.dumps_dir.join(name), None);
        }

        Ok(RestoreOutcome::Listing(self.list_local_dumps()?))
    }

    /// Download a remote dump into the dumps directory, then restore it
    fn restore_from_remote(
        &self,
        file_name: &str,
        known_encrypted: Option<bool>,
    ) -> VaultResult<RestoreOutcome> {
        let store = self.store.ok_or_else(|| {
            VaultError::Config("Remote restore requested but no object store is configured".into())
        })?;

        let key = format!("{}/{}", self.settings.remote.path, file_name);
        let bytes = store.get(&self.settings.remote.bucket, &key)?;

        std::fs::create_dir_all(&self.dumps_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create dumps directory: {}", e)))?;

        let local_path = self.dumps_dir.join(file_name);
        std::fs::write(&local_path, bytes)
            .map_err(|e| VaultError::Io(format!("Failed to save downloaded dump: {}", e)))?;

        self.restore_file(&local_path, known_encrypted)
    }

    /// The probe-then-fallback state machine over one located file
    fn restore_file(
        &self,
        source: &Path,
        known_encrypted: Option<bool>,
    ) -> VaultResult<RestoreOutcome> {
        if !source.is_file() {
            return Err(VaultError::dump_not_found(
                source.display().to_string(),
            ));
        }

        let file_name = source
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());

        // Index record says encrypted: strip the encryption layer first and
        // skip the probe that is known to fail. Legacy and externally
        // supplied files never take this path.
        if known_encrypted == Some(true) {
            let key = derive_key(&self.settings.encryption.passphrase);
            if decrypt_file(source, &key).is_err() {
                return Err(VaultError::RestoreFailed);
            }

            let (work, temp) = self.decompress_if_needed(source)?;
            return match self.driver.restore(&work) {
                Ok(()) => {
                    self.cleanup_temp(temp);
                    Ok(RestoreOutcome::Restored {
                        file_name,
                        used_decrypt_fallback: true,
                    })
                }
                Err(_) => Err(VaultError::RestoreFailed),
            };
        }

        let (work, temp) = self.decompress_if_needed(source)?;

        // First attempt: probe a plain restore. Its failure is absorbed as
        // the signal that the file is encrypted.
        if self.driver.restore(&work).is_ok() {
            self.cleanup_temp(temp);
            return Ok(RestoreOutcome::Restored {
                file_name,
                used_decrypt_fallback: false,
            });
        }

        // Second attempt: decrypt in place, then restore once more. A
        // decrypt failure here means the file was neither restorable nor
        // one of our tokens; both attempts are exhausted either way.
        let key = derive_key(&self.settings.encryption.passphrase);
        if decrypt_file(&work, &key).is_err() {
            return Err(VaultError::RestoreFailed);
        }

        match self.driver.restore(&work) {
            Ok(()) => {
                self.cleanup_temp(temp);
                Ok(RestoreOutcome::Restored {
                    file_name,
                    used_decrypt_fallback: true,
                })
            }
            Err(_) => Err(VaultError::RestoreFailed),
        }
    }

    /// Decompress a `.gz` source to its sibling, remembering the temp path
    fn decompress_if_needed(&self, source: &Path) -> VaultResult<(PathBuf, Option<PathBuf>)> {
        if is_compressed(source) {
            let work = self.compressor.decompress(source)?;
            Ok((work.clone(), Some(work)))
        } else {
            Ok((source.to_path_buf(), None))
        }
    }

    fn cleanup_temp(&self, temp: Option<PathBuf>) {
        if let Some(path) = temp {
            let _ = std::fs::remove_file(path);
        }
    }

    /// All local dump files, sorted by name
    fn list_local_dumps(&self) -> VaultResult<Vec<String>> {
        if !self.dumps_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dumps_dir)
            .map_err(|e| VaultError::Io(format!("Failed to read dumps directory: {}", e)))?
        {
            let entry =
                entry.map_err(|e| VaultError::Io(format!("Failed to read directory entry: {}", e)))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// The local dump with the greatest numeric filename suffix
    ///
    /// Names without a trailing number sort lowest; the first maximum wins
    /// on ties.
    fn latest_local_dump(&self) -> VaultResult<Option<String>> {
        let mut best: Option<(u64, String)> = None;

        for name in self.list_local_dumps()? {
            let key = numeric_suffix(&name);
            let candidate = (key.unwrap_or(0), name);
            match &best {
                Some((best_key, _)) if candidate.0 <= *best_key => {}
                _ => best = Some(candidate),
            }
        }

        Ok(best.map(|(_, name)| name))
    }
}

/// Trailing run of digits in a filename stem, ignoring `.gz` and the final
/// extension
fn numeric_suffix(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".gz").unwrap_or(name);
    let stem = match stem.rfind('.') {
        Some(idx) => &stem[..idx],
        None => stem,
    };

    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits.parse().ok()
}
