//! Directory-backed object store
//!
//! Stores objects as plain files under `<root>/<bucket>/<key>`. Used by the
//! test suite and for staging dumps onto mounted storage; a real S3 client
//! plugs in behind the same [`ObjectStore`] trait.

use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};

use super::ObjectStore;

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, bucket: &str, key: &str, local_path: &Path) -> VaultResult<()> {
        let target = self.object_path(bucket, key);

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                VaultError::RemoteTransferFailed(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        std::fs::copy(local_path, &target).map_err(|e| {
            VaultError::RemoteTransferFailed(format!(
                "upload of {} failed: {}",
                local_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> VaultResult<Vec<u8>> {
        let source = self.object_path(bucket, key);

        if !source.is_file() {
            return Err(VaultError::remote_not_found(key));
        }

        std::fs::read(&source)
            .map_err(|e| VaultError::RemoteTransferFailed(format!("download of {} failed: {}", key, e)))
    }
}
