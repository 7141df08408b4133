//! External collaborators
//!
//! The pipelines talk to the database and to remote storage only through
//! the traits here, so tests can script them and the real implementations
//! stay swappable.

pub mod fs_store;
pub mod mysql;

use std::path::Path;

use crate::error::VaultResult;

pub use fs_store::FsObjectStore;
pub use mysql::MysqlDriver;

/// Outcome of a driver invocation
///
/// Failure carries the driver's status message verbatim; the backup
/// pipeline surfaces it unchanged.
pub type DriverResult = Result<(), String>;

/// Database dump/restore executor
pub trait DatabaseDriver {
    /// Dump the database to `path`
    fn dump(&self, path: &Path) -> DriverResult;

    /// Restore the database from `path`
    fn restore(&self, path: &Path) -> DriverResult;
}

/// Remote object store
pub trait ObjectStore {
    /// Upload a local file under `key`
    fn put(&self, bucket: &str, key: &str, local_path: &Path) -> VaultResult<()>;

    /// Fetch an object's bytes
    fn get(&self, bucket: &str, key: &str) -> VaultResult<Vec<u8>>;
}
