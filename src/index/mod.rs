//! Artifact index for dbvault
//!
//! An append-only, insertion-ordered log of produced dump artifacts with a
//! "most recent" query. The contract here is pure ordering/query;
//! persistence is delegated to a durable store, of which [`JsonDumpIndex`]
//! is the file-backed implementation shipped with the tool.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{VaultError, VaultResult};

/// Metadata record for a single produced backup file
///
/// Created once at the end of a successful backup pipeline, immediately
/// before any remote upload; never mutated afterwards. `encrypted` reflects
/// the last transformation applied by this tool - it says nothing about
/// files supplied from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpArtifact {
    /// Unique id
    pub id: Uuid,
    /// Final file name, including any `.gz` suffix
    pub file_name: String,
    /// Full path to the file; its final segment always equals `file_name`
    pub file_path: PathBuf,
    /// Prefix the name was generated with
    pub prefix: String,
    /// Whether this tool encrypted the file
    pub encrypted: bool,
    /// When the artifact was recorded
    pub created_at: DateTime<Utc>,
    /// Remote object key, when the artifact was staged remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
}

/// Ordering/query contract of the artifact log
pub trait DumpIndex {
    /// Append one artifact record
    fn append(&mut self, artifact: DumpArtifact) -> VaultResult<()>;

    /// The artifact with the greatest `created_at`, if any
    fn latest(&self) -> VaultResult<Option<DumpArtifact>>;

    /// All records in insertion order
    fn all(&self) -> VaultResult<Vec<DumpArtifact>>;
}

/// JSON-file-backed artifact index
///
/// Loads the whole log on open and rewrites the file on every append; dump
/// counts are small enough that this stays simple.
#[derive(Debug)]
pub struct JsonDumpIndex {
    path: PathBuf,
    entries: Vec<DumpArtifact>,
}

impl JsonDumpIndex {
    /// Open the index at `path`, creating an empty one if the file is missing
    pub fn open(path: &Path) -> VaultResult<Self> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| VaultError::Io(format!("Failed to read index file: {}", e)))?;
            serde_json::from_str(&contents)
                .map_err(|e| VaultError::Json(format!("Failed to parse index file: {}", e)))?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn persist(&self) -> VaultResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VaultError::Io(format!("Failed to create index directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| VaultError::Json(format!("Failed to serialize index: {}", e)))?;

        std::fs::write(&self.path, contents)
            .map_err(|e| VaultError::Io(format!("Failed to write index file: {}", e)))?;

        Ok(())
    }
}

impl DumpIndex for JsonDumpIndex {
    fn append(&mut self, artifact: DumpArtifact) -> VaultResult<()> {
        self.entries.push(artifact);
        self.persist()
    }

    fn latest(&self) -> VaultResult<Option<DumpArtifact>> {
        Ok(self
            .entries
            .iter()
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    fn all(&self) -> VaultResult<Vec<DumpArtifact>> {
        Ok(self.entries.clone())
    }
}
