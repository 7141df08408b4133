//! User settings for dbvault
//!
//! Manages the backup configuration: database command locations, remote
//! storage coordinates, the encryption passphrase, and compression.

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::VaultError;

/// Locations of the database client binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlSettings {
    /// Directory containing `mysqldump`
    pub dump_command_dir: String,
    /// Directory containing `mysql`
    pub restore_command_dir: String,
}

impl Default for MysqlSettings {
    fn default() -> Self {
        Self {
            dump_command_dir: "/usr/bin".to_string(),
            restore_command_dir: "/usr/bin".to_string(),
        }
    }
}

/// Connection parameters for the configured database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Database name; also the identifier used in auto-generated dump names
    #[serde(default)]
    pub database: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_user() -> String {
    "root".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            user: default_user(),
            password: String::new(),
            database: String::new(),
        }
    }
}

/// Remote object storage settings
///
/// Key names for bucket/region/credentials are opaque external
/// configuration; the environment overlay recognizes the conventional
/// variable names but they are not a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Path segment prepended to remote object keys
    #[serde(default = "default_remote_path")]
    pub path: String,

    /// Bucket name
    #[serde(default)]
    pub bucket: String,

    /// Region
    #[serde(default = "default_region")]
    pub region: String,

    /// Access key id
    #[serde(default)]
    pub access_key: String,

    /// Secret access key
    #[serde(default)]
    pub secret_key: String,

    /// Filesystem root for the directory-backed object store
    ///
    /// When set, uploads and remote restores go through [`FsObjectStore`]
    /// rooted here (mounted storage, test fixtures). A real S3 client is an
    /// external collaborator behind the same trait.
    ///
    /// [`FsObjectStore`]: crate::external::FsObjectStore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

fn default_remote_path() -> String {
    "backups".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            path: default_remote_path(),
            bucket: String::new(),
            region: default_region(),
            access_key: String::new(),
            secret_key: String::new(),
            root: None,
        }
    }
}

/// Encryption settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EncryptionSettings {
    /// Passphrase the encryption key is derived from
    #[serde(default)]
    pub passphrase: String,
}

/// User settings for dbvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Database client binary locations
    #[serde(default)]
    pub mysql: MysqlSettings,

    /// Database connection parameters
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Remote object storage coordinates
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Encryption settings
    #[serde(default)]
    pub encryption: EncryptionSettings,

    /// Whether dumps are gzip-compressed before encryption/upload
    #[serde(default = "default_compress")]
    pub compress: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_compress() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            mysql: MysqlSettings::default(),
            database: DatabaseSettings::default(),
            remote: RemoteSettings::default(),
            encryption: EncryptionSettings::default(),
            compress: default_compress(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str(&contents)
                .map_err(|e| VaultError::Config(format!("Failed to parse settings file: {}", e)))?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| VaultError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Overlay credentials and passphrase from the environment
    fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("S3_BUCKET") {
            self.remote.bucket = bucket;
        }
        if let Ok(key) = std::env::var("AWS_ACCESS_KEY_ID") {
            self.remote.access_key = key;
        }
        if let Ok(secret) = std::env::var("AWS_SECRET_ACCESS_KEY") {
            self.remote.secret_key = secret;
        }
        if let Ok(passphrase) = std::env::var("ENCRYPT_KEY") {
            self.encryption.passphrase = passphrase;
        }
    }
}
