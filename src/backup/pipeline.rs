//! The backup pipeline
//!
//! Linear stages: dump, compress (config toggle), encrypt (per-run toggle),
//! record, upload (per-run toggle). Any stage failure is terminal; a partial
//! dump file from a failed later stage is left on disk, matching the tool's
//! historical behavior.

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::compress::Compressor;
use crate::config::Settings;
use crate::crypto::{derive_key, encrypt_file};
use crate::error::{VaultError, VaultResult};
use crate::external::{DatabaseDriver, ObjectStore};
use crate::index::{DumpArtifact, DumpIndex};
use crate::naming::FileNamer;

/// Per-run backup options
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// User-supplied filename or path; auto-generated when absent
    pub filename: Option<String>,
    /// Database identifier used in auto-generated names
    pub database: String,
    /// Prefix for auto-generated names
    pub prefix: String,
    /// Encrypt the dump after any compression
    pub encrypt: bool,
    /// Upload the finished artifact to remote storage
    pub upload: bool,
    /// Delete the local file after a successful upload
    pub keep_only_remote: bool,
}

/// What a completed backup run produced
#[derive(Debug)]
pub struct BackupReport {
    pub artifact: DumpArtifact,
    pub uploaded: bool,
    pub local_removed: bool,
}

/// Orchestrates one backup run
pub struct BackupPipeline<'a> {
    driver: &'a dyn DatabaseDriver,
    index: &'a mut dyn DumpIndex,
    store: Option<&'a dyn ObjectStore>,
    compressor: Compressor,
    settings: &'a Settings,
    dumps_dir: PathBuf,
}

impl<'a> BackupPipeline<'a> {
    pub fn new(
        driver: &'a dyn DatabaseDriver,
        index: &'a mut dyn DumpIndex,
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

    /// Run the pipeline to completion
    pub fn run(&mut self, opts: &BackupOptions) -> VaultResult<BackupReport> {
        std::fs::create_dir_all(&self.dumps_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create dumps directory: {}", e)))?;

        let (mut path, mut name) = FileNamer::resolve(
            opts.filename.as_deref(),
            &opts.database,
            &self.dumps_dir,
            &opts.prefix,
        );

        // Dumping: the driver's status message is surfaced verbatim. No
        // cleanup of a partial dump file is attempted.
        self.driver.dump(&path).map_err(VaultError::DumpFailed)?;

        // Compressing: the suffix joins the canonical name and path before
        // encryption runs.
        if self.settings.compress {
            path = self.compressor.compress(&path)?;
            name.push_str(crate::compress::GZ_SUFFIX);
        }

        // Encrypting: never changes the name.
        if opts.encrypt {
            let key = derive_key(&self.settings.encryption.passphrase);
            encrypt_file(&path, &key)?;
        }

        let remote_key = if opts.upload {
            Some(format!("{}/{}", self.settings.remote.path, name))
        } else {
            None
        };

        // Recording happens after local processing and before any upload,
        // so the index may reference local-only artifacts.
        let artifact = DumpArtifact {
            id: Uuid::new_v4(),
            file_name: name,
            file_path: path.clone(),
            prefix: opts.prefix.clone(),
            encrypted: opts.encrypt,
            created_at: Utc::now(),
            remote_key: remote_key.clone(),
        };
        self.index.append(artifact.clone())?;

        let mut uploaded = false;
        let mut local_removed = false;

        if let Some(key) = remote_key {
            let store = self.store.ok_or_else(|| {
                VaultError::Config("Upload requested but no object store is configured".into())
            })?;

            store.put(&self.settings.remote.bucket, &key, &path)?;
            uploaded = true;

            if opts.keep_only_remote {
                std::fs::remove_file(&path)
                    .map_err(|e| VaultError::Io(format!("Failed to remove local dump: {}", e)))?;
                local_removed = true;
            }
        }

        Ok(BackupReport {
            artifact,
            uploaded,
            local_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fs_store::FsObjectStore;
    use crate::external::DriverResult;
    use crate::index::JsonDumpIndex;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Driver that writes a canned dump, or fails with a fixed message
    struct FakeDriver {
        content: &'static [u8],
        fail_dump: Option<&'static str>,
        dump_calls: RefCell<u32>,
    }

    impl FakeDriver {
        fn ok(content: &'static [u8]) -> Self {
            Self {
                content,
                fail_dump: None,
                dump_calls: RefCell::new(0),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                content: b"",
                fail_dump: Some(message),
                dump_calls: RefCell::new(0),
            }
        }
    }

    impl DatabaseDriver for FakeDriver {
        fn dump(&self, path: &Path) -> DriverResult {
            *self.dump_calls.borrow_mut() += 1;
            if let Some(msg) = self.fail_dump {
                return Err(msg.to_string());
            }
            std::fs::write(path, self.content).map_err(|e| e.to_string())
        }

        fn restore(&self, _path: &Path) -> DriverResult {
            Ok(())
        }
    }

    fn test_settings(compress: bool) -> Settings {
        let mut settings = Settings::default();
        settings.compress = compress;
        settings.encryption.passphrase = "hunter2".to_string();
        settings.remote.bucket = "test-bucket".to_string();
        settings
    }

    fn opts() -> BackupOptions {
        BackupOptions {
            filename: None,
            database: "mysql".to_string(),
            prefix: "t-".to_string(),
            encrypt: false,
            upload: false,
            keep_only_remote: false,
        }
    }

    #[test]
    fn test_plain_backup_records_artifact() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::ok(b"CREATE TABLE t;");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(false);

        let report = BackupPipeline::new(
            &driver,
            &mut index,
            None,
            &settings,
            dir.path().join("dumps"),
        )
        .run(&opts())
        .unwrap();

        assert!(report.artifact.file_name.starts_with("t-mysql-"));
        assert!(report.artifact.file_name.ends_with(".sql"));
        assert!(!report.artifact.encrypted);
        assert!(report.artifact.remote_key.is_none());
        assert!(!report.uploaded);
        assert!(report.artifact.file_path.exists());

        let latest = index.latest().unwrap().unwrap();
        assert_eq!(latest.file_name, report.artifact.file_name);
    }

    #[test]
    fn test_failed_dump_surfaces_message_verbatim_and_records_nothing() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::failing("mysqldump: Got error 1045");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(false);

        let err = BackupPipeline::new(
            &driver,
            &mut index,
            None,
            &settings,
            dir.path().join("dumps"),
        )
        .run(&opts())
        .unwrap_err();

        assert!(matches!(err, VaultError::DumpFailed(ref m) if m == "mysqldump: Got error 1045"));
        assert_eq!(*driver.dump_calls.borrow(), 1);
        assert!(index.latest().unwrap().is_none());
    }

    #[test]
    fn test_encrypted_backup_keeps_name_and_flags_artifact() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::ok(b"INSERT INTO t VALUES (1);");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(false);

        let mut o = opts();
        o.encrypt = true;

        let report = BackupPipeline::new(
            &driver,
            &mut index,
            None,
            &settings,
            dir.path().join("dumps"),
        )
        .run(&o)
        .unwrap();

        // Encryption adds no name marker
        assert!(report.artifact.file_name.ends_with(".sql"));
        assert!(report.artifact.encrypted);

        // On-disk bytes are a token now, not the dump
        let on_disk = std::fs::read(&report.artifact.file_path).unwrap();
        assert_ne!(on_disk, b"INSERT INTO t VALUES (1);");

        let key = derive_key("hunter2");
        let token = String::from_utf8(on_disk).unwrap();
        let plain = crate::crypto::decrypt(&token, &key).unwrap();
        assert_eq!(plain, b"INSERT INTO t VALUES (1);");
    }

    #[test]
    fn test_compressed_backup_gains_gz_suffix_before_encryption() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::ok(b"SELECT 1;\n");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(true);

        let mut o = opts();
        o.encrypt = true;

        let report = BackupPipeline::new(
            &driver,
            &mut index,
            None,
            &settings,
            dir.path().join("dumps"),
        )
        .run(&o)
        .unwrap();

        assert!(report.artifact.file_name.ends_with(".sql.gz"));
        assert_eq!(
            report.artifact.file_path.file_name().unwrap().to_string_lossy(),
            report.artifact.file_name
        );

        // The encrypted token covers the gzip bytes
        let key = derive_key("hunter2");
        let token = std::fs::read_to_string(&report.artifact.file_path).unwrap();
        let gz_bytes = crate::crypto::decrypt(&token, &key).unwrap();
        assert_eq!(&gz_bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_upload_records_remote_key_and_keep_only_remote_deletes_local() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::ok(b"data");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(false);
        let store = FsObjectStore::new(dir.path().join("remote"));

        let mut o = opts();
        o.upload = true;
        o.keep_only_remote = true;

        let report = BackupPipeline::new(
            &driver,
            &mut index,
            Some(&store),
            &settings,
            dir.path().join("dumps"),
        )
        .run(&o)
        .unwrap();

        assert!(report.uploaded);
        assert!(report.local_removed);
        assert!(!report.artifact.file_path.exists());

        let key = report.artifact.remote_key.as_ref().unwrap();
        assert_eq!(key, &format!("backups/{}", report.artifact.file_name));

        let bytes = store.get("test-bucket", key).unwrap();
        assert_eq!(bytes, b"data");
    }

    #[test]
    fn test_failed_upload_keeps_local_file_and_index_record() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::ok(b"data");
        let mut index = JsonDumpIndex::open(&dir.path().join("index.json")).unwrap();
        let settings = test_settings(false);

        /// Store whose uploads always fail
        struct FailingStore;
        impl ObjectStore for FailingStore {
            fn put(&self, _: &str, _: &str, _: &Path) -> VaultResult<()> {
                Err(VaultError::RemoteTransferFailed("connection reset".into()))
            }
            fn get(&self, _: &str, _: &str) -> VaultResult<Vec<u8>> {
                Err(VaultError::RemoteTransferFailed("connection reset".into()))
            }
        }

        let mut o = opts();
        o.upload = true;
        o.keep_only_remote = true;

        let err = BackupPipeline::new(
            &driver,
            &mut index,
            Some(&FailingStore),
            &settings,
            dir.path().join("dumps"),
        )
        .run(&o)
        .unwrap_err();

        assert!(matches!(err, VaultError::RemoteTransferFailed(_)));

        // Recording happened before the upload, and the local file survived
        let latest = index.latest().unwrap().unwrap();
        assert!(latest.file_path.exists());
    }
}
