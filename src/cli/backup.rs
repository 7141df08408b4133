//! Backup CLI command
//!
//! Wires the configured collaborators into a [`BackupPipeline`] run and
//! reports the result.

use clap::Args;

use crate::backup::{BackupOptions, BackupPipeline};
use crate::config::paths::VaultPaths;
use crate::config::settings::Settings;
use crate::error::VaultResult;
use crate::external::mysql::MysqlConnection;
use crate::external::{FsObjectStore, MysqlDriver, ObjectStore};
use crate::index::JsonDumpIndex;

/// Arguments for `dbvault backup`
#[derive(Args)]
pub struct BackupArgs {
    /// Filename or path for the dump (auto-generated when omitted)
    pub filename: Option<String>,

    /// The database to back up (defaults to the configured one)
    #[arg(long)]
    pub database: Option<String>,

    /// Prefix for auto-generated dump names (defaults to today's date)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Encrypt the dump
    #[arg(long)]
    pub encrypt: bool,

    /// Upload the dump to remote storage
    #[arg(long)]
    pub upload: bool,

    /// Delete the local dump after a successful upload
    #[arg(long)]
    pub keep_only_remote: bool,
}

/// Handle the backup command
pub fn handle_backup_command(
    paths: &VaultPaths,
    settings: &Settings,
    args: BackupArgs,
) -> VaultResult<()> {
    let database = args
        .database
        .unwrap_or_else(|| settings.database.database.clone());
    let prefix = args
        .prefix
        .unwrap_or_else(|| format!("{}-", chrono::Local::now().format("%Y-%m-%d")));

    let driver = MysqlDriver::new(
        &settings.mysql,
        MysqlConnection {
            host: settings.database.host.clone(),
            user: settings.database.user.clone(),
            password: settings.database.password.clone(),
            database: database.clone(),
        },
    );
    let mut index = JsonDumpIndex::open(&paths.index_file())?;
    let fs_store = settings.remote.root.as_ref().map(FsObjectStore::new);
    let store = fs_store.as_ref().map(|s| s as &dyn ObjectStore);

    let report = BackupPipeline::new(&driver, &mut index, store, settings, paths.dumps_dir()).run(
        &BackupOptions {
            filename: args.filename,
            database,
            prefix,
            encrypt: args.encrypt,
            upload: args.upload,
            keep_only_remote: args.keep_only_remote,
        },
    )?;

    println!(
        "{} was successfully dumped to {}",
        report.artifact.file_name,
        report.artifact.file_path.display()
    );

    if report.uploaded {
        println!(
            "Dump uploaded to remote storage as {}",
            report.artifact.remote_key.as_deref().unwrap_or_default()
        );
    }
    if report.local_removed {
        println!("Local dump removed.");
    }

    Ok(())
}
