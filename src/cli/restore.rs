//! Restore CLI commands
//!
//! Wires the configured collaborators into a [`RestorePipeline`] run and
//! reports the terminal state.

use clap::Args;

use crate::backup::{RestoreOptions, RestoreOutcome, RestorePipeline};
use crate::config::paths::VaultPaths;
use crate::config::settings::Settings;
use crate::error::{VaultError, VaultResult};
use crate::external::mysql::MysqlConnection;
use crate::external::{FsObjectStore, MysqlDriver, ObjectStore};
use crate::index::JsonDumpIndex;

/// Arguments for `dbvault restore`
#[derive(Args)]
pub struct RestoreArgs {
    /// Filename of the dump to restore
    pub filename: Option<String>,

    /// The database to restore into (defaults to the configured one)
    #[arg(long)]
    pub database: Option<String>,

    /// Restore the most recent local dump
    #[arg(long)]
    pub last_dump: bool,

    /// Restore a dump from remote storage by file name
    #[arg(long, value_name = "FILENAME")]
    pub remote_dump: Option<String>,

    /// Restore the most recently recorded remote dump
    #[arg(long)]
    pub remote_last_dump: bool,
}

/// Handle the restore command
pub fn handle_restore_command(
    paths: &VaultPaths,
    settings: &Settings,
    args: RestoreArgs,
) -> VaultResult<()> {
    let database = args
        .database
        .unwrap_or_else(|| settings.database.database.clone());

    let driver = MysqlDriver::new(
        &settings.mysql,
        MysqlConnection {
            host: settings.database.host.clone(),
            user: settings.database.user.clone(),
            password: settings.database.password.clone(),
            database,
        },
    );
    let index = JsonDumpIndex::open(&paths.index_file())?;
    let fs_store = settings.remote.root.as_ref().map(FsObjectStore::new);
    let store = fs_store.as_ref().map(|s| s as &dyn ObjectStore);

    let pipeline = RestorePipeline::new(&driver, &index, store, settings, paths.dumps_dir());

    let outcome = pipeline.run(&RestoreOptions {
        filename: args.filename,
        last_dump: args.last_dump,
        remote_dump: args.remote_dump,
        remote_last_dump: args.remote_last_dump,
    });

    match outcome {
        Ok(RestoreOutcome::Restored { file_name, .. }) => {
            println!("{} was successfully restored.", file_name);
            Ok(())
        }
        Ok(RestoreOutcome::Listing(names)) => {
            print_listing(&names);
            Ok(())
        }
        // Terminal states the user is told about directly; anything else
        // propagates with its originating message.
        Err(VaultError::RestoreFailed) => {
            println!("Database restore failed.");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            println!("No backups have been created.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Handle the list command
pub fn handle_list_command(paths: &VaultPaths) -> VaultResult<()> {
    let mut names = Vec::new();
    let dumps_dir = paths.dumps_dir();

    if dumps_dir.is_dir() {
        for entry in std::fs::read_dir(&dumps_dir)
            .map_err(|e| VaultError::Io(format!("Failed to read dumps directory: {}", e)))?
        {
            let entry =
                entry.map_err(|e| VaultError::Io(format!("Failed to read directory entry: {}", e)))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
    }

    print_listing(&names);
    Ok(())
}

fn print_listing(names: &[String]) {
    if names.is_empty() {
        println!("You haven't saved any dumps.");
        return;
    }

    println!("Please select one of the following dumps:");
    println!();
    for name in names {
        println!("  {}", name);
    }
    println!();
    println!("Total: {} dump(s)", names.len());
}
