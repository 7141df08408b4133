use anyhow::Result;
use clap::{Parser, Subcommand};

use dbvault::cli::{handle_backup_command, handle_list_command, handle_restore_command};
use dbvault::config::{paths::VaultPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "dbvault",
    version,
    about = "Database dump backup and restore tool",
    long_about = "dbvault dumps a database to a local file, optionally compresses and \
                  encrypts it, records the artifact in an index, and can stage it in \
                  remote object storage. Restore locates a dump locally or remotely \
                  and feeds it back to the database."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up the database to the dumps directory
    Backup(dbvault::cli::BackupArgs),

    /// Restore a database dump
    Restore(dbvault::cli::RestoreArgs),

    /// List saved dumps
    List,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Backup(args) => handle_backup_command(&paths, &settings, args)?,
        Commands::Restore(args) => handle_restore_command(&paths, &settings, args)?,
        Commands::List => handle_list_command(&paths)?,
        Commands::Config => show_config(&paths, &settings)?,
    }

    Ok(())
}

fn show_config(paths: &VaultPaths, settings: &Settings) -> Result<()> {
    // First run: persist an editable template. Defaults are written rather
    // than the loaded settings so environment overlays stay off disk.
    if !paths.is_initialized() {
        Settings::default().save(paths)?;
        println!("Wrote default settings to {}", paths.settings_file().display());
        println!();
    }

    println!("dbvault configuration");
    println!("=====================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Dumps directory: {}", paths.dumps_dir().display());
    println!("Settings file: {}", paths.settings_file().display());
    println!("Index file: {}", paths.index_file().display());
    println!();
    println!("Database: {}", settings.database.database);
    println!("Compression: {}", if settings.compress { "on" } else { "off" });
    println!(
        "Encryption passphrase: {}",
        if settings.encryption.passphrase.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!(
        "Remote bucket: {}",
        if settings.remote.bucket.is_empty() {
            "not set"
        } else {
            &settings.remote.bucket
        }
    );

    Ok(())
}
