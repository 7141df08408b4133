//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the pipeline layer.

pub mod backup;
pub mod restore;

pub use backup::{handle_backup_command, BackupArgs};
pub use restore::{handle_list_command, handle_restore_command, RestoreArgs};
