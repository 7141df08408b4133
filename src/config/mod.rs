//! Configuration module for dbvault
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence
//! - Environment variable overlays for credentials

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::Settings;
