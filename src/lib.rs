//! dbvault - database dump backup and restore tool
//!
//! This library provides the core functionality for dbvault: producing,
//! optionally compressing and encrypting, indexing, and restoring database
//! dump files, optionally staging them in remote object storage.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `crypto`: The dump token scheme (AES-256-CBC with embedded md5 tag)
//! - `compress`: External gzip process wrapper
//! - `naming`: Canonical dump file naming
//! - `index`: Append-only artifact index
//! - `external`: Database driver and object store collaborator seams
//! - `backup`: The backup and restore pipelines
//! - `cli`: Command handlers
//!
//! # Limitations
//!
//! All file transforms read the whole file into memory and write it back,
//! which bounds dump size to available memory. Pipelines are synchronous
//! and take no locks; two backups started within the same second with the
//! same database and prefix can collide on the auto-generated name.

pub mod backup;
pub mod cli;
pub mod compress;
pub mod config;
pub mod crypto;
pub mod error;
pub mod external;
pub mod index;
pub mod naming;

pub use error::{VaultError, VaultResult};
