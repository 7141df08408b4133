//! Backup and restore orchestration
//!
//! Two pipelines built from the same collaborators:
//!
//! - [`BackupPipeline`]: dump, optionally compress and encrypt, record the
//!   artifact in the index, optionally upload.
//! - [`RestorePipeline`]: locate a source (remote key, latest remote,
//!   local name, latest local, or list), then restore it with the
//!   probe-then-fallback state machine.
//!
//! Encryption state is never written into the filename or a sidecar, so
//! restore cannot dispatch on format; it probes a plain restore and treats
//! failure as the signal that the file is encrypted.

mod pipeline;
mod restore;

pub use pipeline::{BackupOptions, BackupPipeline, BackupReport};
pub use restore::{RestoreOptions, RestoreOutcome, RestorePipeline};
