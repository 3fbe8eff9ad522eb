//! Typed error surface for the fault classes this system actually has.
//!
//! The protocol itself has no in-band error states (see the crate-level
//! design notes): every fallible operation here happens at startup, around
//! the logging collaborator's interaction with the filesystem.

use std::io;
use std::path::PathBuf;

/// Fatal initialization faults, and the one steady-state fault the logging
/// collaborator can hit (a failed write, which callers treat as non-fatal
/// and report through `tracing` rather than unwinding the simulation).
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to prepare log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
