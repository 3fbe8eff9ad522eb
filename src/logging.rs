//! The per-entity file logger collaborator.
//!
//! This is the protocol's own audit trail (`site<i>.log`, `token.log`, and
//! the union `commonLog.log`), distinct from the operator-facing `tracing`
//! subscriber initialized in `main`. It is deliberately simple: append a
//! line to a named file, and mirror every line into `commonLog.log` too.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::InitError;

const COMMON_LOG: &str = "commonLog.log";

/// Append-only per-file logger rooted at a single directory, cleared and
/// recreated at startup.
pub struct FileLogger {
    dir: PathBuf,
    // Serializes all appends so concurrent writers (listeners, the main
    // cycle, release daemons, periodic state loggers) never interleave
    // partial lines within or across files.
    write_lock: Mutex<()>,
}

impl FileLogger {
    /// Clear and recreate `dir`, returning a logger rooted there.
    pub fn init(dir: &Path) -> Result<Self, InitError> {
        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|source| InitError::LogDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::create_dir_all(dir).map_err(|source| InitError::LogDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(FileLogger {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Append `message` to `log_name`, and (unless `log_name` already *is*
    /// the common log) mirror it into `commonLog.log` too.
    pub fn append(&self, log_name: &str, message: &str) -> Result<(), InitError> {
        let _guard = self.write_lock.lock();
        self.append_locked(log_name, message)?;
        if log_name != COMMON_LOG {
            self.append_locked(COMMON_LOG, message)?;
        }
        Ok(())
    }

    fn append_locked(&self, log_name: &str, message: &str) -> Result<(), InitError> {
        let path = self.dir.join(log_name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| InitError::LogWrite {
                path: path.clone(),
                source,
            })?;
        file.write_all(message.as_bytes())
            .map_err(|source| InitError::LogWrite { path, source })
    }
}
