//! # Store Lock
//!
//! Exclusive process-level lock beside a file-backed store, taken with
//! `fs2` (flock on Unix, LockFileEx on Windows). The lock file holds the
//! owner's PID for error messages and is left in place on release.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::errors::KVStoreError;

/// Held for as long as the store stays open.
pub(super) struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Lock `<store_path>.lock`, failing at once if another handle holds it.
    pub(super) fn acquire(store_path: &Path) -> Result<Self, KVStoreError> {
        let path = lock_path(store_path);

        // Not truncated before locking: the holder's PID must survive
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| KVStoreError::IOError {
                message: format!("cannot open lock file {}: {}", path.display(), e),
            })?;

        if file.try_lock_exclusive().is_err() {
            let holder = read_pid(&mut file)
                .map(|pid| format!(" by process {}", pid))
                .unwrap_or_default();
            return Err(KVStoreError::IOError {
                message: format!("{} is already in use{}", store_path.display(), holder),
            });
        }

        let pid = std::process::id();
        file.set_len(0)
            .and_then(|_| file.seek(SeekFrom::Start(0)))
            .and_then(|_| writeln!(file, "{}", pid))
            .map_err(|e| KVStoreError::IOError {
                message: format!("cannot write lock file {}: {}", path.display(), e),
            })?;

        tracing::debug!("[al-01] 🔒 Locked {} (pid {})", path.display(), pid);
        Ok(Self { file, path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        tracing::debug!("[al-01] 🔓 Released {}", self.path.display());
    }
}

fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn read_pid(file: &mut File) -> Option<u32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}
