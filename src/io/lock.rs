use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside the store directory
pub const LOCK_FILE: &str = ".lock";

/// Advisory lock serializing writers of a store directory.
///
/// Uses flock (Unix) so the TUI's publisher thread and one-shot CLI
/// commands never interleave writes to the same entity file. The lock is
/// released when the handle drops; the file itself stays in place.
pub struct StoreLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another tickboard process is writing")]
    Timeout { path: PathBuf },
}

impl StoreLock {
    /// Acquire the store lock, waiting up to `timeout`
    pub fn acquire(store_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = store_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(StoreLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    /// Acquire with the default timeout (2 seconds)
    pub fn acquire_default(store_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(store_dir, Duration::from_secs(2))
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_and_release() {
        let tmp = TempDir::new().unwrap();

        let lock = StoreLock::acquire_default(tmp.path());
        assert!(lock.is_ok());
        drop(lock);

        let again = StoreLock::acquire_default(tmp.path());
        assert!(again.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = StoreLock::acquire_default(tmp.path()).unwrap();
        let second = StoreLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
