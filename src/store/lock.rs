use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing document writes to the collection.
///
/// Uses platform-native flock (Unix) to coordinate between collaborating
/// funnel processes sharing the same store directory.
pub struct WriteLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another funnel process may be writing")]
    Timeout { path: PathBuf },
}

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

impl WriteLock {
    /// Acquire the write lock for a collection directory.
    /// Blocks up to five seconds waiting for a collaborator to finish.
    pub fn acquire(collection_dir: &Path) -> Result<Self, LockError> {
        let lock_path = collection_dir.join(".lock");
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
                    return Ok(WriteLock {
                        _file: file,
                        path: lock_path,
                    });
                }
                Err(_) if start.elapsed() < LOCK_TIMEOUT => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        // Lock is released automatically when the file is dropped (flock
        // semantics); also clean up the lock file
        let _ = fs::remove_file(&self.path);
    }
}

/// Try to acquire an exclusive flock on the file (non-blocking)
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
    // On non-Unix platforms, just succeed (advisory locking)
    Ok(())
}
