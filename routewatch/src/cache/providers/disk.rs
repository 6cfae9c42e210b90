//! On-disk store provider.
//!
//! One file per key under a single directory. Writes go to a uniquely
//! named temp file in the same directory, are flushed with `sync_all`, and
//! are then renamed over the destination, so readers only ever see a
//! complete previous or complete new file.
//!
//! A conditional delete first renames the entry aside, then compares it.
//! An entry that changed since the caller read it is linked back unless a
//! newer write has already landed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::cache::traits::{check_key, Store, StoreError};

/// Extension of committed entry files.
const ENTRY_EXTENSION: &str = "json";

/// Directory-backed store.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl DiskStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!(dir = %dir.display(), "Opened disk store");
        Ok(Self {
            dir,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of the entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    fn scratch_path(&self, key: &str, suffix: &str) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.{}", key, process::id(), n, suffix))
    }

    fn remove_scratch(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }

    /// Put a claimed entry back at `path` without clobbering a newer write.
    fn restore(claimed: &Path, path: &Path) {
        match fs::hard_link(claimed, path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                // No hard links on this filesystem.
                if !path.exists() {
                    if let Err(e) = fs::rename(claimed, path) {
                        warn!(path = %path.display(), error = %e, "Failed to restore cache entry");
                    }
                    return;
                }
                debug!(path = %path.display(), error = %e, "Entry rewritten while claimed");
            }
        }
        Self::remove_scratch(claimed);
    }

    fn write_temp(path: &Path, value: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(value)?;
        file.sync_all()
    }
}

impl Store for DiskStore {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.entry_path(key);
        let temp_path = self.scratch_path(key, "tmp");

        if let Err(e) = Self::write_temp(&temp_path, &value) {
            Self::remove_scratch(&temp_path);
            return Err(StoreError::io(temp_path, e));
        }

        // Atomic rename
        if let Err(e) = fs::rename(&temp_path, &path) {
            Self::remove_scratch(&temp_path);
            return Err(StoreError::io(path, e));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        check_key(key)?;
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn delete_if(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError> {
        check_key(key)?;
        let path = self.entry_path(key);
        let claimed = self.scratch_path(key, "evict");

        match fs::rename(&path, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io(path, e)),
        }

        let current = match fs::read(&claimed) {
            Ok(bytes) => bytes,
            Err(e) => {
                Self::restore(&claimed, &path);
                return Err(StoreError::io(claimed, e));
            }
        };

        if current == expected {
            Self::remove_scratch(&claimed);
            Ok(true)
        } else {
            Self::restore(&claimed, &path);
            Ok(false)
        }
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
