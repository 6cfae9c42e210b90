//! Storage interface behind the route cache.
//!
//! The `Store` trait is a plain key-value interface over bytes. Providers
//! decide where the bytes live; the [`RouteCache`](super::RouteCache)
//! layered on top owns keys, serialization and expiry.
//!
//! # Design Principles
//!
//! - **String keys**: providers may restrict the alphabet (see [`is_valid_key`])
//! - **Vec<u8> values**: no serialization opinions imposed on providers
//! - **Per-key atomicity**: a `put` is either fully visible or not at all
//! - **Synchronous**: every operation fails fast, nothing waits on a lock
//!   held across I/O

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Maximum store key length in bytes.
pub const MAX_KEY_LEN: usize = 128;

/// Errors that can occur during storage operations.
///
/// A missing entry is never an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from the persistence medium.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A payload could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is empty, too long, or contains characters the provider rejects.
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Key-value persistence with per-key atomic put/get.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Operations on different keys must
/// not block one another; concurrent operations on the same key resolve as
/// "last completed write wins".
pub trait Store: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Readers observe either the previous value or the new one, never a
    /// partial write.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Retrieve the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the medium failed
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete the value stored under `key`.
    ///
    /// Returns `Ok(true)` if the key existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete the value under `key` only if it still equals `expected`.
    ///
    /// Returns `Ok(true)` if the entry was removed. A value replaced after
    /// the caller read it is left in place and yields `Ok(false)`.
    fn delete_if(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Whether `key` is safe to use with every provider.
///
/// Accepts 1..=[`MAX_KEY_LEN`] ASCII alphanumerics, `-` and `_`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
