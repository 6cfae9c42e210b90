//! In-memory store provider using dashmap.
//!
//! Entries live in a sharded concurrent map: writers only lock the shard
//! that owns their key, so different keys proceed in parallel.

use dashmap::DashMap;

use crate::cache::traits::{check_key, Store, StoreError};

/// In-memory store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        check_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    fn delete_if(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError> {
        check_key(key)?;
        Ok(self
            .entries
            .remove_if(key, |_, value| value.as_slice() == expected)
            .is_some())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
