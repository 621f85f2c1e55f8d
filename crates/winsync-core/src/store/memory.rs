use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::errors::StoreError;
use super::traits::{KeyValueStore, validate_key};

/// In-process store, used by tests and as a fallback when no data directory
/// can be resolved.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full or read-only disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, key: &str) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                source: std::io::Error::other("writes disabled"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.entries().get(key).cloned())
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        self.check_writable(key)?;
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.check_writable(key)?;
        self.entries().remove(key);
        Ok(())
    }
}
