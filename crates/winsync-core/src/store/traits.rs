use super::errors::StoreError;

/// Durable local key/value storage for opaque byte blobs.
///
/// Reads of a key that was never written return `Ok(None)`. Writes replace
/// the whole value; readers never observe a partial blob.
pub trait KeyValueStore: Send + Sync {
    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keys map to file names, so they are restricted to a portable alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}
