use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::arrangement::{Arrangement, ArrangementId};
use crate::events::{ArrangementEvent, EventBus};
use crate::store::KeyValueStore;

use super::errors::RepositoryError;

/// Key holding the serialized arrangement collection.
pub const ARRANGEMENTS_KEY: &str = "saved_arrangements";

/// Key used by earlier releases. Read once by `migrate_legacy_storage`.
pub const LEGACY_ARRANGEMENTS_KEY: &str = "arrangements";

#[derive(Debug, Default)]
struct Cache {
    loaded: bool,
    items: Vec<Arrangement>,
}

/// The local collection of arrangements, mirrored to a single key of the
/// key/value store.
///
/// Every mutation persists the whole collection before returning. The cache
/// lock is held across mutate-then-persist, and the cache only changes once
/// the write has succeeded.
pub struct ArrangementRepository {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    cache: Mutex<Cache>,
}

impl ArrangementRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// All arrangements in stored order. Unreadable storage yields an empty list.
    pub fn list(&self) -> Vec<Arrangement> {
        match self.cache() {
            Ok(cache) => cache.items.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cache().map(|c| c.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find_by_id(&self, id: &ArrangementId) -> Option<Arrangement> {
        let cache = self.cache().ok()?;
        cache.items.iter().find(|a| a.id() == *id).cloned()
    }

    /// First arrangement with this exact name. Names are not unique; prefer ids.
    pub fn find_by_name(&self, name: &str) -> Option<Arrangement> {
        let cache = self.cache().ok()?;
        cache.items.iter().find(|a| a.name() == name).cloned()
    }

    /// Resolve an id string, falling back to the first arrangement with that name.
    pub fn lookup(&self, query: &str) -> Option<Arrangement> {
        let query = query.trim();
        query
            .parse::<ArrangementId>()
            .ok()
            .and_then(|id| self.find_by_id(&id))
            .or_else(|| self.find_by_name(query))
    }

    /// Replace the arrangement with the same id in place, or append it.
    /// Returns the replaced value.
    pub fn upsert(&self, arrangement: Arrangement) -> Result<Option<Arrangement>, RepositoryError> {
        let mut cache = self.cache()?;
        let mut next = cache.items.clone();
        let previous = match next.iter().position(|a| a.id() == arrangement.id()) {
            Some(index) => Some(std::mem::replace(&mut next[index], arrangement.clone())),
            None => {
                next.push(arrangement.clone());
                None
            }
        };

        self.persist(&next)?;
        cache.items = next;
        drop(cache);

        info!(
            event = "core.repository.upsert_completed",
            id = %arrangement.id(),
            name = arrangement.name(),
            replaced = previous.is_some()
        );
        self.events.publish(ArrangementEvent::Saved {
            id: arrangement.id(),
            name: arrangement.name().to_string(),
        });
        Ok(previous)
    }

    /// Remove by id. Deleting an absent id writes nothing and returns `None`.
    pub fn delete(&self, id: &ArrangementId) -> Result<Option<Arrangement>, RepositoryError> {
        let mut cache = self.cache()?;
        let Some(index) = cache.items.iter().position(|a| a.id() == *id) else {
            debug!(event = "core.repository.delete_skipped", id = %id, reason = "absent");
            return Ok(None);
        };

        let mut next = cache.items.clone();
        let removed = next.remove(index);
        self.persist(&next)?;
        cache.items = next;
        drop(cache);

        info!(
            event = "core.repository.delete_completed",
            id = %id,
            name = removed.name()
        );
        self.events.publish(ArrangementEvent::Deleted { id: *id });
        Ok(Some(removed))
    }

    /// Append every arrangement whose id is not already present, in the given
    /// order. Existing entries are never replaced. Returns what was added.
    pub fn insert_missing(
        &self,
        candidates: Vec<Arrangement>,
    ) -> Result<Vec<Arrangement>, RepositoryError> {
        let mut cache = self.cache()?;
        let mut known: HashSet<ArrangementId> = cache.items.iter().map(|a| a.id()).collect();
        let added: Vec<Arrangement> = candidates
            .into_iter()
            .filter(|a| known.insert(a.id()))
            .collect();
        if added.is_empty() {
            return Ok(added);
        }

        let mut next = cache.items.clone();
        next.extend(added.iter().cloned());
        self.persist(&next)?;
        cache.items = next;
        drop(cache);

        info!(event = "core.repository.insert_completed", count = added.len());
        for arrangement in &added {
            self.events.publish(ArrangementEvent::Saved {
                id: arrangement.id(),
                name: arrangement.name().to_string(),
            });
        }
        Ok(added)
    }

    /// Remove every arrangement.
    pub fn reset(&self) -> Result<(), RepositoryError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        self.store
            .remove(ARRANGEMENTS_KEY)
            .map_err(|source| RepositoryError::PersistFailed { source })?;
        *cache = Cache {
            loaded: true,
            items: Vec::new(),
        };
        drop(cache);

        info!(event = "core.repository.reset_completed");
        self.events.publish(ArrangementEvent::Reset);
        Ok(())
    }

    /// Fold arrangements stored under the legacy key into the current
    /// collection, then remove the legacy key.
    ///
    /// Entries already present by id are kept as they are, and single
    /// undecodable entries are dropped. A legacy blob that is not a list at
    /// all is left in place. Returns how many were moved.
    pub fn migrate_legacy_storage(&self) -> Result<usize, RepositoryError> {
        let blob = self
            .store
            .get_blob(LEGACY_ARRANGEMENTS_KEY)
            .map_err(|source| RepositoryError::LoadFailed { source })?;
        let Some(blob) = blob else {
            return Ok(0);
        };

        let Some(legacy) = decode_entries(LEGACY_ARRANGEMENTS_KEY, &blob) else {
            warn!(
                event = "core.repository.migration_failed",
                key = LEGACY_ARRANGEMENTS_KEY,
                "Legacy arrangements are not a list and stay in place"
            );
            return Ok(0);
        };

        let moved = self.insert_missing(legacy)?.len();
        if let Err(e) = self.store.remove(LEGACY_ARRANGEMENTS_KEY) {
            warn!(
                event = "core.repository.legacy_cleanup_failed",
                key = LEGACY_ARRANGEMENTS_KEY,
                error = %e
            );
        }

        info!(event = "core.repository.migration_completed", moved = moved);
        Ok(moved)
    }

    fn cache(&self) -> Result<MutexGuard<'_, Cache>, RepositoryError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if !cache.loaded {
            cache.items = self.load()?;
            cache.loaded = true;
        }
        Ok(cache)
    }

    fn load(&self) -> Result<Vec<Arrangement>, RepositoryError> {
        let blob = self.store.get_blob(ARRANGEMENTS_KEY).map_err(|source| {
            error!(
                event = "core.repository.load_failed",
                key = ARRANGEMENTS_KEY,
                error = %source
            );
            RepositoryError::LoadFailed { source }
        })?;
        Ok(blob
            .and_then(|bytes| decode_entries(ARRANGEMENTS_KEY, &bytes))
            .unwrap_or_default())
    }

    fn persist(&self, items: &[Arrangement]) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec(items).map_err(|e| RepositoryError::EncodeFailed {
            message: e.to_string(),
        })?;
        self.store.set_blob(ARRANGEMENTS_KEY, &bytes).map_err(|source| {
            error!(
                event = "core.repository.persist_failed",
                key = ARRANGEMENTS_KEY,
                error = %source
            );
            RepositoryError::PersistFailed { source }
        })
    }
}

/// Decode a stored collection entry by entry. Entries that fail to decode
/// are dropped; `None` means the blob is not a list at all.
fn decode_entries(key: &'static str, bytes: &[u8]) -> Option<Vec<Arrangement>> {
    let entries: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            error!(
                event = "core.repository.decode_failed",
                key = key,
                error = %e,
                "Stored arrangements are unreadable"
            );
            return None;
        }
    };

    let total = entries.len();
    let items: Vec<Arrangement> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Arrangement>(entry) {
            Ok(arrangement) => Some(arrangement),
            Err(e) => {
                warn!(event = "core.repository.entry_skipped", key = key, error = %e);
                None
            }
        })
        .collect();

    if items.len() < total {
        warn!(
            event = "core.repository.decode_partial",
            key = key,
            kept = items.len(),
            skipped = total - items.len()
        );
    }
    Some(items)
}
