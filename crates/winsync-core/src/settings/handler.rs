use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::store::KeyValueStore;

use super::errors::SettingsError;
use super::types::{
    DEFAULT_ARRANGEMENT_KEY, DEFAULT_EXCLUDED_APPS, EXCLUDED_APPS_KEY, LAST_SYNC_DATE_KEY,
    SYNC_ENABLED_KEY, SettingsSnapshot,
};

/// Typed access to user settings.
///
/// Each setting is a JSON value under its own key. A value that is missing,
/// unreadable, or undecodable reads as its default.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn sync_enabled(&self) -> bool {
        self.get(SYNC_ENABLED_KEY).unwrap_or(true)
    }

    pub fn set_sync_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.set(SYNC_ENABLED_KEY, &enabled)
    }

    pub fn excluded_apps(&self) -> Vec<String> {
        self.get(EXCLUDED_APPS_KEY)
            .unwrap_or_else(|| DEFAULT_EXCLUDED_APPS.iter().map(|s| s.to_string()).collect())
    }

    pub fn set_excluded_apps(&self, apps: &[String]) -> Result<(), SettingsError> {
        self.set(EXCLUDED_APPS_KEY, &apps)
    }

    /// Returns false if the app was already excluded.
    pub fn add_excluded_app(&self, bundle_id: &str) -> Result<bool, SettingsError> {
        let mut apps = self.excluded_apps();
        if apps.iter().any(|a| a == bundle_id) {
            return Ok(false);
        }
        apps.push(bundle_id.to_string());
        self.set_excluded_apps(&apps)?;
        Ok(true)
    }

    /// Returns false if the app was not excluded.
    pub fn remove_excluded_app(&self, bundle_id: &str) -> Result<bool, SettingsError> {
        let mut apps = self.excluded_apps();
        let before = apps.len();
        apps.retain(|a| a != bundle_id);
        if apps.len() == before {
            return Ok(false);
        }
        self.set_excluded_apps(&apps)?;
        Ok(true)
    }

    pub fn is_app_excluded(&self, bundle_id: &str) -> bool {
        self.excluded_apps().iter().any(|a| a == bundle_id)
    }

    pub fn default_arrangement(&self) -> Option<String> {
        self.get(DEFAULT_ARRANGEMENT_KEY)
    }

    /// `None` clears the default.
    pub fn set_default_arrangement(&self, arrangement: Option<&str>) -> Result<(), SettingsError> {
        match arrangement {
            Some(value) => self.set(DEFAULT_ARRANGEMENT_KEY, &value),
            None => self.remove(DEFAULT_ARRANGEMENT_KEY),
        }
    }

    pub fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        self.get(LAST_SYNC_DATE_KEY)
    }

    pub fn set_last_sync_date(&self, date: DateTime<Utc>) -> Result<(), SettingsError> {
        self.set(LAST_SYNC_DATE_KEY, &date)
    }

    /// Forget the sync toggle and the last sync date.
    pub fn reset_sync_settings(&self) -> Result<(), SettingsError> {
        self.remove(SYNC_ENABLED_KEY)?;
        self.remove(LAST_SYNC_DATE_KEY)?;
        info!(event = "core.settings.sync_reset_completed");
        Ok(())
    }

    pub fn reset_all(&self) -> Result<(), SettingsError> {
        for key in [
            SYNC_ENABLED_KEY,
            EXCLUDED_APPS_KEY,
            DEFAULT_ARRANGEMENT_KEY,
            LAST_SYNC_DATE_KEY,
        ] {
            self.remove(key)?;
        }
        info!(event = "core.settings.reset_completed");
        Ok(())
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            sync_enabled: self.sync_enabled(),
            excluded_apps: self.excluded_apps(),
            default_arrangement: self.default_arrangement(),
            last_sync_date: self.last_sync_date(),
        }
    }

    fn get<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let bytes = match self.store.get_blob(key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(event = "core.settings.read_failed", key = key, error = %e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    event = "core.settings.decode_failed",
                    key = key,
                    error = %e,
                    "Using default value"
                );
                None
            }
        }
    }

    fn set<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec(value).map_err(|e| SettingsError::Encode {
            key,
            message: e.to_string(),
        })?;
        self.store
            .set_blob(key, &bytes)
            .map_err(|source| SettingsError::Store { key, source })?;
        info!(event = "core.settings.update_completed", key = key);
        Ok(())
    }

    fn remove(&self, key: &'static str) -> Result<(), SettingsError> {
        self.store
            .remove(key)
            .map_err(|source| SettingsError::Store { key, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn settings() -> (Settings, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Settings::new(store.clone()), store)
    }

    #[test]
    fn test_defaults() {
        let (settings, _) = settings();
        let snapshot = settings.snapshot();
        assert!(snapshot.sync_enabled);
        assert_eq!(
            snapshot.excluded_apps,
            ["com.apple.finder", "com.apple.dock", "com.apple.menuBarExtra"]
        );
        assert_eq!(snapshot.default_arrangement, None);
        assert_eq!(snapshot.last_sync_date, None);
    }

    #[test]
    fn test_sync_toggle_persists() {
        let (settings, store) = settings();
        settings.set_sync_enabled(false).unwrap();
        assert!(!Settings::new(store).sync_enabled());
    }

    #[test]
    fn test_excluded_apps_add_is_idempotent() {
        let (settings, _) = settings();
        assert!(settings.add_excluded_app("com.example.chat").unwrap());
        assert!(!settings.add_excluded_app("com.example.chat").unwrap());
        assert_eq!(
            settings
                .excluded_apps()
                .iter()
                .filter(|a| *a == "com.example.chat")
                .count(),
            1
        );
        assert!(settings.is_app_excluded("com.example.chat"));
        assert!(settings.is_app_excluded("com.apple.dock"));
    }

    #[test]
    fn test_remove_excluded_app() {
        let (settings, _) = settings();
        assert!(settings.remove_excluded_app("com.apple.finder").unwrap());
        assert!(!settings.remove_excluded_app("com.apple.finder").unwrap());
        assert!(!settings.is_app_excluded("com.apple.finder"));
        assert_eq!(settings.excluded_apps().len(), 2);
    }

    #[test]
    fn test_default_arrangement_set_and_clear() {
        let (settings, _) = settings();
        settings.set_default_arrangement(Some("Work")).unwrap();
        assert_eq!(settings.default_arrangement().as_deref(), Some("Work"));
        settings.set_default_arrangement(None).unwrap();
        assert_eq!(settings.default_arrangement(), None);
    }

    #[test]
    fn test_undecodable_value_reads_default() {
        let (settings, store) = settings();
        store.set_blob(SYNC_ENABLED_KEY, b"\"yes\"").unwrap();
        store.set_blob(EXCLUDED_APPS_KEY, b"{").unwrap();
        assert!(settings.sync_enabled());
        assert_eq!(settings.excluded_apps().len(), DEFAULT_EXCLUDED_APPS.len());
    }

    #[test]
    fn test_reset_sync_settings_keeps_other_settings() {
        let (settings, _) = settings();
        settings.set_sync_enabled(false).unwrap();
        settings.set_last_sync_date(Utc::now()).unwrap();
        settings.set_default_arrangement(Some("Work")).unwrap();

        settings.reset_sync_settings().unwrap();

        assert!(settings.sync_enabled());
        assert_eq!(settings.last_sync_date(), None);
        assert_eq!(settings.default_arrangement().as_deref(), Some("Work"));
    }

    #[test]
    fn test_reset_all() {
        let (settings, _) = settings();
        settings.add_excluded_app("com.example.chat").unwrap();
        settings.set_default_arrangement(Some("Work")).unwrap();

        settings.reset_all().unwrap();

        assert!(!settings.is_app_excluded("com.example.chat"));
        assert_eq!(settings.default_arrangement(), None);
    }

    #[test]
    fn test_write_failure_surfaces() {
        let (settings, store) = settings();
        store.set_fail_writes(true);
        let err = settings.set_sync_enabled(false).unwrap_err();
        assert!(matches!(err, SettingsError::Store { key: SYNC_ENABLED_KEY, .. }));
    }
}
