use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::{WinSyncPaths, expand_home};

/// Contents of `config.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinSyncConfig {
    pub device: DeviceConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Fixed identifier for this device. Generated and stored when absent.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Shared folder used as the remote store. Sync is unconfigured without it.
    pub remote_dir: Option<PathBuf>,
}

impl WinSyncConfig {
    pub fn device_id(&self) -> Option<&str> {
        self.device
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn store_dir(&self, paths: &WinSyncPaths) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => expand_home(dir),
            None => paths.default_store_dir(),
        }
    }

    pub fn remote_dir(&self) -> Option<PathBuf> {
        self.sync.remote_dir.as_deref().map(expand_home)
    }

    pub fn is_sync_configured(&self) -> bool {
        self.sync.remote_dir.is_some()
    }
}
