mod errors;
mod loading;
mod types;

pub use errors::ConfigError;
pub use loading::{load_config, load_config_from};
pub use types::{DeviceConfig, StorageConfig, SyncConfig, WinSyncConfig};
