use crate::errors::WinSyncError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to save setting '{key}': {source}")]
    Store {
        key: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to encode setting '{key}': {message}")]
    Encode { key: &'static str, message: String },
}

impl WinSyncError for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Store { .. } => "SETTINGS_STORE_FAILED",
            SettingsError::Encode { .. } => "SETTINGS_ENCODE_FAILED",
        }
    }
}
