use crate::errors::WinSyncError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Failed to save arrangements: {source}")]
    PersistFailed {
        #[source]
        source: StoreError,
    },

    #[error("Failed to encode arrangements: {message}")]
    EncodeFailed { message: String },

    #[error("Failed to read arrangements: {source}")]
    LoadFailed {
        #[source]
        source: StoreError,
    },
}

impl WinSyncError for RepositoryError {
    fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::PersistFailed { .. } => "REPOSITORY_PERSIST_FAILED",
            RepositoryError::EncodeFailed { .. } => "REPOSITORY_ENCODE_FAILED",
            RepositoryError::LoadFailed { .. } => "REPOSITORY_LOAD_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_failed_display() {
        let error = RepositoryError::PersistFailed {
            source: StoreError::InvalidKey {
                key: "bad key".to_string(),
            },
        };
        assert!(error.to_string().starts_with("Failed to save arrangements:"));
        assert_eq!(error.error_code(), "REPOSITORY_PERSIST_FAILED");
        assert!(!error.is_user_error());
    }
}
