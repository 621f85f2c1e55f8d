use crate::errors::WinSyncError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid storage key '{key}': only letters, digits, '.', '_' and '-' are allowed")]
    InvalidKey { key: String },

    #[error("Failed to read '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl WinSyncError for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            StoreError::InvalidKey { .. } => "STORE_INVALID_KEY",
            StoreError::ReadFailed { .. } => "STORE_READ_FAILED",
            StoreError::WriteFailed { .. } => "STORE_WRITE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_keeps_source() {
        let error = StoreError::WriteFailed {
            key: "savedArrangements".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write 'savedArrangements': read-only"
        );
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(error.error_code(), "STORE_WRITE_FAILED");
    }
}
