use crate::errors::WinSyncError;
use crate::repository::RepositoryError;

/// Failures reported by a remote store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Remote record '{id}' not found")]
    NotFound { id: String },

    #[error("Invalid record id '{id}'")]
    InvalidRecordId { id: String },

    #[error("Remote record '{id}' could not be decoded: {reason}")]
    DecodeFailed { id: String, reason: String },

    #[error("Record could not be encoded: {message}")]
    EncodeFailed { message: String },

    #[error("Remote store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Remote store I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WinSyncError for RemoteError {
    fn error_code(&self) -> &'static str {
        match self {
            RemoteError::NotFound { .. } => "REMOTE_NOT_FOUND",
            RemoteError::InvalidRecordId { .. } => "REMOTE_INVALID_RECORD_ID",
            RemoteError::DecodeFailed { .. } => "REMOTE_DECODE_FAILED",
            RemoteError::EncodeFailed { .. } => "REMOTE_ENCODE_FAILED",
            RemoteError::Unavailable { .. } => "REMOTE_UNAVAILABLE",
            RemoteError::Io { .. } => "REMOTE_IO_ERROR",
        }
    }
}

/// Failures of a sync session or a standalone upload/delete.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Sync is turned off. Enable it with 'winsync settings sync on'")]
    Disabled,

    #[error("Sync account unavailable: {reason}")]
    AccountUnavailable { reason: String },

    #[error("Could not determine the sync account status. Try again later")]
    AccountIndeterminate,

    #[error("Remote store error: {source}")]
    RemoteUnavailable {
        #[source]
        source: RemoteError,
    },

    #[error("Failed to save synced arrangements: {source}")]
    Persistence {
        #[source]
        source: RepositoryError,
    },
}

impl From<RemoteError> for SyncError {
    fn from(source: RemoteError) -> Self {
        SyncError::RemoteUnavailable { source }
    }
}

impl From<RepositoryError> for SyncError {
    fn from(source: RepositoryError) -> Self {
        SyncError::Persistence { source }
    }
}

impl WinSyncError for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            SyncError::Disabled => "SYNC_DISABLED",
            SyncError::AccountUnavailable { .. } => "SYNC_ACCOUNT_UNAVAILABLE",
            SyncError::AccountIndeterminate => "SYNC_ACCOUNT_INDETERMINATE",
            SyncError::RemoteUnavailable { .. } => "SYNC_REMOTE_UNAVAILABLE",
            SyncError::Persistence { .. } => "SYNC_PERSISTENCE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SyncError::Disabled | SyncError::AccountUnavailable { .. }
        )
    }
}
