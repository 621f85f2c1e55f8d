use std::error::Error;

/// Base trait for all WinSync errors
pub trait WinSyncError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether the user can act on this error (grant access, sign in, fix input)
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type WinSyncResult<T> = Result<T, Box<dyn WinSyncError>>;
