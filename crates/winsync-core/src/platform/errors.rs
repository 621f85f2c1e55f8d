use crate::errors::WinSyncError;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Accessibility access is not granted")]
    NotAuthorized,

    #[error("Failed to enumerate {what}: {message}")]
    EnumerationFailed { what: String, message: String },

    #[error("Window command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Window inspection is not supported on this platform")]
    Unsupported,

    #[error("IO error talking to the window system: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl WinSyncError for PlatformError {
    fn error_code(&self) -> &'static str {
        match self {
            PlatformError::NotAuthorized => "PLATFORM_NOT_AUTHORIZED",
            PlatformError::EnumerationFailed { .. } => "PLATFORM_ENUMERATION_FAILED",
            PlatformError::CommandFailed { .. } => "PLATFORM_COMMAND_FAILED",
            PlatformError::Unsupported => "PLATFORM_UNSUPPORTED",
            PlatformError::IoError { .. } => "PLATFORM_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            PlatformError::NotAuthorized | PlatformError::Unsupported
        )
    }
}
