use crate::errors::WinSyncError;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(
        "Window capture is not authorized. Grant Accessibility access in System Settings > Privacy & Security > Accessibility"
    )]
    PermissionDenied,

    #[error("Arrangement name cannot be empty")]
    InvalidName,

    #[error("Failed to enumerate running applications: {message}")]
    EnumerationFailed { message: String },

    #[error(transparent)]
    InvalidTag(#[from] crate::arrangement::ArrangementError),
}

impl WinSyncError for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            CaptureError::PermissionDenied => "CAPTURE_PERMISSION_DENIED",
            CaptureError::InvalidName => "CAPTURE_INVALID_NAME",
            CaptureError::EnumerationFailed { .. } => "CAPTURE_ENUMERATION_FAILED",
            CaptureError::InvalidTag(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            CaptureError::PermissionDenied | CaptureError::InvalidName => true,
            CaptureError::EnumerationFailed { .. } => false,
            CaptureError::InvalidTag(e) => e.is_user_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::ArrangementError;

    #[test]
    fn test_permission_denied_is_actionable() {
        let error = CaptureError::PermissionDenied;
        assert!(error.to_string().contains("Grant Accessibility access"));
        assert_eq!(error.error_code(), "CAPTURE_PERMISSION_DENIED");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_invalid_tag_delegates_error_code() {
        let error = CaptureError::from(ArrangementError::InvalidTag {
            tag: " ".to_string(),
            reason: "tag is empty".to_string(),
        });
        assert_eq!(error.error_code(), "ARRANGEMENT_INVALID_TAG");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_enumeration_failed() {
        let error = CaptureError::EnumerationFailed {
            message: "osascript exited with code 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to enumerate running applications: osascript exited with code 1"
        );
        assert!(!error.is_user_error());
    }
}
