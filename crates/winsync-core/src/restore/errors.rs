use crate::errors::WinSyncError;

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error(
        "Window control is not authorized. Grant Accessibility access in System Settings > Privacy & Security > Accessibility, then try again"
    )]
    PermissionDenied,
}

impl WinSyncError for RestoreError {
    fn error_code(&self) -> &'static str {
        match self {
            RestoreError::PermissionDenied => "RESTORE_PERMISSION_DENIED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, RestoreError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied() {
        let error = RestoreError::PermissionDenied;
        assert!(error.to_string().contains("Grant Accessibility access"));
        assert_eq!(error.error_code(), "RESTORE_PERMISSION_DENIED");
        assert!(error.is_user_error());
    }
}
