use crate::errors::WinSyncError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrangementError {
    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    #[error("Invalid arrangement id '{value}'")]
    InvalidId { value: String },

    #[error("Invalid arrangement '{name}': {reason}")]
    InvalidArrangement { name: String, reason: String },
}

impl WinSyncError for ArrangementError {
    fn error_code(&self) -> &'static str {
        match self {
            ArrangementError::InvalidTag { .. } => "ARRANGEMENT_INVALID_TAG",
            ArrangementError::InvalidId { .. } => "ARRANGEMENT_INVALID_ID",
            ArrangementError::InvalidArrangement { .. } => "ARRANGEMENT_INVALID",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ArrangementError::InvalidTag { .. } | ArrangementError::InvalidId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_display() {
        let error = ArrangementError::InvalidTag {
            tag: "".to_string(),
            reason: "tag is empty".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid tag '': tag is empty");
        assert_eq!(error.error_code(), "ARRANGEMENT_INVALID_TAG");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_invalid_arrangement_is_not_user_error() {
        let error = ArrangementError::InvalidArrangement {
            name: "Work".to_string(),
            reason: "updatedAt precedes createdAt".to_string(),
        };
        assert_eq!(error.error_code(), "ARRANGEMENT_INVALID");
        assert!(!error.is_user_error());
    }
}
