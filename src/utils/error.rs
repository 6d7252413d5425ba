use thiserror::Error;

/// 找不到訊息時的通用錯誤文字
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    #[error("{message}")]
    ServiceError { message: String },

    #[error("Operation requires step {expected}, wizard is at step {actual}")]
    InvalidStep { expected: u8, actual: u8 },

    #[error("Wizard is already closed")]
    WizardClosed,

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Collaborator,
    NotFound,
    Workflow,
    Configuration,
}

/// 錯誤嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::ServiceError {
            message: message.into(),
        }
    }

    pub fn department_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Department".to_string(),
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::ValidationError { .. } => ErrorCategory::Validation,
            AdminError::NotFound { .. } => ErrorCategory::NotFound,
            AdminError::ServiceError { .. } => ErrorCategory::Collaborator,
            AdminError::InvalidStep { .. } | AdminError::WizardClosed => ErrorCategory::Workflow,
            AdminError::ConfigValidationError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::IoError(_)
            | AdminError::SerializationError(_) => ErrorCategory::Configuration,
        }
    }

    /// 所有錯誤都可由使用者修正或重試，只有設定錯誤會讓 CLI 無法啟動
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Collaborator | ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Workflow => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 可重試的錯誤：協作者失敗（暫時性錯誤、找不到資料）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Collaborator | ErrorCategory::NotFound
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::ValidationError { message, .. } => message.clone(),
            AdminError::NotFound { entity, id } => format!("{} '{}' was not found", entity, id),
            AdminError::ServiceError { message } if message.trim().is_empty() => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            AdminError::ServiceError { message } => message.clone(),
            AdminError::InvalidStep { .. } | AdminError::WizardClosed => {
                "The wizard cannot perform that action right now".to_string()
            }
            AdminError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            AdminError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            AdminError::IoError(e) => format!("Could not access a file: {}", e),
            AdminError::SerializationError(e) => format!("Could not encode output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted field and try again",
            ErrorCategory::Collaborator => "Retry the action; the data service may be busy",
            ErrorCategory::NotFound => "Check the department id with `dept-admin list`",
            ErrorCategory::Workflow => "Restart the wizard from the first step",
            ErrorCategory::Configuration => "Check the configuration file and command arguments",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = AdminError::validation("name", "Department name is required");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "Department name is required");

        let err = AdminError::department_not_found("42");
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Department not found");
    }

    #[test]
    fn test_blank_service_message_falls_back() {
        let err = AdminError::service("  ");
        assert_eq!(err.user_friendly_message(), GENERIC_ERROR_MESSAGE);
    }
}
