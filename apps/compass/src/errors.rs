use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::AuthError;
use crate::store::StorageError;

/// Client-level error type.
/// Most failures never reach this type: recommendation and dashboard calls
/// degrade to fallback content and storage failures become cache misses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Resume analysis timed out after {0}s")]
    AnalysisTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Errors the user can recover from by pressing "retry".
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Gateway(_) | AppError::AnalysisTimeout(_) | AppError::Storage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let e = AppError::validation("resume", "File is too large");
        assert_eq!(
            e.to_string(),
            "Validation error on 'resume': File is too large"
        );
        assert!(!e.is_retryable());
    }

    #[test]
    fn test_auth_error_displays_user_message() {
        let e: AppError = AuthError::new("NotAuthorizedException", "bad password").into();
        assert_eq!(e.to_string(), "Incorrect email or password");
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(AppError::AnalysisTimeout(120).is_retryable());
    }
}
