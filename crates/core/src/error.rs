//! # Error Module
//!
//! Định nghĩa các domain errors cho gold loan backend sử dụng thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// Các lỗi nghiệp vụ cốt lõi, không liên quan đến infrastructure.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Request context errors ===
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Loan errors ===
    #[error("Loan already completed: {0}")]
    LoanClosed(String),

    #[error("Unknown loan status: {0}")]
    UnknownLoanStatus(String),

    // === Validation errors ===
    #[error("Validation error: {0}")]
    ValidationError(String),

    // === Serialization errors ===
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Tạo ValidationError từ message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Tạo InvalidRequest từ message
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Kiểm tra có phải lỗi loan đã đóng không
    pub fn is_loan_closed(&self) -> bool {
        matches!(self, CoreError::LoanClosed(_))
    }

    /// Kiểm tra có phải lỗi do client gửi sai không
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Unauthenticated(_)
                | CoreError::InvalidRequest(_)
                | CoreError::LoanClosed(_)
                | CoreError::ValidationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::LoanClosed("loan-1".to_string());
        assert_eq!(err.to_string(), "Loan already completed: loan-1");

        let err = CoreError::validation("jewel_images count must match total_jewel_count");
        assert_eq!(
            err.to_string(),
            "Validation error: jewel_images count must match total_jewel_count"
        );
    }

    #[test]
    fn test_error_checks() {
        assert!(CoreError::LoanClosed("loan-1".to_string()).is_loan_closed());
        assert!(CoreError::invalid_request("bad").is_client_error());
        assert!(!CoreError::UnknownLoanStatus("X".to_string()).is_client_error());
    }
}
