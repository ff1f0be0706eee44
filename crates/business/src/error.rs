//! Business layer errors
//!
//! Taxonomy lỗi trả về cho caller. Mỗi variant có một wire code ổn định
//! (`code()`); lỗi từ core/persistence được map vào taxonomy này.

use goldloan_core::CoreError;
use goldloan_persistence::PersistenceError;
use thiserror::Error;

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Request errors ===
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // === Not found errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === State errors ===
    #[error("Loan already completed: {0}")]
    LoanClosed(String),

    #[error("Idempotency key reused with a different request: {key} ({endpoint})")]
    IdempotencyKeyConflict { key: String, endpoint: String },

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias cho business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    /// Create not found error
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create idempotency conflict error
    pub fn key_conflict(key: &str, endpoint: &str) -> Self {
        Self::IdempotencyKeyConflict {
            key: key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Wire code ổn định cho error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::LoanClosed(_) => "LOAN_CLOSED",
            Self::IdempotencyKeyConflict { .. } => "IDEMPOTENCY_KEY_CONFLICT",
            Self::Persistence(_) | Self::Serialization(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    /// Lỗi không do client (chi tiết không được lộ ra ngoài)
    pub fn is_internal(&self) -> bool {
        self.code() == "INTERNAL"
    }

    /// Thao tác bị từ chối do state hoặc key conflict
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::LoanClosed(_) | Self::IdempotencyKeyConflict { .. }
        )
    }
}

impl From<CoreError> for BusinessError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated(msg) => Self::Unauthenticated(msg),
            CoreError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            CoreError::LoanClosed(id) => Self::LoanClosed(id),
            CoreError::ValidationError(msg) => Self::ValidationError(msg),
            CoreError::Serialization(e) => Self::Serialization(e),
            other @ CoreError::UnknownLoanStatus(_) => Self::Internal(other.to_string()),
        }
    }
}

impl From<PersistenceError> for BusinessError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity, id } => Self::NotFound { entity, id },
            PersistenceError::UniqueViolation(msg) => Self::ValidationError(msg),
            other => Self::Persistence(other),
        }
    }
}

impl From<sqlx::Error> for BusinessError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(PersistenceError::Database(err))
    }
}
