//! API errors → HTTP status + error envelope

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use goldloan_business::BusinessError;
use goldloan_core::{CoreError, Envelope, Meta};

/// Lỗi trả về từ handler, kèm version cho envelope meta
#[derive(Debug)]
pub struct ApiError {
    error: BusinessError,
    version: String,
}

impl ApiError {
    pub fn new(error: impl Into<BusinessError>, version: &str) -> Self {
        Self {
            error: error.into(),
            version: version.to_string(),
        }
    }

    pub fn invalid_request(message: impl Into<String>, version: &str) -> Self {
        Self::new(CoreError::invalid_request(message), version)
    }

    pub fn error(&self) -> &BusinessError {
        &self.error
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }
}

/// Taxonomy → HTTP status
pub fn status_for(error: &BusinessError) -> StatusCode {
    match error {
        BusinessError::InvalidRequest(_) | BusinessError::ValidationError(_) => {
            StatusCode::BAD_REQUEST
        }
        BusinessError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        BusinessError::LoanClosed(_) => StatusCode::FORBIDDEN,
        BusinessError::NotFound { .. } => StatusCode::NOT_FOUND,
        BusinessError::IdempotencyKeyConflict { .. } => StatusCode::CONFLICT,
        BusinessError::Persistence(_)
        | BusinessError::Serialization(_)
        | BusinessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.error.is_internal() {
            tracing::error!(error = %self.error, "internal error");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        failure_response(status, self.error.code(), message, &self.version)
    }
}

/// Failure envelope với status tuỳ ý (dùng cả cho route/method fallback)
pub fn failure_response(status: StatusCode, code: &str, message: String, version: &str) -> Response {
    let envelope = Envelope::failure(code, message, Meta::new(version));
    let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
        r#"{"success":false,"error":{"code":"INTERNAL","message":"Internal server error"}}"#
            .to_string()
    });
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&BusinessError::LoanClosed("l".into())), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&BusinessError::key_conflict("k", "e")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&BusinessError::not_found("Loan", "l")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&BusinessError::Unauthenticated("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&BusinessError::ValidationError("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BusinessError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = ApiError::new(BusinessError::Internal("db path /secret".into()), "v1");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error().code(), "INTERNAL");
    }
}
