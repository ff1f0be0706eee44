//! Auth stubs - login, face verify
//!
//! Đây KHÔNG phải authentication thật: login phát token giả, face verify
//! gọi `FaceVerifier` collaborator. Không có state change nên không audit.

use crate::collaborators::FaceMatch;
use crate::error::{BusinessError, BusinessResult};
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::validation::{require_fields, validate_email};
use goldloan_core::{CanonicalRequest, Endpoint, IdempotencyKey, TenantContext};
use serde::{Deserialize, Serialize};

/// Thời hạn access token (giây)
pub const TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub bank_code: String,
    pub branch_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceVerifyRequest {
    pub appraiser_id: String,
    pub image_id: String,
}

pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /auth/login` - stub, không cần tenant header
    pub fn login(&self, req: &LoginRequest) -> BusinessResult<LoginResponse> {
        require_fields(&[
            ("password", &req.password),
            ("bank_code", &req.bank_code),
            ("branch_code", &req.branch_code),
        ])?;
        if !validate_email(&req.email) {
            return Err(BusinessError::ValidationError(format!("Invalid email: {}", req.email)));
        }
        Ok(LoginResponse {
            access_token: format!("at_{}", goldloan_core::new_id()),
            refresh_token: format!("rt_{}", goldloan_core::new_id()),
            role: "APPRAISER".to_string(),
            expires_in: TOKEN_TTL_SECS,
        })
    }

    /// `POST /auth/face-verify`
    pub async fn face_verify(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        req: FaceVerifyRequest,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::from_body(&req)?;
        Operation::new(self.ctx, tenant, Endpoint::FaceVerify, key, request)
            .run(self.verify(req))
            .await
    }

    async fn verify(&self, req: FaceVerifyRequest) -> BusinessResult<FaceMatch> {
        require_fields(&[("appraiser_id", &req.appraiser_id), ("image_id", &req.image_id)])?;
        Ok(self
            .ctx
            .collaborators()
            .faces
            .verify(&req.appraiser_id, &req.image_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldloan_persistence::Database;

    fn login_request(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: "secret".to_string(),
            bank_code: "SBI".to_string(),
            branch_code: "BLR01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stub() {
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::new(&db);
        let auth = AuthService::new(&ctx);

        let tokens = auth.login(&login_request("ravi@bank.com")).unwrap();
        assert_eq!(tokens.role, "APPRAISER");
        assert_eq!(tokens.expires_in, 3600);
        assert!(tokens.access_token.starts_with("at_"));

        let err = auth.login(&login_request("nope")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
