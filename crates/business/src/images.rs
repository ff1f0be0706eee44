//! Image upload URL - stub presigned URL qua `ImageUrlIssuer`.

use crate::collaborators::UploadTicket;
use crate::error::BusinessResult;
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::validation::require_fields;
use goldloan_core::{CanonicalRequest, Endpoint, IdempotencyKey, TenantContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    pub image_type: String,
    pub loan_id: String,
}

pub struct ImageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ImageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /images/upload-url`
    pub async fn upload_url(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        req: UploadUrlRequest,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::from_body(&req)?;
        Operation::new(self.ctx, tenant, Endpoint::UploadUrl, key, request)
            .run(self.issue(req))
            .await
    }

    async fn issue(&self, req: UploadUrlRequest) -> BusinessResult<UploadTicket> {
        require_fields(&[("image_type", &req.image_type), ("loan_id", &req.loan_id)])?;
        Ok(self
            .ctx
            .collaborators()
            .images
            .issue(&req.image_type, &req.loan_id))
    }
}
