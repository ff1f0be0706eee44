//! Loan summary - frozen snapshot, tạo một lần cho mỗi loan.
//!
//! Gọi lại trả về summary đã có (cùng `summary_id`), kể cả khi loan đã
//! COMPLETED. Tạo summary đầu tiên cho loan đã COMPLETED → LoanClosed.

use crate::audit::AuditRecorder;
use crate::error::{BusinessError, BusinessResult};
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::{
    AuditAction, AuditMetadata, CanonicalRequest, Endpoint, EntityType, IdempotencyKey,
    LoanAction, LoanSummary, TenantContext,
};
use goldloan_persistence::{begin_write, LoanRepo, SummaryRepo};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct SummaryGenerated {
    pub summary_id: String,
}

pub struct SummaryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SummaryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /loans/{id}/summary`
    pub async fn generate(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        loan_id: &str,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::for_loan(loan_id);
        Operation::new(self.ctx, tenant, Endpoint::GenerateSummary, key, request)
            .run(self.freeze(tenant, loan_id))
            .await
    }

    async fn freeze(&self, tenant: &TenantContext, loan_id: &str) -> BusinessResult<SummaryGenerated> {
        let mut tx = begin_write(self.ctx.pool()).await?;
        let mut loan = LoanRepo::get_by_id(&mut *tx, tenant.tenant(), loan_id).await?;

        if let Some(existing) = SummaryRepo::find_by_loan(&mut *tx, tenant.tenant(), loan_id).await? {
            tx.rollback().await?;
            debug!(tenant = tenant.tenant(), loan_id, summary_id = %existing.id, "summary already exists");
            return Ok(SummaryGenerated {
                summary_id: existing.id,
            });
        }

        loan.transition(LoanAction::GenerateSummary, goldloan_core::timestamp_now())?;
        let summary = LoanSummary::freeze(&loan)?;

        if let Err(err) = SummaryRepo::insert(&mut *tx, &summary).await {
            if !err.is_unique_violation() {
                return Err(err.into());
            }
            // Request đồng thời đã tạo trước: trả summary đó
            tx.rollback().await?;
            let existing = SummaryRepo::find_by_loan(self.ctx.pool(), tenant.tenant(), loan_id)
                .await?
                .ok_or_else(|| BusinessError::not_found("LoanSummary", loan_id))?;
            return Ok(SummaryGenerated {
                summary_id: existing.id,
            });
        }

        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::GenerateSummary,
            EntityType::Loan,
            &loan.id,
            AuditMetadata::Summary {
                summary_id: summary.id.clone(),
            },
        )
        .await?;
        tx.commit().await?;

        info!(tenant = tenant.tenant(), loan_id, summary_id = %summary.id, "summary generated");
        Ok(SummaryGenerated {
            summary_id: summary.id,
        })
    }
}
