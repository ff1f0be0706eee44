//! Compliance capture
//!
//! Validate capture trước khi ghi bất kỳ row nào, sau đó ghi compliance +
//! items, chuyển loan sang COMPLIANCE_CAPTURED và audit, trong một transaction.

use crate::audit::AuditRecorder;
use crate::error::BusinessResult;
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::{
    AuditAction, AuditMetadata, CanonicalRequest, ComplianceCapture, Endpoint, EntityType,
    IdempotencyKey, LoanAction, LoanStatus, RbiCompliance, TenantContext,
};
use goldloan_persistence::{begin_write, ComplianceRepo, LoanRepo};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceCaptured {
    pub compliance_id: String,
    pub status: LoanStatus,
}

pub struct ComplianceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ComplianceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /loans/{id}/compliance`
    pub async fn capture(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        loan_id: &str,
        capture: ComplianceCapture,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::for_loan_with_body(loan_id, &capture)?;
        Operation::new(self.ctx, tenant, Endpoint::CaptureCompliance, key, request)
            .run(self.record(tenant, loan_id, capture))
            .await
    }

    async fn record(
        &self,
        tenant: &TenantContext,
        loan_id: &str,
        capture: ComplianceCapture,
    ) -> BusinessResult<ComplianceCaptured> {
        capture.validate()?;

        let mut tx = begin_write(self.ctx.pool()).await?;
        let mut loan = LoanRepo::get_by_id(&mut *tx, tenant.tenant(), loan_id).await?;
        loan.transition(LoanAction::CaptureCompliance, goldloan_core::timestamp_now())?;

        let (record, items) = RbiCompliance::from_capture(tenant.tenant(), &loan.id, &capture);
        ComplianceRepo::insert(&mut *tx, &record, &items).await?;
        LoanRepo::update_status(&mut *tx, tenant.tenant(), &loan.id, loan.status, loan.completed_at)
            .await?;
        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::CaptureCompliance,
            EntityType::Loan,
            &loan.id,
            AuditMetadata::Compliance {
                compliance_id: record.id.clone(),
                total_jewel_count: record.total_jewel_count,
            },
        )
        .await?;
        tx.commit().await?;

        info!(
            tenant = tenant.tenant(),
            loan_id,
            compliance_id = %record.id,
            jewels = record.total_jewel_count,
            "compliance captured"
        );
        Ok(ComplianceCaptured {
            compliance_id: record.id,
            status: loan.status,
        })
    }
}
