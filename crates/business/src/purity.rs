//! Purity test - trigger, read
//!
//! Trigger luôn chuyển loan sang PURITY_TESTED; purity_test row chỉ được tạo
//! một lần cho mỗi loan, các lần trigger sau không tạo thêm.

use crate::audit::AuditRecorder;
use crate::error::BusinessResult;
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::purity::PURITY_JOB_PROCESSING;
use goldloan_core::{
    AuditAction, AuditMetadata, CanonicalRequest, Endpoint, EntityType, IdempotencyKey,
    LoanAction, PurityResult, PurityTest, TenantContext,
};
use goldloan_persistence::{begin_write, LoanRepo, PurityRepo};
use serde::Serialize;
use tracing::info;

/// Jewel được chấm điểm khi trigger
const DEFAULT_JEWEL_INDEX: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct PurityJob {
    pub job_id: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurityView {
    pub jewel_index: i64,
    pub result: PurityResult,
    pub confidence: f64,
}

impl From<PurityTest> for PurityView {
    fn from(test: PurityTest) -> Self {
        Self {
            jewel_index: test.jewel_index,
            result: test.result,
            confidence: test.confidence_score,
        }
    }
}

pub struct PurityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PurityService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /loans/{id}/purity-test`
    pub async fn trigger(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        loan_id: &str,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::for_loan(loan_id);
        Operation::new(self.ctx, tenant, Endpoint::TriggerPurityTest, key, request)
            .run(self.start(tenant, loan_id))
            .await
    }

    async fn start(&self, tenant: &TenantContext, loan_id: &str) -> BusinessResult<PurityJob> {
        // Scoring chạy trước transaction
        let score = self
            .ctx
            .collaborators()
            .purity
            .score(loan_id, DEFAULT_JEWEL_INDEX);
        let job_id = goldloan_core::new_id();

        let mut tx = begin_write(self.ctx.pool()).await?;
        let mut loan = LoanRepo::get_by_id(&mut *tx, tenant.tenant(), loan_id).await?;
        loan.transition(LoanAction::TriggerPurityTest, goldloan_core::timestamp_now())?;

        let test = PurityTest::record(tenant.tenant(), &loan.id, DEFAULT_JEWEL_INDEX, score);
        let created = PurityRepo::insert_if_absent(&mut *tx, &test).await?;
        LoanRepo::update_status(&mut *tx, tenant.tenant(), &loan.id, loan.status, loan.completed_at)
            .await?;
        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::TriggerPurityTest,
            EntityType::Loan,
            &loan.id,
            AuditMetadata::PurityJob {
                job_id: job_id.clone(),
            },
        )
        .await?;
        tx.commit().await?;

        info!(tenant = tenant.tenant(), loan_id, %job_id, new_result = created, "purity test triggered");
        Ok(PurityJob {
            job_id,
            status: PURITY_JOB_PROCESSING,
        })
    }

    /// `GET /loans/{id}/purity-test`
    pub async fn results(
        &self,
        tenant: &TenantContext,
        loan_id: &str,
    ) -> BusinessResult<Vec<PurityView>> {
        // NotFound nếu loan không thuộc tenant
        LoanRepo::get_by_id(self.ctx.pool(), tenant.tenant(), loan_id).await?;
        let tests = PurityRepo::list_by_loan(self.ctx.pool(), tenant.tenant(), loan_id).await?;
        Ok(tests.into_iter().map(PurityView::from).collect())
    }
}
