//! Loan operations - create, get, complete
//!
//! LoanService: tạo loan (CREATED), đọc loan, và hoàn tất loan (COMPLETED).
//! Complete là idempotent ở mức business: gọi lại trên loan đã COMPLETED
//! trả về `completed_at` ban đầu, không ghi audit mới.

use crate::audit::AuditRecorder;
use crate::error::{BusinessError, BusinessResult};
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use goldloan_core::{
    AuditAction, AuditMetadata, CanonicalRequest, Endpoint, EntityType, IdempotencyKey, Loan,
    LoanAction, LoanStatus, NewLoan, TenantContext, Transition,
};
use goldloan_persistence::{begin_write, AppraiserRepo, CustomerRepo, LoanRepo};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct LoanCreated {
    pub loan_id: String,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub loan_id: String,
    pub status: LoanStatus,
    pub customer_id: String,
    pub appraiser_id: String,
    pub bank_id: String,
    pub branch_id: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Loan> for LoanView {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.id,
            status: loan.status,
            customer_id: loan.customer_id,
            appraiser_id: loan.appraiser_id,
            bank_id: loan.bank_id,
            branch_id: loan.branch_id,
            created_at: loan.created_at,
            completed_at: loan.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanCompleted {
    pub status: LoanStatus,
    pub completed_at: DateTime<Utc>,
}

/// Loan Service
pub struct LoanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LoanService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /loans`
    pub async fn create(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        req: NewLoan,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::from_body(&req)?;
        Operation::new(self.ctx, tenant, Endpoint::CreateLoan, key, request)
            .run(self.open(tenant, req))
            .await
    }

    async fn open(&self, tenant: &TenantContext, req: NewLoan) -> BusinessResult<LoanCreated> {
        req.validate()?;
        let loan = Loan::open(tenant.tenant(), &req);

        let mut tx = begin_write(self.ctx.pool()).await?;
        if !CustomerRepo::exists(&mut *tx, tenant.tenant(), &req.customer_id).await? {
            return Err(BusinessError::not_found("Customer", &req.customer_id));
        }
        if !AppraiserRepo::exists(&mut *tx, tenant.tenant(), &req.appraiser_id).await? {
            return Err(BusinessError::not_found("Appraiser", &req.appraiser_id));
        }
        LoanRepo::insert(&mut *tx, &loan).await?;
        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::CreateLoan,
            EntityType::Loan,
            &loan.id,
            AuditMetadata::None,
        )
        .await?;
        tx.commit().await?;

        info!(tenant = tenant.tenant(), loan_id = %loan.id, "loan created");
        Ok(LoanCreated {
            loan_id: loan.id,
            status: loan.status,
        })
    }

    /// `GET /loans/{id}`
    pub async fn get(&self, tenant: &TenantContext, loan_id: &str) -> BusinessResult<LoanView> {
        let loan = LoanRepo::get_by_id(self.ctx.pool(), tenant.tenant(), loan_id).await?;
        Ok(LoanView::from(loan))
    }

    /// `POST /loans/{id}/complete`
    pub async fn complete(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        loan_id: &str,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::for_loan(loan_id);
        Operation::new(self.ctx, tenant, Endpoint::CompleteLoan, key, request)
            .run(self.close(tenant, loan_id))
            .await
    }

    async fn close(&self, tenant: &TenantContext, loan_id: &str) -> BusinessResult<LoanCompleted> {
        let mut tx = begin_write(self.ctx.pool()).await?;
        let mut loan = LoanRepo::get_by_id(&mut *tx, tenant.tenant(), loan_id).await?;

        match loan.transition(LoanAction::Complete, goldloan_core::timestamp_now())? {
            Transition::AlreadyCompleted => {
                tx.rollback().await?;
                debug!(tenant = tenant.tenant(), loan_id, "loan already completed");
            }
            _ => {
                let completed_at = completion_time(&loan)?;
                LoanRepo::update_status(
                    &mut *tx,
                    tenant.tenant(),
                    &loan.id,
                    loan.status,
                    loan.completed_at,
                )
                .await?;
                AuditRecorder::record(
                    &mut *tx,
                    tenant.tenant(),
                    AuditAction::CompleteLoan,
                    EntityType::Loan,
                    &loan.id,
                    AuditMetadata::Completion { completed_at },
                )
                .await?;
                tx.commit().await?;
                info!(tenant = tenant.tenant(), loan_id, "loan completed");
            }
        }

        Ok(LoanCompleted {
            status: loan.status,
            completed_at: completion_time(&loan)?,
        })
    }
}

fn completion_time(loan: &Loan) -> BusinessResult<DateTime<Utc>> {
    loan.completed_at
        .ok_or_else(|| BusinessError::Internal(format!("completed loan {} has no completed_at", loan.id)))
}
