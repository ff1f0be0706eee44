//! Customer operations - create
//!
//! CustomerService: customer là immutable sau khi tạo.

use crate::audit::AuditRecorder;
use crate::error::BusinessResult;
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::{
    AuditAction, AuditMetadata, CanonicalRequest, Customer, Endpoint, EntityType,
    IdempotencyKey, NewCustomer, TenantContext,
};
use goldloan_persistence::{begin_write, CustomerRepo};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreated {
    pub customer_id: String,
}

/// Customer Service
pub struct CustomerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CustomerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /customers`
    pub async fn create(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        req: NewCustomer,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::from_body(&req)?;
        Operation::new(self.ctx, tenant, Endpoint::CreateCustomer, key, request)
            .run(self.register(tenant, req))
            .await
    }

    async fn register(
        &self,
        tenant: &TenantContext,
        req: NewCustomer,
    ) -> BusinessResult<CustomerCreated> {
        req.validate()?;
        let customer = Customer::register(tenant.tenant(), req);

        let mut tx = begin_write(self.ctx.pool()).await?;
        CustomerRepo::insert(&mut *tx, &customer).await?;
        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::CreateCustomer,
            EntityType::Customer,
            &customer.id,
            AuditMetadata::None,
        )
        .await?;
        tx.commit().await?;

        info!(tenant = tenant.tenant(), customer_id = %customer.id, "customer created");
        Ok(CustomerCreated {
            customer_id: customer.id,
        })
    }
}
