//! Appraiser operations - register, list
//!
//! AppraiserService: appraiser là immutable sau khi tạo.

use crate::audit::AuditRecorder;
use crate::error::BusinessResult;
use crate::protocol::{Operation, Outcome};
use crate::services::ServiceContext;
use goldloan_core::{
    Appraiser, AppraiserStatus, AuditAction, AuditMetadata, CanonicalRequest, Endpoint,
    EntityType, IdempotencyKey, NewAppraiser, TenantContext,
};
use goldloan_persistence::{begin_write, AppraiserRepo};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct AppraiserCreated {
    pub appraiser_id: String,
    pub status: AppraiserStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppraiserListItem {
    pub id: String,
    pub name: String,
    pub branch_id: String,
    pub status: AppraiserStatus,
}

impl From<Appraiser> for AppraiserListItem {
    fn from(appraiser: Appraiser) -> Self {
        Self {
            id: appraiser.id,
            name: appraiser.name,
            branch_id: appraiser.branch_id,
            status: appraiser.status,
        }
    }
}

/// Appraiser Service
pub struct AppraiserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AppraiserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `POST /appraisers`
    pub async fn create(
        &self,
        tenant: &TenantContext,
        key: &IdempotencyKey,
        req: NewAppraiser,
    ) -> BusinessResult<Outcome> {
        let request = CanonicalRequest::from_body(&req)?;
        Operation::new(self.ctx, tenant, Endpoint::CreateAppraiser, key, request)
            .run(self.register(tenant, req))
            .await
    }

    async fn register(
        &self,
        tenant: &TenantContext,
        req: NewAppraiser,
    ) -> BusinessResult<AppraiserCreated> {
        req.validate()?;
        let appraiser = Appraiser::register(tenant.tenant(), req);

        let mut tx = begin_write(self.ctx.pool()).await?;
        AppraiserRepo::insert(&mut *tx, &appraiser).await?;
        AuditRecorder::record(
            &mut *tx,
            tenant.tenant(),
            AuditAction::CreateAppraiser,
            EntityType::Appraiser,
            &appraiser.id,
            AuditMetadata::None,
        )
        .await?;
        tx.commit().await?;

        info!(tenant = tenant.tenant(), appraiser_id = %appraiser.id, code = %appraiser.appraiser_code, "appraiser registered");
        Ok(AppraiserCreated {
            appraiser_id: appraiser.id,
            status: appraiser.status,
        })
    }

    /// `GET /appraisers`
    pub async fn list(&self, tenant: &TenantContext) -> BusinessResult<Vec<AppraiserListItem>> {
        let appraisers = AppraiserRepo::list(self.ctx.pool(), tenant.tenant()).await?;
        Ok(appraisers.into_iter().map(AppraiserListItem::from).collect())
    }
}
