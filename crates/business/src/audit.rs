//! Audit recorder - append-only audit trail.
//!
//! `record` chạy trên transaction của operation: entity mutation và audit row
//! commit cùng nhau, lỗi ghi audit làm fail cả operation.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use goldloan_core::{AuditAction, AuditEvent, AuditMetadata, EntityType, TenantContext};
use goldloan_persistence::AuditRepo;
use serde::Serialize;
use sqlx::SqliteConnection;

/// Audit entry trả về cho `GET /audit`
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntryView {
    pub id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub metadata: AuditMetadata,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEvent> for AuditEntryView {
    fn from(event: AuditEvent) -> Self {
        Self {
            id: event.id,
            action: event.action,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            metadata: event.metadata,
            created_at: event.created_at,
        }
    }
}

pub struct AuditRecorder;

impl AuditRecorder {
    /// Append một audit event trong transaction đang mở
    pub async fn record(
        conn: &mut SqliteConnection,
        tenant: &str,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        metadata: AuditMetadata,
    ) -> BusinessResult<AuditEvent> {
        let event = AuditEvent::new(tenant, action, entity_type, entity_id).with_metadata(metadata);
        AuditRepo::append(conn, &event).await?;
        Ok(event)
    }
}

/// Audit query service
pub struct AuditService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Audit trail của một entity, theo thứ tự ghi
    pub async fn list(
        &self,
        tenant: &TenantContext,
        entity_type: EntityType,
        entity_id: &str,
    ) -> BusinessResult<Vec<AuditEntryView>> {
        let events =
            AuditRepo::list_for_entity(self.ctx.pool(), tenant.tenant(), entity_type, entity_id)
                .await?;
        Ok(events.into_iter().map(AuditEntryView::from).collect())
    }
}
