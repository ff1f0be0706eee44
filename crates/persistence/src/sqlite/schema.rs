//! Database schema definitions
//!
//! DDL cho SQLite (tạo lúc start-up bằng `CREATE TABLE IF NOT EXISTS`) và
//! row types cho sqlx mapping. Mọi bảng đều có `tenant_id`.

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use goldloan_core::{
    Appraiser, AppraiserStatus, AuditAction, AuditEvent, Customer, EntityType, IdempotencyRecord,
    Loan, LoanStatus, LoanSummary, PurityResult, PurityTest, RbiCompliance, RbiComplianceItem,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Thứ tự tạo bảng (bảng cha trước)
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS appraiser (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        branch_id TEXT NOT NULL,
        appraiser_code TEXT NOT NULL,
        face_image_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_appraiser_code ON appraiser (tenant_id, appraiser_code)",
    r#"
    CREATE TABLE IF NOT EXISTS customer (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        customer_code TEXT NOT NULL,
        name TEXT NOT NULL,
        face_image_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_customer_tenant ON customer (tenant_id)",
    r#"
    CREATE TABLE IF NOT EXISTS loan (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        customer_id TEXT NOT NULL REFERENCES customer (id),
        appraiser_id TEXT NOT NULL REFERENCES appraiser (id),
        bank_id TEXT NOT NULL,
        branch_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        completed_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_loan_tenant ON loan (tenant_id)",
    r#"
    CREATE TABLE IF NOT EXISTS rbi_compliance (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        loan_id TEXT NOT NULL REFERENCES loan (id),
        total_jewel_count INTEGER NOT NULL,
        overall_image_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rbi_compliance_item (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        compliance_id TEXT NOT NULL REFERENCES rbi_compliance (id),
        jewel_index INTEGER NOT NULL,
        jewel_image_id TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purity_test (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        loan_id TEXT NOT NULL REFERENCES loan (id),
        jewel_index INTEGER NOT NULL,
        result TEXT NOT NULL,
        confidence_score REAL NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_purity_loan ON purity_test (tenant_id, loan_id)",
    r#"
    CREATE TABLE IF NOT EXISTS loan_summary (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        loan_id TEXT NOT NULL REFERENCES loan (id),
        snapshot_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_summary_loan ON loan_summary (tenant_id, loan_id)",
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        action TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        metadata TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_audit_entity ON audit_log (tenant_id, entity_type, entity_id)",
    r#"
    CREATE TABLE IF NOT EXISTS idempotency_record (
        tenant_id TEXT NOT NULL,
        idempotency_key TEXT NOT NULL,
        endpoint TEXT NOT NULL,
        request_hash TEXT NOT NULL,
        response_payload TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (tenant_id, idempotency_key, endpoint)
    )
    "#,
];

/// Tạo toàn bộ bảng + index nếu chưa có
pub async fn init_schema(pool: &SqlitePool) -> PersistenceResult<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Row type cho bảng `appraiser`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AppraiserRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub branch_id: String,
    pub appraiser_code: String,
    pub face_image_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `customer`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: String,
    pub tenant_id: String,
    pub customer_code: String,
    pub name: String,
    pub face_image_id: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `loan`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub appraiser_id: String,
    pub bank_id: String,
    pub branch_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Row type cho bảng `rbi_compliance`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ComplianceRow {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub total_jewel_count: i64,
    pub overall_image_id: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `rbi_compliance_item`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ComplianceItemRow {
    pub id: String,
    pub tenant_id: String,
    pub compliance_id: String,
    pub jewel_index: i64,
    pub jewel_image_id: String,
}

/// Row type cho bảng `purity_test`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PurityTestRow {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub jewel_index: i64,
    pub result: String,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `loan_summary`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LoanSummaryRow {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub snapshot_json: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `audit_log`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditLogRow {
    pub id: String,
    pub tenant_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: String, // AuditMetadata JSON
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `idempotency_record`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct IdempotencyRow {
    pub tenant_id: String,
    pub idempotency_key: String,
    pub endpoint: String,
    pub request_hash: String,
    pub response_payload: String,
    pub created_at: DateTime<Utc>,
}

// === Conversion implementations ===

impl TryFrom<AppraiserRow> for Appraiser {
    type Error = PersistenceError;

    fn try_from(row: AppraiserRow) -> Result<Self, Self::Error> {
        let status = AppraiserStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("appraiser.status", &row.status))?;
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            branch_id: row.branch_id,
            appraiser_code: row.appraiser_code,
            face_image_id: row.face_image_id,
            status,
            created_at: row.created_at,
        })
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            customer_code: row.customer_code,
            name: row.name,
            face_image_id: row.face_image_id,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<LoanRow> for Loan {
    type Error = PersistenceError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        let status = LoanStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("loan.status", &row.status))?;
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            customer_id: row.customer_id,
            appraiser_id: row.appraiser_id,
            bank_id: row.bank_id,
            branch_id: row.branch_id,
            status,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

impl From<ComplianceRow> for RbiCompliance {
    fn from(row: ComplianceRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            loan_id: row.loan_id,
            total_jewel_count: row.total_jewel_count,
            overall_image_id: row.overall_image_id,
            created_at: row.created_at,
        }
    }
}

impl From<ComplianceItemRow> for RbiComplianceItem {
    fn from(row: ComplianceItemRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            compliance_id: row.compliance_id,
            jewel_index: row.jewel_index,
            jewel_image_id: row.jewel_image_id,
        }
    }
}

impl TryFrom<PurityTestRow> for PurityTest {
    type Error = PersistenceError;

    fn try_from(row: PurityTestRow) -> Result<Self, Self::Error> {
        let result = PurityResult::from_str(&row.result)
            .ok_or_else(|| PersistenceError::invalid_enum("purity_test.result", &row.result))?;
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            loan_id: row.loan_id,
            jewel_index: row.jewel_index,
            result,
            confidence_score: row.confidence_score,
            created_at: row.created_at,
        })
    }
}

impl From<LoanSummaryRow> for LoanSummary {
    fn from(row: LoanSummaryRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            loan_id: row.loan_id,
            snapshot_json: row.snapshot_json,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<AuditLogRow> for AuditEvent {
    type Error = PersistenceError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(&row.action)
            .ok_or_else(|| PersistenceError::invalid_enum("audit_log.action", &row.action))?;
        let entity_type = EntityType::from_str(&row.entity_type).ok_or_else(|| {
            PersistenceError::invalid_enum("audit_log.entity_type", &row.entity_type)
        })?;
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            action,
            entity_type,
            entity_id: row.entity_id,
            metadata: serde_json::from_str(&row.metadata)?,
            created_at: row.created_at,
        })
    }
}

impl From<IdempotencyRow> for IdempotencyRecord {
    fn from(row: IdempotencyRow) -> Self {
        Self {
            tenant_id: row.tenant_id,
            key: row.idempotency_key,
            endpoint: row.endpoint,
            request_hash: row.request_hash,
            response_payload: row.response_payload,
            created_at: row.created_at,
        }
    }
}

/// Helper cho các list query
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> PersistenceResult<Vec<T>>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
