//! Repository implementations cho SQLite
//!
//! Mọi query đều filter theo `tenant_id`. Các hàm single-statement nhận bất kỳ
//! `Executor` nào (pool hoặc transaction đang mở); hàm multi-statement nhận
//! `&mut SqliteConnection`.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::{DateTime, Utc};
use goldloan_core::{
    Appraiser, AuditEvent, Customer, EntityType, IdempotencyRecord, Loan, LoanStatus,
    LoanSummary, PurityTest, RbiCompliance, RbiComplianceItem,
};
use sqlx::{Executor, Sqlite, SqliteConnection};

// ============================================================================
// Appraiser Repository
// ============================================================================

/// Repository cho appraiser table
pub struct AppraiserRepo;

impl AppraiserRepo {
    /// Thêm appraiser mới; trùng `appraiser_code` trong tenant → UniqueViolation
    pub async fn insert<'e, E>(executor: E, appraiser: &Appraiser) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO appraiser
                (id, tenant_id, name, email, phone, branch_id, appraiser_code, face_image_id, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&appraiser.id)
        .bind(&appraiser.tenant_id)
        .bind(&appraiser.name)
        .bind(&appraiser.email)
        .bind(&appraiser.phone)
        .bind(&appraiser.branch_id)
        .bind(&appraiser.appraiser_code)
        .bind(&appraiser.face_image_id)
        .bind(appraiser.status.as_str())
        .bind(appraiser.created_at)
        .execute(executor)
        .await
        .map_err(|e| {
            PersistenceError::unique_or(
                e,
                format!("appraiser_code already registered: {}", appraiser.appraiser_code),
            )
        })?;
        Ok(())
    }

    /// Lấy appraiser theo ID trong tenant
    pub async fn get_by_id<'e, E>(executor: E, tenant_id: &str, id: &str) -> PersistenceResult<Appraiser>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, AppraiserRow>("SELECT * FROM appraiser WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Appraiser", id))?
            .try_into()
    }

    /// Lấy tất cả appraisers của tenant, theo thứ tự tạo
    pub async fn list<'e, E>(executor: E, tenant_id: &str) -> PersistenceResult<Vec<Appraiser>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AppraiserRow>(
            "SELECT * FROM appraiser WHERE tenant_id = ? ORDER BY created_at, rowid",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }

    pub async fn exists<'e, E>(executor: E, tenant_id: &str, id: &str) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appraiser WHERE tenant_id = ? AND id = ?")
                .bind(tenant_id)
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(count > 0)
    }
}

// ============================================================================
// Customer Repository
// ============================================================================

/// Repository cho customer table
pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn insert<'e, E>(executor: E, customer: &Customer) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO customer (id, tenant_id, customer_code, name, face_image_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.customer_code)
        .bind(&customer.name)
        .bind(&customer.face_image_id)
        .bind(customer.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_by_id<'e, E>(executor: E, tenant_id: &str, id: &str) -> PersistenceResult<Customer>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CustomerRow>("SELECT * FROM customer WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .map(Customer::from)
            .ok_or_else(|| PersistenceError::not_found("Customer", id))
    }

    pub async fn exists<'e, E>(executor: E, tenant_id: &str, id: &str) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE tenant_id = ? AND id = ?")
                .bind(tenant_id)
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(count > 0)
    }
}

// ============================================================================
// Loan Repository
// ============================================================================

/// Repository cho loan table
pub struct LoanRepo;

impl LoanRepo {
    pub async fn insert<'e, E>(executor: E, loan: &Loan) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO loan
                (id, tenant_id, customer_id, appraiser_id, bank_id, branch_id, status, created_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.tenant_id)
        .bind(&loan.customer_id)
        .bind(&loan.appraiser_id)
        .bind(&loan.bank_id)
        .bind(&loan.branch_id)
        .bind(loan.status.as_str())
        .bind(loan.created_at)
        .bind(loan.completed_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Lấy loan theo ID trong tenant; loan của tenant khác trả NotFound
    pub async fn get_by_id<'e, E>(executor: E, tenant_id: &str, id: &str) -> PersistenceResult<Loan>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, LoanRow>("SELECT * FROM loan WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Loan", id))?
            .try_into()
    }

    /// Cập nhật status (và completed_at) của loan
    pub async fn update_status<'e, E>(
        executor: E,
        tenant_id: &str,
        id: &str,
        status: LoanStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE loan SET status = ?, completed_at = ? WHERE tenant_id = ? AND id = ?",
        )
        .bind(status.as_str())
        .bind(completed_at)
        .bind(tenant_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Loan", id));
        }
        Ok(())
    }
}

// ============================================================================
// Compliance Repository
// ============================================================================

/// Repository cho rbi_compliance + rbi_compliance_item tables
pub struct ComplianceRepo;

impl ComplianceRepo {
    /// Ghi compliance record cùng toàn bộ items
    pub async fn insert(
        conn: &mut SqliteConnection,
        record: &RbiCompliance,
        items: &[RbiComplianceItem],
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbi_compliance (id, tenant_id, loan_id, total_jewel_count, overall_image_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.tenant_id)
        .bind(&record.loan_id)
        .bind(record.total_jewel_count)
        .bind(&record.overall_image_id)
        .bind(record.created_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO rbi_compliance_item (id, tenant_id, compliance_id, jewel_index, jewel_image_id)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.tenant_id)
            .bind(&item.compliance_id)
            .bind(item.jewel_index)
            .bind(&item.jewel_image_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Tất cả compliance captures của một loan
    pub async fn list_by_loan<'e, E>(
        executor: E,
        tenant_id: &str,
        loan_id: &str,
    ) -> PersistenceResult<Vec<RbiCompliance>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, ComplianceRow>(
            "SELECT * FROM rbi_compliance WHERE tenant_id = ? AND loan_id = ? ORDER BY rowid",
        )
        .bind(tenant_id)
        .bind(loan_id)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(RbiCompliance::from).collect())
    }

    pub async fn list_items<'e, E>(
        executor: E,
        tenant_id: &str,
        compliance_id: &str,
    ) -> PersistenceResult<Vec<RbiComplianceItem>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, ComplianceItemRow>(
            r#"
            SELECT * FROM rbi_compliance_item
            WHERE tenant_id = ? AND compliance_id = ?
            ORDER BY jewel_index
            "#,
        )
        .bind(tenant_id)
        .bind(compliance_id)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(RbiComplianceItem::from).collect())
    }
}

// ============================================================================
// Purity Test Repository
// ============================================================================

/// Repository cho purity_test table
pub struct PurityRepo;

impl PurityRepo {
    /// Ghi purity test nếu loan chưa có; trả về `true` nếu đã ghi mới
    pub async fn insert_if_absent<'e, E>(executor: E, test: &PurityTest) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO purity_test (id, tenant_id, loan_id, jewel_index, result, confidence_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (tenant_id, loan_id) DO NOTHING
            "#,
        )
        .bind(&test.id)
        .bind(&test.tenant_id)
        .bind(&test.loan_id)
        .bind(test.jewel_index)
        .bind(test.result.as_str())
        .bind(test.confidence_score)
        .bind(test.created_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_loan<'e, E>(
        executor: E,
        tenant_id: &str,
        loan_id: &str,
    ) -> PersistenceResult<Vec<PurityTest>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, PurityTestRow>(
            "SELECT * FROM purity_test WHERE tenant_id = ? AND loan_id = ? ORDER BY jewel_index",
        )
        .bind(tenant_id)
        .bind(loan_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }
}

// ============================================================================
// Loan Summary Repository
// ============================================================================

/// Repository cho loan_summary table
pub struct SummaryRepo;

impl SummaryRepo {
    pub async fn find_by_loan<'e, E>(
        executor: E,
        tenant_id: &str,
        loan_id: &str,
    ) -> PersistenceResult<Option<LoanSummary>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, LoanSummaryRow>(
            "SELECT * FROM loan_summary WHERE tenant_id = ? AND loan_id = ?",
        )
        .bind(tenant_id)
        .bind(loan_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(LoanSummary::from))
    }

    /// Thêm summary; summary thứ hai cho cùng loan → UniqueViolation
    pub async fn insert<'e, E>(executor: E, summary: &LoanSummary) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO loan_summary (id, tenant_id, loan_id, snapshot_json, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&summary.id)
        .bind(&summary.tenant_id)
        .bind(&summary.loan_id)
        .bind(&summary.snapshot_json)
        .bind(summary.created_at)
        .execute(executor)
        .await
        .map_err(|e| {
            PersistenceError::unique_or(e, format!("summary already exists for loan {}", summary.loan_id))
        })?;
        Ok(())
    }
}

// ============================================================================
// Audit Log Repository
// ============================================================================

/// Repository cho audit_log table (append-only: không có update/delete)
pub struct AuditRepo;

impl AuditRepo {
    pub async fn append<'e, E>(executor: E, event: &AuditEvent) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let metadata = serde_json::to_string(&event.metadata)?;
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, tenant_id, action, entity_type, entity_id, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.tenant_id)
        .bind(event.action.as_str())
        .bind(event.entity_type.as_str())
        .bind(&event.entity_id)
        .bind(metadata)
        .bind(event.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Audit events của một entity, theo thứ tự ghi
    pub async fn list_for_entity<'e, E>(
        executor: E,
        tenant_id: &str,
        entity_type: EntityType,
        entity_id: &str,
    ) -> PersistenceResult<Vec<AuditEvent>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT * FROM audit_log
            WHERE tenant_id = ? AND entity_type = ? AND entity_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(tenant_id)
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }
}

// ============================================================================
// Idempotency Repository
// ============================================================================

/// Repository cho idempotency_record table
pub struct IdempotencyRepo;

impl IdempotencyRepo {
    pub async fn find<'e, E>(
        executor: E,
        tenant_id: &str,
        key: &str,
        endpoint: &str,
    ) -> PersistenceResult<Option<IdempotencyRecord>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, IdempotencyRow>(
            r#"
            SELECT * FROM idempotency_record
            WHERE tenant_id = ? AND idempotency_key = ? AND endpoint = ?
            "#,
        )
        .bind(tenant_id)
        .bind(key)
        .bind(endpoint)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(IdempotencyRecord::from))
    }

    /// Ghi record; nếu đã có record cùng (tenant, key, endpoint) thì bỏ qua
    /// và trả về `false`. Record đã có không bao giờ bị ghi đè.
    pub async fn insert_if_absent<'e, E>(executor: E, record: &IdempotencyRecord) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO idempotency_record
                (tenant_id, idempotency_key, endpoint, request_hash, response_payload, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (tenant_id, idempotency_key, endpoint) DO NOTHING
            "#,
        )
        .bind(&record.tenant_id)
        .bind(&record.key)
        .bind(&record.endpoint)
        .bind(&record.request_hash)
        .bind(&record.response_payload)
        .bind(record.created_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
