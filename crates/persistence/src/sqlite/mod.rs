//! SQLite persistence module
//!
//! Repository pattern cho SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    AppraiserRepo, AuditRepo, ComplianceRepo, CustomerRepo, IdempotencyRepo, LoanRepo,
    PurityRepo, SummaryRepo,
};
pub use schema::{
    init_schema, AppraiserRow, AuditLogRow, ComplianceItemRow, ComplianceRow, CustomerRow,
    IdempotencyRow, LoanRow, LoanSummaryRow, PurityTestRow,
};

use crate::error::PersistenceResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Thời gian chờ write lock trước khi SQLite trả SQLITE_BUSY
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Tạo connection pool; file được tạo nếu chưa có
pub async fn create_pool(database_url: &str, max_connections: u32) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Pool in-memory với đúng một connection, sống cùng pool
pub async fn create_memory_pool() -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Mở transaction ghi bằng `BEGIN IMMEDIATE`.
///
/// Write lock được lấy ngay khi mở (chờ tối đa `BUSY_TIMEOUT`), nên các
/// read-then-write bên trong không bao giờ phải nâng cấp lock giữa chừng.
/// Hai operation đồng thời trên cùng một loan chạy tuần tự thay vì một bên
/// nhận "database is locked".
pub async fn begin_write(pool: &SqlitePool) -> PersistenceResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
