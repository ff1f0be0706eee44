//! # Gold Loan Persistence
//!
//! Persistence layer cho gold loan backend - tenant-scoped SQLite entity store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Database                        │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐  │
//! │  │   Schema    │   │    Pool     │   │   Repos    │  │
//! │  │   (DDL)     │   │  (sqlx)     │   │ (queries)  │  │
//! │  └─────────────┘   └─────────────┘   └────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use goldloan_persistence::{Database, LoanRepo};
//!
//! let db = Database::connect("sqlite:goldloan.db", 5).await?;
//! let loan = LoanRepo::get_by_id(db.pool(), "tenant-1", &loan_id).await?;
//!
//! // Nhiều statement trong một transaction
//! let mut tx = goldloan_persistence::begin_write(db.pool()).await?;
//! LoanRepo::update_status(&mut *tx, "tenant-1", &loan_id, status, None).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{
    begin_write, init_schema, AppraiserRepo, AuditRepo, ComplianceRepo, CustomerRepo, IdempotencyRepo,
    LoanRepo, PurityRepo, SummaryRepo,
};

use sqlx::SqlitePool;
use tracing::info;

/// Database facade - pool + schema bootstrap
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Mở (hoặc tạo) database và đảm bảo schema
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:goldloan.db")
    /// * `max_connections` - kích thước pool
    pub async fn connect(db_url: &str, max_connections: u32) -> PersistenceResult<Self> {
        let pool = sqlite::create_pool(db_url, max_connections).await?;
        init_schema(&pool).await?;
        info!(url = db_url, max_connections, "database ready");
        Ok(Self { pool })
    }

    /// Database in-memory cho tests
    pub async fn in_memory() -> PersistenceResult<Self> {
        let pool = sqlite::create_memory_pool().await?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
