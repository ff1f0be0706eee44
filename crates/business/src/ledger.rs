//! Idempotency ledger
//!
//! Store-after-execute: `acquire_or_replay` chỉ đọc, không giữ lock; caller
//! thực thi operation rồi gọi `commit` đúng một lần. Hai retry đồng thời cùng
//! key có thể cùng thực thi; commit thứ hai bị bỏ qua (`ON CONFLICT DO NOTHING`)
//! và record đầu tiên thắng.
//!
//! Records không bao giờ bị xoá. `created_at` là mốc cho một expiry sweep nếu
//! sau này cần retention.

use crate::error::{BusinessError, BusinessResult};
use goldloan_core::{CanonicalRequest, Endpoint, IdempotencyKey, IdempotencyRecord};
use goldloan_persistence::IdempotencyRepo;
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Kết quả tra cứu ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerDecision {
    /// Chưa có record: thực thi operation rồi commit
    Fresh,
    /// Đã có record khớp fingerprint: trả response đã lưu nguyên văn
    Cached(String),
}

pub struct IdempotencyLedger<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IdempotencyLedger<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Tra cứu `(tenant, key, endpoint)`.
    ///
    /// Fingerprint khác với record đã lưu → `IdempotencyKeyConflict`.
    pub async fn acquire_or_replay(
        &self,
        tenant: &str,
        endpoint: Endpoint,
        key: &IdempotencyKey,
        request: &CanonicalRequest,
    ) -> BusinessResult<LedgerDecision> {
        let existing =
            IdempotencyRepo::find(self.pool, tenant, key.as_str(), endpoint.as_str()).await?;

        match existing {
            None => Ok(LedgerDecision::Fresh),
            Some(record) if record.matches(request) => {
                debug!(tenant, endpoint = %endpoint, key = %key, "idempotent replay");
                Ok(LedgerDecision::Cached(record.response_payload))
            }
            Some(_) => {
                warn!(tenant, endpoint = %endpoint, key = %key, "idempotency key reused with different request");
                Err(BusinessError::key_conflict(key.as_str(), endpoint.as_str()))
            }
        }
    }

    /// Lưu response của lần thực thi đầu tiên.
    ///
    /// Trả về `false` nếu một request đồng thời đã commit trước.
    pub async fn commit(
        &self,
        tenant: &str,
        endpoint: Endpoint,
        key: &IdempotencyKey,
        request: &CanonicalRequest,
        response: &str,
    ) -> BusinessResult<bool> {
        let record = IdempotencyRecord::new(tenant, key, endpoint, request, response.to_string());
        let inserted = IdempotencyRepo::insert_if_absent(self.pool, &record).await?;
        if !inserted {
            warn!(tenant, endpoint = %endpoint, key = %key, "idempotency commit lost race, keeping first record");
        }
        Ok(inserted)
    }
}
