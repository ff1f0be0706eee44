//! Operation protocol cho mọi mutating endpoint.
//!
//! Thứ tự cố định:
//! 1. tenant context đã được resolve (extractor ở tầng API)
//! 2. caller build `CanonicalRequest` cho operation
//! 3. tra ledger: `Cached` → trả ngay, không side effect nào khác
//! 4. preconditions (entity tồn tại, state machine) bên trong operation
//! 5. entity mutation + audit trong một transaction (bên trong operation)
//! 6. build success envelope
//! 7. commit idempotency record (commit riêng, sau transaction ở bước 5)
//! 8. trả envelope
//!
//! Crash giữa bước 5 và 7 là cửa sổ duy nhất mà retry sẽ thực thi lại logic.

use crate::error::BusinessResult;
use crate::ledger::{IdempotencyLedger, LedgerDecision};
use crate::services::ServiceContext;
use goldloan_core::{CanonicalRequest, Endpoint, Envelope, IdempotencyKey, Meta, TenantContext};
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

/// Response của một mutating operation: envelope JSON đã serialize
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub endpoint: Endpoint,
    pub body: String,
    /// `true` nếu body được replay từ ledger
    pub replayed: bool,
}

impl Outcome {
    /// Envelope dưới dạng JSON value
    pub fn json(&self) -> BusinessResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Một lần gọi mutating endpoint
pub struct Operation<'a> {
    ctx: &'a ServiceContext,
    tenant: &'a TenantContext,
    endpoint: Endpoint,
    key: &'a IdempotencyKey,
    request: CanonicalRequest,
}

impl<'a> Operation<'a> {
    pub fn new(
        ctx: &'a ServiceContext,
        tenant: &'a TenantContext,
        endpoint: Endpoint,
        key: &'a IdempotencyKey,
        request: CanonicalRequest,
    ) -> Self {
        Self {
            ctx,
            tenant,
            endpoint,
            key,
            request,
        }
    }

    /// Chạy `work` theo protocol. `work` là future lazy: nó chỉ được poll khi
    /// ledger trả về `Fresh`.
    pub async fn run<T, F>(self, work: F) -> BusinessResult<Outcome>
    where
        T: Serialize,
        F: Future<Output = BusinessResult<T>>,
    {
        let tenant = self.tenant.tenant();
        let ledger = IdempotencyLedger::new(self.ctx.pool());

        if let LedgerDecision::Cached(body) = ledger
            .acquire_or_replay(tenant, self.endpoint, self.key, &self.request)
            .await?
        {
            return Ok(Outcome {
                endpoint: self.endpoint,
                body,
                replayed: true,
            });
        }

        let data = match work.await {
            Ok(data) => data,
            Err(err) => {
                if err.is_rejection() {
                    warn!(tenant, endpoint = %self.endpoint, error = %err, "operation rejected");
                }
                return Err(err);
            }
        };

        let envelope = Envelope::success(data, Meta::new(self.ctx.api_version()));
        let body = serde_json::to_string(&envelope)?;

        let committed = ledger
            .commit(tenant, self.endpoint, self.key, &self.request, &body)
            .await?;
        if !committed {
            // Retry đồng thời đã commit trước: mọi caller nhận cùng một body
            if let LedgerDecision::Cached(stored) = ledger
                .acquire_or_replay(tenant, self.endpoint, self.key, &self.request)
                .await?
            {
                return Ok(Outcome {
                    endpoint: self.endpoint,
                    body: stored,
                    replayed: true,
                });
            }
        }
        info!(tenant, endpoint = %self.endpoint, key = %self.key, "operation committed");

        Ok(Outcome {
            endpoint: self.endpoint,
            body,
            replayed: false,
        })
    }
}
