//! # Gold Loan Core
//!
//! Domain types cho gold loan backend: tenant context, loan state machine,
//! compliance capture, audit vocabulary, idempotency fingerprint, envelope.
//!
//! Crate này không phụ thuộc vào database hay HTTP.

pub mod audit;
pub mod compliance;
pub mod envelope;
pub mod error;
pub mod idempotency;
pub mod loan;
pub mod party;
pub mod purity;
pub mod summary;
pub mod tenant;
pub mod validation;

pub use audit::{AuditAction, AuditEvent, AuditMetadata, EntityType};
pub use compliance::{ComplianceCapture, JewelImage, RbiCompliance, RbiComplianceItem};
pub use envelope::{Envelope, ErrorBody, Meta};
pub use error::{CoreError, CoreResult};
pub use idempotency::{CanonicalRequest, Endpoint, IdempotencyKey, IdempotencyRecord};
pub use loan::{Loan, LoanAction, LoanStatus, NewLoan, Transition};
pub use party::{Appraiser, AppraiserStatus, Customer, NewAppraiser, NewCustomer};
pub use purity::{PurityResult, PurityScore, PurityTest};
pub use summary::{LoanSnapshot, LoanSummary};
pub use tenant::{TenantContext, TenantId};

use chrono::{DateTime, SubsecRound, Utc};

/// Sinh id mới (uuid v4)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Thời điểm hiện tại, cắt xuống microsecond để khớp với giá trị đọc lại từ DB
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
