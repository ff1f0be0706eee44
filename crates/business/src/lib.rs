//! # Gold Loan Business
//!
//! Business logic layer - một service cho mỗi nhóm operation. Mọi mutating
//! operation đi qua `protocol::Operation` (idempotency ledger + transaction
//! + audit).

pub mod appraiser;
pub mod audit;
pub mod auth;
pub mod collaborators;
pub mod compliance;
pub mod customer;
pub mod error;
pub mod images;
pub mod ledger;
pub mod loan;
pub mod protocol;
pub mod purity;
pub mod services;
pub mod summary;

pub use appraiser::AppraiserService;
pub use audit::{AuditRecorder, AuditService};
pub use auth::AuthService;
pub use collaborators::{FaceVerifier, ImageUrlIssuer, PurityScorer};
pub use compliance::ComplianceService;
pub use customer::CustomerService;
pub use error::{BusinessError, BusinessResult};
pub use images::ImageService;
pub use ledger::{IdempotencyLedger, LedgerDecision};
pub use loan::LoanService;
pub use protocol::{Operation, Outcome};
pub use purity::PurityService;
pub use services::{Collaborators, ServiceContext};
pub use summary::SummaryService;
