//! # Loan Module
//!
//! Định nghĩa Loan và state machine của nó.
//!
//! ```text
//! CREATED ──┬──> COMPLIANCE_CAPTURED ──┐
//!           │          ▲   │           │
//!           │          │   ▼           ├──> COMPLETED (terminal)
//!           └──> PURITY_TESTED ────────┘
//! ```
//!
//! Mọi trạng thái khác COMPLETED đều là "open". Compliance capture và purity
//! trigger được phép từ bất kỳ open state nào; mỗi thao tác ghi đè status bằng
//! label của chính nó (last write wins).

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trạng thái của Loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Created,
    ComplianceCaptured,
    PurityTested,
    /// Terminal
    Completed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Created => "CREATED",
            LoanStatus::ComplianceCaptured => "COMPLIANCE_CAPTURED",
            LoanStatus::PurityTested => "PURITY_TESTED",
            LoanStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(LoanStatus::Created),
            "COMPLIANCE_CAPTURED" => Some(LoanStatus::ComplianceCaptured),
            "PURITY_TESTED" => Some(LoanStatus::PurityTested),
            "COMPLETED" => Some(LoanStatus::Completed),
            _ => None,
        }
    }

    /// Parse status đọc từ DB, lỗi nếu không nhận ra
    pub fn parse(s: &str) -> CoreResult<Self> {
        Self::from_str(s).ok_or_else(|| CoreError::UnknownLoanStatus(s.to_string()))
    }

    /// Kiểm tra loan còn mở không
    pub fn is_open(&self) -> bool {
        !matches!(self, LoanStatus::Completed)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Các thao tác mutating trên loan sub-resources, được state machine kiểm soát.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    CaptureCompliance,
    TriggerPurityTest,
    /// Tạo summary snapshot lần đầu (không đổi status)
    GenerateSummary,
    Complete,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanAction::CaptureCompliance => "capture_compliance",
            LoanAction::TriggerPurityTest => "trigger_purity_test",
            LoanAction::GenerateSummary => "generate_summary",
            LoanAction::Complete => "complete",
        }
    }
}

/// Kết quả của một transition hợp lệ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Status chuyển sang giá trị mới
    Advance(LoanStatus),
    /// Thao tác hợp lệ nhưng không đổi status
    Unchanged,
    /// Complete gọi lại trên loan đã COMPLETED: no-op
    AlreadyCompleted,
}

impl LoanStatus {
    /// Áp dụng action lên status hiện tại.
    ///
    /// Trên loan COMPLETED mọi action đều bị từ chối với `LoanClosed`,
    /// trừ `Complete` (trả về `AlreadyCompleted`).
    pub fn apply(self, action: LoanAction, loan_id: &str) -> CoreResult<Transition> {
        match (self, action) {
            (LoanStatus::Completed, LoanAction::Complete) => Ok(Transition::AlreadyCompleted),
            (LoanStatus::Completed, _) => Err(CoreError::LoanClosed(loan_id.to_string())),
            (_, LoanAction::CaptureCompliance) => {
                Ok(Transition::Advance(LoanStatus::ComplianceCaptured))
            }
            (_, LoanAction::TriggerPurityTest) => Ok(Transition::Advance(LoanStatus::PurityTested)),
            (_, LoanAction::GenerateSummary) => Ok(Transition::Unchanged),
            (_, LoanAction::Complete) => Ok(Transition::Advance(LoanStatus::Completed)),
        }
    }
}

/// Request body để tạo loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: String,
    pub appraiser_id: String,
    pub bank_id: String,
    pub branch_id: String,
}

impl NewLoan {
    pub fn validate(&self) -> CoreResult<()> {
        crate::validation::require_fields(&[
            ("customer_id", &self.customer_id),
            ("appraiser_id", &self.appraiser_id),
            ("bank_id", &self.bank_id),
            ("branch_id", &self.branch_id),
        ])
    }
}

/// Khoản vay cầm vàng.
///
/// Invariant: `completed_at` có giá trị khi và chỉ khi `status == Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub appraiser_id: String,
    pub bank_id: String,
    pub branch_id: String,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Tạo Loan từ request đã validate
    pub fn open(tenant_id: &str, req: &NewLoan) -> Self {
        Self::new(
            tenant_id,
            &req.customer_id,
            &req.appraiser_id,
            &req.bank_id,
            &req.branch_id,
        )
    }

    /// Tạo Loan mới với status CREATED
    pub fn new(
        tenant_id: &str,
        customer_id: &str,
        appraiser_id: &str,
        bank_id: &str,
        branch_id: &str,
    ) -> Self {
        Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            customer_id: customer_id.to_string(),
            appraiser_id: appraiser_id.to_string(),
            bank_id: bank_id.to_string(),
            branch_id: branch_id.to_string(),
            status: LoanStatus::Created,
            created_at: crate::timestamp_now(),
            completed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Fail với `LoanClosed` nếu loan đã COMPLETED
    pub fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::LoanClosed(self.id.clone()))
        }
    }

    /// Áp dụng action và cập nhật status / completed_at tương ứng.
    pub fn transition(&mut self, action: LoanAction, now: DateTime<Utc>) -> CoreResult<Transition> {
        let transition = self.status.apply(action, &self.id)?;
        if let Transition::Advance(next) = transition {
            self.status = next;
            if next == LoanStatus::Completed {
                self.completed_at = Some(now);
            }
        }
        Ok(transition)
    }

    /// Kiểm tra invariant completed_at <=> COMPLETED
    pub fn is_consistent(&self) -> bool {
        (self.status == LoanStatus::Completed) == self.completed_at.is_some()
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan {} (customer: {}, appraiser: {}, status: {})",
            self.id, self.customer_id, self.appraiser_id, self.status
        )
    }
}
