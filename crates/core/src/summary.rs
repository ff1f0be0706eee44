//! # Summary Module
//!
//! Loan summary: JSON snapshot đóng băng tại lần generate đầu tiên.
//! Summary không bao giờ được cập nhật.

use crate::error::CoreResult;
use crate::loan::{Loan, LoanStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Các field của loan tại thời điểm generate lần đầu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub loan_id: String,
    pub status: LoanStatus,
    pub customer_id: String,
    pub appraiser_id: String,
    pub bank_id: String,
    pub branch_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Loan> for LoanSnapshot {
    fn from(loan: &Loan) -> Self {
        Self {
            loan_id: loan.id.clone(),
            status: loan.status,
            customer_id: loan.customer_id.clone(),
            appraiser_id: loan.appraiser_id.clone(),
            bank_id: loan.bank_id.clone(),
            branch_id: loan.branch_id.clone(),
            created_at: loan.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub snapshot_json: String,
    pub created_at: DateTime<Utc>,
}

impl LoanSummary {
    pub fn freeze(loan: &Loan) -> CoreResult<Self> {
        let snapshot = LoanSnapshot::from(loan);
        Ok(Self {
            id: crate::new_id(),
            tenant_id: loan.tenant_id.clone(),
            loan_id: loan.id.clone(),
            snapshot_json: serde_json::to_string(&snapshot)?,
            created_at: crate::timestamp_now(),
        })
    }

    pub fn snapshot(&self) -> CoreResult<LoanSnapshot> {
        Ok(serde_json::from_str(&self.snapshot_json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_snapshot() {
        let loan = Loan::new("t1", "cust-1", "appr-1", "bank-1", "branch-1");
        let summary = LoanSummary::freeze(&loan).unwrap();

        let snapshot = summary.snapshot().unwrap();
        assert_eq!(snapshot.loan_id, loan.id);
        assert_eq!(snapshot.status, LoanStatus::Created);
        assert_eq!(snapshot.created_at, loan.created_at);
        assert!(summary.snapshot_json.contains("\"status\":\"CREATED\""));
    }
}
