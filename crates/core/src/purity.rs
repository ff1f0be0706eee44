//! # Purity Module
//!
//! Kết quả purity test. Việc chấm điểm do engine bên ngoài thực hiện; module
//! này chỉ giữ dạng kết quả được lưu xuống DB.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status trả về khi trigger purity test
pub const PURITY_JOB_PROCESSING: &str = "PROCESSING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurityResult {
    Pass,
    Fail,
}

impl PurityResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurityResult::Pass => "PASS",
            PurityResult::Fail => "FAIL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PASS" => Some(PurityResult::Pass),
            "FAIL" => Some(PurityResult::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for PurityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kết quả của scoring engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurityScore {
    pub result: PurityResult,
    pub confidence: f64,
}

/// Tối đa một record cho mỗi (tenant, loan)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurityTest {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub jewel_index: i64,
    pub result: PurityResult,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

impl PurityTest {
    pub fn record(tenant_id: &str, loan_id: &str, jewel_index: i64, score: PurityScore) -> Self {
        Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            loan_id: loan_id.to_string(),
            jewel_index,
            result: score.result,
            confidence_score: score.confidence,
            created_at: crate::timestamp_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_score() {
        let score = PurityScore {
            result: PurityResult::Pass,
            confidence: 0.92,
        };
        let test = PurityTest::record("t1", "loan-1", 1, score);
        assert_eq!(test.result, PurityResult::Pass);
        assert_eq!(test.confidence_score, 0.92);
        assert_eq!(PurityResult::from_str(test.result.as_str()), Some(PurityResult::Pass));
    }
}
