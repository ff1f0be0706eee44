//! # Compliance Module
//!
//! RBI compliance capture: ảnh tổng thể + một ảnh cho mỗi món trang sức.
//!
//! Validation policy:
//! - `total_jewel_count` >= 1 và bằng đúng số phần tử `jewel_images`
//! - mỗi `index` >= 1 và không trùng trong cùng một capture
//! - index KHÔNG cần liên tục (1, 3, 7 là hợp lệ)

use crate::error::{CoreError, CoreResult};
use crate::validation::require_non_empty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ảnh của một món trang sức
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JewelImage {
    pub index: i64,
    pub image_id: String,
}

/// Request body của compliance capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCapture {
    pub total_jewel_count: i64,
    pub overall_image_id: String,
    pub jewel_images: Vec<JewelImage>,
}

impl ComplianceCapture {
    /// Validate trước khi ghi bất kỳ row nào
    pub fn validate(&self) -> CoreResult<()> {
        if self.jewel_images.len() as i64 != self.total_jewel_count {
            return Err(CoreError::validation(format!(
                "jewel_images count must match total_jewel_count: declared {}, got {}",
                self.total_jewel_count,
                self.jewel_images.len()
            )));
        }
        if self.total_jewel_count < 1 {
            return Err(CoreError::validation("total_jewel_count must be at least 1"));
        }
        require_non_empty("overall_image_id", &self.overall_image_id)?;

        let mut seen = HashSet::with_capacity(self.jewel_images.len());
        for jewel in &self.jewel_images {
            if jewel.index < 1 {
                return Err(CoreError::validation(format!(
                    "jewel index must be at least 1, got {}",
                    jewel.index
                )));
            }
            if !seen.insert(jewel.index) {
                return Err(CoreError::validation(format!(
                    "duplicate jewel index: {}",
                    jewel.index
                )));
            }
            require_non_empty("image_id", &jewel.image_id)?;
        }
        Ok(())
    }
}

/// Một lần compliance capture gắn với loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbiCompliance {
    pub id: String,
    pub tenant_id: String,
    pub loan_id: String,
    pub total_jewel_count: i64,
    pub overall_image_id: String,
    pub created_at: DateTime<Utc>,
}

/// Một dòng ảnh trang sức thuộc compliance capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbiComplianceItem {
    pub id: String,
    pub tenant_id: String,
    pub compliance_id: String,
    pub jewel_index: i64,
    pub jewel_image_id: String,
}

impl RbiCompliance {
    /// Build record + items từ capture đã validate
    pub fn from_capture(
        tenant_id: &str,
        loan_id: &str,
        capture: &ComplianceCapture,
    ) -> (Self, Vec<RbiComplianceItem>) {
        let record = Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            loan_id: loan_id.to_string(),
            total_jewel_count: capture.total_jewel_count,
            overall_image_id: capture.overall_image_id.clone(),
            created_at: crate::timestamp_now(),
        };
        let items = capture
            .jewel_images
            .iter()
            .map(|jewel| RbiComplianceItem {
                id: crate::new_id(),
                tenant_id: tenant_id.to_string(),
                compliance_id: record.id.clone(),
                jewel_index: jewel.index,
                jewel_image_id: jewel.image_id.clone(),
            })
            .collect();
        (record, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(count: i64, indices: &[i64]) -> ComplianceCapture {
        ComplianceCapture {
            total_jewel_count: count,
            overall_image_id: "img-overall".to_string(),
            jewel_images: indices
                .iter()
                .map(|i| JewelImage {
                    index: *i,
                    image_id: format!("img-j{}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_capture() {
        assert!(capture(1, &[1]).validate().is_ok());
        // Không cần liên tục
        assert!(capture(3, &[1, 3, 7]).validate().is_ok());
    }

    #[test]
    fn test_count_mismatch() {
        let err = capture(2, &[1]).validate().unwrap_err();
        assert!(err.to_string().contains("jewel_images count must match"));

        let err = capture(1, &[1, 2]).validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn test_index_policy() {
        assert!(capture(2, &[1, 1]).validate().is_err());
        assert!(capture(1, &[0]).validate().is_err());
        assert!(capture(0, &[]).validate().is_err());
    }

    #[test]
    fn test_from_capture() {
        let (record, items) = RbiCompliance::from_capture("t1", "loan-1", &capture(2, &[1, 2]));
        assert_eq!(record.loan_id, "loan-1");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.compliance_id == record.id));
        assert_eq!(items[1].jewel_index, 2);
    }
}
