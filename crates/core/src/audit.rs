//! # Audit Module
//!
//! Định nghĩa AuditAction, EntityType, AuditMetadata cho audit trail.
//! Mỗi state-changing action ghi đúng một AuditEvent (append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hành động được audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // === Onboarding ===
    CreateAppraiser,
    CreateCustomer,

    // === Loan lifecycle ===
    CreateLoan,
    CaptureCompliance,
    TriggerPurityTest,
    GenerateSummary,
    CompleteLoan,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateAppraiser => "CREATE_APPRAISER",
            AuditAction::CreateCustomer => "CREATE_CUSTOMER",
            AuditAction::CreateLoan => "CREATE_LOAN",
            AuditAction::CaptureCompliance => "CAPTURE_COMPLIANCE",
            AuditAction::TriggerPurityTest => "TRIGGER_PURITY_TEST",
            AuditAction::GenerateSummary => "GENERATE_SUMMARY",
            AuditAction::CompleteLoan => "COMPLETE_LOAN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_APPRAISER" => Some(AuditAction::CreateAppraiser),
            "CREATE_CUSTOMER" => Some(AuditAction::CreateCustomer),
            "CREATE_LOAN" => Some(AuditAction::CreateLoan),
            "CAPTURE_COMPLIANCE" => Some(AuditAction::CaptureCompliance),
            "TRIGGER_PURITY_TEST" => Some(AuditAction::TriggerPurityTest),
            "GENERATE_SUMMARY" => Some(AuditAction::GenerateSummary),
            "COMPLETE_LOAN" => Some(AuditAction::CompleteLoan),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loại entity được audit tham chiếu tới (weak reference, chỉ lưu id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Appraiser,
    Customer,
    Loan,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Appraiser => "APPRAISER",
            EntityType::Customer => "CUSTOMER",
            EntityType::Loan => "LOAN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "APPRAISER" => Some(EntityType::Appraiser),
            "CUSTOMER" => Some(EntityType::Customer),
            "LOAN" => Some(EntityType::Loan),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata gắn với audit event, mỗi action có một shape cố định.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditMetadata {
    #[default]
    None,
    Compliance {
        compliance_id: String,
        total_jewel_count: i64,
    },
    PurityJob {
        job_id: String,
    },
    Summary {
        summary_id: String,
    },
    Completion {
        completed_at: DateTime<Utc>,
    },
}

/// Một dòng audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub tenant_id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(default)]
    pub metadata: AuditMetadata,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        tenant_id: &str,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Self {
        Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            metadata: AuditMetadata::None,
            created_at: crate::timestamp_now(),
        }
    }

    pub fn with_metadata(mut self, metadata: AuditMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_strings() {
        assert_eq!(AuditAction::CaptureCompliance.as_str(), "CAPTURE_COMPLIANCE");
        assert_eq!(
            AuditAction::from_str("COMPLETE_LOAN"),
            Some(AuditAction::CompleteLoan)
        );
        assert_eq!(EntityType::from_str("LOAN"), Some(EntityType::Loan));
        assert_eq!(EntityType::from_str("loan"), None);
    }

    #[test]
    fn test_metadata_tagged_json() {
        let meta = AuditMetadata::Compliance {
            compliance_id: "c-1".to_string(),
            total_jewel_count: 2,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "compliance");
        assert_eq!(json["total_jewel_count"], 2);

        let none = serde_json::to_string(&AuditMetadata::None).unwrap();
        assert_eq!(none, r#"{"kind":"none"}"#);

        let back: AuditMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_event_builder() {
        let event = AuditEvent::new("t1", AuditAction::TriggerPurityTest, EntityType::Loan, "loan-1")
            .with_metadata(AuditMetadata::PurityJob {
                job_id: "job-1".to_string(),
            });
        assert_eq!(event.entity_id, "loan-1");
        assert!(matches!(event.metadata, AuditMetadata::PurityJob { .. }));
    }
}
