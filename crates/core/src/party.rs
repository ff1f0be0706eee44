//! # Party Module
//!
//! Appraiser và Customer - các bên tham gia một khoản vay.
//! Cả hai đều immutable sau khi tạo (không có update endpoint).

use crate::error::CoreResult;
use crate::validation::{require_fields, validate_email};
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trạng thái của Appraiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppraiserStatus {
    Active,
    Inactive,
}

impl AppraiserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppraiserStatus::Active => "ACTIVE",
            AppraiserStatus::Inactive => "INACTIVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(AppraiserStatus::Active),
            "INACTIVE" => Some(AppraiserStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for AppraiserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body để đăng ký appraiser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppraiser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub branch_id: String,
    pub appraiser_code: String,
    pub face_image_id: String,
}

impl NewAppraiser {
    pub fn validate(&self) -> CoreResult<()> {
        require_fields(&[
            ("name", &self.name),
            ("phone", &self.phone),
            ("branch_id", &self.branch_id),
            ("appraiser_code", &self.appraiser_code),
            ("face_image_id", &self.face_image_id),
        ])?;
        if !validate_email(&self.email) {
            return Err(CoreError::validation(format!("Invalid email: {}", self.email)));
        }
        Ok(())
    }
}

/// Thẩm định viên vàng, thuộc về một tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appraiser {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub branch_id: String,
    pub appraiser_code: String,
    pub face_image_id: String,
    pub status: AppraiserStatus,
    pub created_at: DateTime<Utc>,
}

impl Appraiser {
    /// Tạo Appraiser mới từ request đã validate
    pub fn register(tenant_id: &str, req: NewAppraiser) -> Self {
        Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            name: req.name,
            email: req.email,
            phone: req.phone,
            branch_id: req.branch_id,
            appraiser_code: req.appraiser_code,
            face_image_id: req.face_image_id,
            status: AppraiserStatus::Active,
            created_at: crate::timestamp_now(),
        }
    }
}

/// Request body để tạo customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_code: String,
    pub name: String,
    pub face_image_id: String,
}

impl NewCustomer {
    pub fn validate(&self) -> CoreResult<()> {
        require_fields(&[
            ("customer_code", &self.customer_code),
            ("name", &self.name),
            ("face_image_id", &self.face_image_id),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub customer_code: String,
    pub name: String,
    pub face_image_id: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn register(tenant_id: &str, req: NewCustomer) -> Self {
        Self {
            id: crate::new_id(),
            tenant_id: tenant_id.to_string(),
            customer_code: req.customer_code,
            name: req.name,
            face_image_id: req.face_image_id,
            created_at: crate::timestamp_now(),
        }
    }
}
