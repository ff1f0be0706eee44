//! Response envelope dùng chung cho mọi endpoint.
//!
//! success → `{success: true, data, meta}`
//! failure → `{success: false, error: {code, message}, meta}`

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub request_id: String,
    pub timestamp: String,
    pub version: String,
}

impl Meta {
    pub fn new(version: &str) -> Self {
        Self::at(version, crate::timestamp_now())
    }

    pub fn at(version: &str, now: DateTime<Utc>) -> Self {
        Self {
            request_id: crate::new_id(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            version: version.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T, meta: Meta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }
}

impl Envelope<()> {
    pub fn failure(code: &str, message: impl Into<String>, meta: Meta) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.into(),
            }),
            meta,
        }
    }
}
