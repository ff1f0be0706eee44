//! # Idempotency Module
//!
//! Key, endpoint scope và content fingerprint cho idempotency ledger.
//!
//! Fingerprint = sha256 của canonical JSON (keys sắp xếp đệ quy), nên hai body
//! có cùng cấu trúc luôn cho cùng fingerprint bất kể thứ tự key.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Header chứa client-chosen idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Header gắn vào response được replay từ ledger
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "idempotent-replayed";

/// Độ dài tối đa của key
pub const MAX_KEY_LENGTH: usize = 255;

/// Client-supplied idempotency key, đã kiểm tra độ dài.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Parse giá trị header (None = header không có)
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        let key = raw.map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(CoreError::invalid_request("Idempotency-Key header is required"));
        }
        if key.chars().count() > MAX_KEY_LENGTH {
            return Err(CoreError::invalid_request(format!(
                "Idempotency-Key must be at most {} characters",
                MAX_KEY_LENGTH
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical endpoint mà một key được scope vào.
///
/// Cùng một key có thể dùng lại an toàn cho các endpoint khác nhau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FaceVerify,
    CreateAppraiser,
    CreateCustomer,
    CreateLoan,
    CompleteLoan,
    CaptureCompliance,
    TriggerPurityTest,
    GenerateSummary,
    UploadUrl,
}

impl Endpoint {
    /// Route template, cũng là giá trị lưu trong cột `endpoint`
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::FaceVerify => "POST /auth/face-verify",
            Endpoint::CreateAppraiser => "POST /appraisers",
            Endpoint::CreateCustomer => "POST /customers",
            Endpoint::CreateLoan => "POST /loans",
            Endpoint::CompleteLoan => "POST /loans/{id}/complete",
            Endpoint::CaptureCompliance => "POST /loans/{id}/compliance",
            Endpoint::TriggerPurityTest => "POST /loans/{id}/purity-test",
            Endpoint::GenerateSummary => "POST /loans/{id}/summary",
            Endpoint::UploadUrl => "POST /images/upload-url",
        }
    }

    /// Endpoint tạo resource mới (trả 201 thay vì 200)
    pub fn creates_resource(&self) -> bool {
        matches!(
            self,
            Endpoint::CreateAppraiser | Endpoint::CreateCustomer | Endpoint::CreateLoan
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input đã chuẩn hoá để tính fingerprint.
///
/// Mỗi operation có đúng một builder: body-only, path-only, hoặc path + body.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest(Value);

impl CanonicalRequest {
    /// Body của request (không có path parameter)
    pub fn from_body<T: Serialize>(body: &T) -> CoreResult<Self> {
        Ok(Self(serde_json::to_value(body)?))
    }

    /// Path-only operation: canonical body là `{loan_id}`
    pub fn for_loan(loan_id: &str) -> Self {
        let mut map = Map::new();
        map.insert("loan_id".to_string(), Value::String(loan_id.to_string()));
        Self(Value::Object(map))
    }

    /// Path + body: `loan_id` đặt cạnh body, không merge vào body.
    pub fn for_loan_with_body<T: Serialize>(loan_id: &str, body: &T) -> CoreResult<Self> {
        let mut map = Map::new();
        map.insert("body".to_string(), serde_json::to_value(body)?);
        map.insert("loan_id".to_string(), Value::String(loan_id.to_string()));
        Ok(Self(Value::Object(map)))
    }

    /// Chuỗi JSON canonical (keys sắp xếp ở mọi cấp)
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        write_canonical(&self.0, &mut out);
        out
    }

    /// SHA256 hex của canonical string
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Tự sắp xếp key thay vì dựa vào thứ tự của `serde_json::Map`: chỉ cần một
/// crate trong dependency graph bật feature `preserve_order` là Map thành
/// IndexMap (theo thứ tự insert) và fingerprint của record cũ không còn khớp.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Serialize key qua serde_json để escape đúng
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                if let Some(v) = map.get(*key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Record đã commit trong ledger. Không bao giờ update hay xoá.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub tenant_id: String,
    pub key: String,
    pub endpoint: String,
    pub request_hash: String,
    /// Envelope JSON nguyên văn đã trả về lần đầu
    pub response_payload: String,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn new(
        tenant_id: &str,
        key: &IdempotencyKey,
        endpoint: Endpoint,
        request: &CanonicalRequest,
        response_payload: String,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            key: key.as_str().to_string(),
            endpoint: endpoint.as_str().to_string(),
            request_hash: request.fingerprint(),
            response_payload,
            created_at: crate::timestamp_now(),
        }
    }

    pub fn matches(&self, request: &CanonicalRequest) -> bool {
        self.request_hash == request.fingerprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_parse() {
        assert!(IdempotencyKey::parse(Some("k-1")).is_ok());
        assert!(IdempotencyKey::parse(None).is_err());
        assert!(IdempotencyKey::parse(Some("   ")).is_err());

        let long = "x".repeat(MAX_KEY_LENGTH + 1);
        let err = IdempotencyKey::parse(Some(&long)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
        assert!(IdempotencyKey::parse(Some(&"x".repeat(MAX_KEY_LENGTH))).is_ok());
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a = CanonicalRequest::from_body(&json!({"b": 1, "a": {"y": [1, 2], "x": "s"}})).unwrap();
        let b = CanonicalRequest::from_body(&json!({"a": {"x": "s", "y": [1, 2]}, "b": 1})).unwrap();
        assert_eq!(a.canonical_string(), r#"{"a":{"x":"s","y":[1,2]},"b":1}"#);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_stable_across_insert_order() {
        // Fingerprint đã lưu trong ledger phải khớp bất kể thứ tự insert vào Map
        let mut map = Map::new();
        map.insert("b".to_string(), json!(1));
        map.insert("a".to_string(), json!(2));
        let req = CanonicalRequest::from_body(&Value::Object(map)).unwrap();

        assert_eq!(req.canonical_string(), r#"{"a":2,"b":1}"#);
        assert_eq!(
            req.fingerprint(),
            "d3626ac30a87e6f7a6428233b3c68299976865fa5508e4267c5415c76af7a772"
        );
    }

    #[test]
    fn test_fingerprint_detects_changes() {
        let a = CanonicalRequest::from_body(&json!({"items": [1, 2]})).unwrap();
        let b = CanonicalRequest::from_body(&json!({"items": [2, 1]})).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());

        assert_ne!(
            CanonicalRequest::for_loan("loan-1").fingerprint(),
            CanonicalRequest::for_loan("loan-2").fingerprint()
        );
    }

    #[test]
    fn test_loan_with_body_keeps_path_separate() {
        let req = CanonicalRequest::for_loan_with_body("loan-1", &json!({"loan_id": "other"})).unwrap();
        assert_eq!(
            req.canonical_string(),
            r#"{"body":{"loan_id":"other"},"loan_id":"loan-1"}"#
        );
    }

    #[test]
    fn test_endpoint_scope() {
        assert!(Endpoint::CreateLoan.creates_resource());
        assert!(!Endpoint::CompleteLoan.creates_resource());
        assert_eq!(Endpoint::CaptureCompliance.as_str(), "POST /loans/{id}/compliance");
    }

    #[test]
    fn test_record_matches() {
        let key = IdempotencyKey::parse(Some("k")).unwrap();
        let req = CanonicalRequest::for_loan("loan-1");
        let record = IdempotencyRecord::new("t1", &key, Endpoint::CompleteLoan, &req, "{}".to_string());
        assert!(record.matches(&req));
        assert!(!record.matches(&CanonicalRequest::for_loan("loan-2")));
    }
}
