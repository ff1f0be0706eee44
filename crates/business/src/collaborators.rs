//! External collaborators
//!
//! Image storage, purity scoring và face matching nằm ngoài core; core chỉ
//! gọi qua các trait hẹp dưới đây. Các stub trả kết quả cố định.

use goldloan_core::{PurityResult, PurityScore};
use serde::{Deserialize, Serialize};

/// Presigned upload slot cho một ảnh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub image_id: String,
    pub upload_url: String,
}

/// Kết quả so khớp khuôn mặt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub verified: bool,
    pub confidence: f64,
}

/// Cấp upload URL cho một image id mới
pub trait ImageUrlIssuer: Send + Sync {
    fn issue(&self, image_type: &str, loan_id: &str) -> UploadTicket;
}

/// Chấm điểm purity: pass/fail kèm confidence
pub trait PurityScorer: Send + Sync {
    fn score(&self, loan_id: &str, jewel_index: i64) -> PurityScore;
}

pub trait FaceVerifier: Send + Sync {
    fn verify(&self, appraiser_id: &str, image_id: &str) -> FaceMatch;
}

/// Stub issuer: `{base_url}/{image_id}`
#[derive(Debug, Clone)]
pub struct StubImageUrlIssuer {
    base_url: String,
}

impl StubImageUrlIssuer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for StubImageUrlIssuer {
    fn default() -> Self {
        Self::new("https://s3-presigned")
    }
}

impl ImageUrlIssuer for StubImageUrlIssuer {
    fn issue(&self, _image_type: &str, _loan_id: &str) -> UploadTicket {
        let image_id = goldloan_core::new_id();
        UploadTicket {
            upload_url: format!("{}/{}", self.base_url.trim_end_matches('/'), image_id),
            image_id,
        }
    }
}

/// Stub scorer: luôn PASS với confidence 0.92
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPurityScorer;

impl PurityScorer for StubPurityScorer {
    fn score(&self, _loan_id: &str, _jewel_index: i64) -> PurityScore {
        PurityScore {
            result: PurityResult::Pass,
            confidence: 0.92,
        }
    }
}

/// Stub verifier: luôn verified với confidence 0.93
#[derive(Debug, Clone, Copy, Default)]
pub struct StubFaceVerifier;

impl FaceVerifier for StubFaceVerifier {
    fn verify(&self, _appraiser_id: &str, _image_id: &str) -> FaceMatch {
        FaceMatch {
            verified: true,
            confidence: 0.93,
        }
    }
}
