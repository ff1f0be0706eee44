//! Service context
//!
//! Mọi service nhận `&ServiceContext` (explicit dependency injection):
//! pool, API version cho envelope meta, và các external collaborators.

use crate::collaborators::{
    FaceVerifier, ImageUrlIssuer, PurityScorer, StubFaceVerifier, StubImageUrlIssuer,
    StubPurityScorer,
};
use goldloan_persistence::Database;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Default version trong envelope meta
pub const DEFAULT_API_VERSION: &str = "v1";

/// External collaborators dùng chung
#[derive(Clone)]
pub struct Collaborators {
    pub images: Arc<dyn ImageUrlIssuer>,
    pub purity: Arc<dyn PurityScorer>,
    pub faces: Arc<dyn FaceVerifier>,
}

impl Collaborators {
    /// Stub collaborators, upload URL theo `upload_base_url`
    pub fn stubs(upload_base_url: &str) -> Self {
        Self {
            images: Arc::new(StubImageUrlIssuer::new(upload_base_url)),
            purity: Arc::new(StubPurityScorer),
            faces: Arc::new(StubFaceVerifier),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            images: Arc::new(StubImageUrlIssuer::default()),
            purity: Arc::new(StubPurityScorer),
            faces: Arc::new(StubFaceVerifier),
        }
    }
}

/// Context for business operations
#[derive(Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
    api_version: String,
    collaborators: Collaborators,
}

impl ServiceContext {
    /// Tạo context từ database, dùng stub collaborators
    pub fn new(db: &Database) -> Self {
        Self::from_parts(db.pool().clone(), DEFAULT_API_VERSION, Collaborators::default())
    }

    /// Tạo trực tiếp từ pool + collaborators
    pub fn from_parts(pool: SqlitePool, api_version: &str, collaborators: Collaborators) -> Self {
        Self {
            pool,
            api_version: api_version.to_string(),
            collaborators,
        }
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}
