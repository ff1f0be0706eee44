//! Application state

use crate::config::AppConfig;
use crate::error::ApiError;
use goldloan_business::{BusinessError, Collaborators, ServiceContext};
use goldloan_persistence::Database;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<ServiceContext>,
}

impl AppState {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        let collaborators = Collaborators::stubs(&config.upload_base_url);
        Self::from_context(ServiceContext::from_parts(
            db.pool().clone(),
            &config.api_version,
            collaborators,
        ))
    }

    pub fn from_context(ctx: ServiceContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn version(&self) -> &str {
        self.ctx.api_version()
    }

    /// Wrap business error với version của state
    pub fn reject(&self, error: impl Into<BusinessError>) -> ApiError {
        ApiError::new(error, self.version())
    }
}
