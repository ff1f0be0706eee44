//! # Tenant Module
//!
//! Tenant context được resolve từ request headers.
//! Đây chỉ là kiểm tra cấu trúc (header có đúng dạng không), KHÔNG phải
//! xác thực token. Authentication thật phải do collaborator bên ngoài đảm nhận.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header chứa bearer credential
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Header chứa tenant identifier
pub const TENANT_HEADER: &str = "x-tenant-id";

const BEARER_PREFIX: &str = "Bearer ";

/// Opaque tenant identifier - partition key cho mọi entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant context của một request.
///
/// Token được giữ lại để chuyển cho collaborator xác thực, nhưng không bao giờ
/// được in ra log (Debug impl che token).
#[derive(Clone)]
pub struct TenantContext {
    tenant_id: TenantId,
    token: String,
}

impl TenantContext {
    /// Resolve tenant context từ raw header values.
    ///
    /// - Authorization thiếu hoặc không có dạng `Bearer <token>` → `Unauthenticated`
    /// - X-Tenant-ID thiếu hoặc rỗng → `InvalidRequest`
    pub fn resolve(authorization: Option<&str>, tenant: Option<&str>) -> CoreResult<Self> {
        let token = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CoreError::Unauthenticated("Invalid Authorization header".to_string()))?;

        let tenant = tenant
            .map(str::trim)
            .filter(|tenant| !tenant.is_empty())
            .ok_or_else(|| CoreError::invalid_request("X-Tenant-ID is required"))?;

        Ok(Self {
            tenant_id: TenantId::new(tenant),
            token: token.to_string(),
        })
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Tenant id dạng &str, dùng cho SQL binds
    pub fn tenant(&self) -> &str {
        self.tenant_id.as_str()
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantContext")
            .field("tenant_id", &self.tenant_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ok() {
        let ctx = TenantContext::resolve(Some("Bearer abc"), Some("tenant-1")).unwrap();
        assert_eq!(ctx.tenant(), "tenant-1");
        assert_eq!(ctx.token(), "abc");
    }

    #[test]
    fn test_missing_or_malformed_credential() {
        let err = TenantContext::resolve(None, Some("tenant-1")).unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));

        let err = TenantContext::resolve(Some("Basic abc"), Some("tenant-1")).unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));

        let err = TenantContext::resolve(Some("Bearer   "), Some("tenant-1")).unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));
    }

    #[test]
    fn test_missing_tenant() {
        let err = TenantContext::resolve(Some("Bearer abc"), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));

        let err = TenantContext::resolve(Some("Bearer abc"), Some("  ")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_credential_checked_before_tenant() {
        let err = TenantContext::resolve(None, None).unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let ctx = TenantContext::resolve(Some("Bearer secret-token"), Some("t1")).unwrap();
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("t1"));
    }
}
