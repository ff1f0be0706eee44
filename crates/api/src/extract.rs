//! Request extractors
//!
//! Thứ tự kiểm tra header: Authorization → X-Tenant-ID → Idempotency-Key.
//! Handler khai báo `Tenant` trước `IdemKey` nên thứ tự được giữ.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use goldloan_core::idempotency::IDEMPOTENCY_KEY_HEADER;
use goldloan_core::tenant::{AUTHORIZATION_HEADER, TENANT_HEADER};
use goldloan_core::{IdempotencyKey, TenantContext};
use serde::de::DeserializeOwned;

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Tenant context đã resolve từ headers
pub struct Tenant(pub TenantContext);

#[async_trait]
impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        TenantContext::resolve(header(parts, AUTHORIZATION_HEADER), header(parts, TENANT_HEADER))
            .map(Tenant)
            .map_err(|e| state.reject(e))
    }
}

/// `Idempotency-Key` header, bắt buộc cho mọi mutating call
pub struct IdemKey(pub IdempotencyKey);

#[async_trait]
impl FromRequestParts<AppState> for IdemKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        IdempotencyKey::parse(header(parts, IDEMPOTENCY_KEY_HEADER))
            .map(IdemKey)
            .map_err(|e| state.reject(e))
    }
}

/// JSON body; body sai định dạng → INVALID_REQUEST trong error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::invalid_request(
                rejection_message(&rejection),
                state.version(),
            )),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    rejection.body_text()
}
