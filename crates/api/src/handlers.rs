//! API Handlers
//!
//! Mutating handler trả nguyên body từ `Outcome` (envelope đã serialize),
//! read handler bọc kết quả trong envelope mới.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{failure_response, ApiError};
use crate::extract::{ApiJson, IdemKey, Tenant};
use crate::state::AppState;
use goldloan_business::auth::{FaceVerifyRequest, LoginRequest};
use goldloan_business::images::UploadUrlRequest;
use goldloan_business::{
    AppraiserService, AuditService, AuthService, BusinessResult, ComplianceService,
    CustomerService, ImageService, LoanService, Outcome, PurityService, SummaryService,
};
use goldloan_core::idempotency::IDEMPOTENT_REPLAYED_HEADER;
use goldloan_core::{
    ComplianceCapture, CoreError, EntityType, Envelope, Meta, NewAppraiser, NewCustomer, NewLoan,
};

type HandlerResult = Result<Response, ApiError>;

// ============ Response helpers ============

/// Response cho mutating call: 201 cho create, 200 cho còn lại
fn outcome_response(state: &AppState, result: BusinessResult<Outcome>) -> HandlerResult {
    let outcome = result.map_err(|e| state.reject(e))?;
    let status = if outcome.endpoint.creates_resource() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let mut response = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        outcome.body,
    )
        .into_response();
    if outcome.replayed {
        response.headers_mut().insert(
            HeaderName::from_static(IDEMPOTENT_REPLAYED_HEADER),
            HeaderValue::from_static("true"),
        );
    }
    Ok(response)
}

/// Envelope thành công cho read endpoint
fn read_response<T: Serialize>(state: &AppState, result: BusinessResult<T>) -> HandlerResult {
    let data = result.map_err(|e| state.reject(e))?;
    let envelope = Envelope::success(data, Meta::new(state.version()));
    Ok((StatusCode::OK, Json(envelope)).into_response())
}

// ============ Fallbacks ============

/// Route không tồn tại
pub async fn route_not_found(State(state): State<AppState>) -> Response {
    failure_response(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        "Route not found".to_string(),
        state.version(),
    )
}

/// Route tồn tại nhưng không hỗ trợ method này
pub async fn method_not_allowed(State(state): State<AppState>) -> Response {
    failure_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "INVALID_REQUEST",
        "Method not allowed".to_string(),
        state.version(),
    )
}

// ============ System ============

/// Health check, không cần auth
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

// ============ Auth ============

/// `POST /auth/login` - route duy nhất không cần tenant headers
pub async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> HandlerResult {
    let result = AuthService::new(&state.ctx).login(&req);
    read_response(&state, result)
}

pub async fn face_verify(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    ApiJson(req): ApiJson<FaceVerifyRequest>,
) -> HandlerResult {
    let result = AuthService::new(&state.ctx).face_verify(&tenant, &key, req).await;
    outcome_response(&state, result)
}

// ============ Appraisers & Customers ============

pub async fn create_appraiser(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    ApiJson(req): ApiJson<NewAppraiser>,
) -> HandlerResult {
    let result = AppraiserService::new(&state.ctx).create(&tenant, &key, req).await;
    outcome_response(&state, result)
}

pub async fn list_appraisers(State(state): State<AppState>, Tenant(tenant): Tenant) -> HandlerResult {
    let result = AppraiserService::new(&state.ctx).list(&tenant).await;
    read_response(&state, result)
}

pub async fn create_customer(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    ApiJson(req): ApiJson<NewCustomer>,
) -> HandlerResult {
    let result = CustomerService::new(&state.ctx).create(&tenant, &key, req).await;
    outcome_response(&state, result)
}

// ============ Loans ============

pub async fn create_loan(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    ApiJson(req): ApiJson<NewLoan>,
) -> HandlerResult {
    let result = LoanService::new(&state.ctx).create(&tenant, &key, req).await;
    outcome_response(&state, result)
}

pub async fn get_loan(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(loan_id): Path<String>,
) -> HandlerResult {
    let result = LoanService::new(&state.ctx).get(&tenant, &loan_id).await;
    read_response(&state, result)
}

pub async fn complete_loan(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    Path(loan_id): Path<String>,
) -> HandlerResult {
    let result = LoanService::new(&state.ctx).complete(&tenant, &key, &loan_id).await;
    outcome_response(&state, result)
}

pub async fn capture_compliance(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    Path(loan_id): Path<String>,
    ApiJson(capture): ApiJson<ComplianceCapture>,
) -> HandlerResult {
    let result = ComplianceService::new(&state.ctx)
        .capture(&tenant, &key, &loan_id, capture)
        .await;
    outcome_response(&state, result)
}

pub async fn trigger_purity(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    Path(loan_id): Path<String>,
) -> HandlerResult {
    let result = PurityService::new(&state.ctx).trigger(&tenant, &key, &loan_id).await;
    outcome_response(&state, result)
}

pub async fn purity_results(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(loan_id): Path<String>,
) -> HandlerResult {
    let result = PurityService::new(&state.ctx).results(&tenant, &loan_id).await;
    read_response(&state, result)
}

pub async fn generate_summary(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    Path(loan_id): Path<String>,
) -> HandlerResult {
    let result = SummaryService::new(&state.ctx).generate(&tenant, &key, &loan_id).await;
    outcome_response(&state, result)
}

// ============ Images ============

pub async fn upload_url(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdemKey(key): IdemKey,
    ApiJson(req): ApiJson<UploadUrlRequest>,
) -> HandlerResult {
    let result = ImageService::new(&state.ctx).upload_url(&tenant, &key, req).await;
    outcome_response(&state, result)
}

// ============ Audit ============

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

pub async fn list_audit(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Query(query): Query<AuditQuery>,
) -> HandlerResult {
    let (Some(entity_type), Some(entity_id)) = (query.entity_type, query.entity_id) else {
        return Err(state.reject(CoreError::invalid_request(
            "entity_type and entity_id are required",
        )));
    };
    let entity_type = EntityType::from_str(&entity_type).ok_or_else(|| {
        state.reject(CoreError::invalid_request(format!(
            "Unknown entity_type: {}",
            entity_type
        )))
    })?;

    let result = AuditService::new(&state.ctx)
        .list(&tenant, entity_type, &entity_id)
        .await;
    read_response(&state, result)
}
