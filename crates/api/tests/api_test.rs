//! End-to-end tests qua router (tower `oneshot`, không mở socket)

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use goldloan_api::{create_router, AppConfig, AppState};
use goldloan_persistence::Database;
use serde_json::{json, Value};
use tower::ServiceExt;

const PREFIX: &str = "/api/v1";

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    fn data(&self, name: &str) -> String {
        self.json()["data"][name].as_str().unwrap().to_string()
    }

    fn error_code(&self) -> String {
        self.json()["error"]["code"].as_str().unwrap().to_string()
    }

    fn replayed(&self) -> bool {
        self.headers.get("idempotent-replayed").is_some()
    }
}

async fn app() -> Router {
    let db = Database::in_memory().await.unwrap();
    let state = AppState::new(&db, &AppConfig::default());
    create_router(state, PREFIX)
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("{}{}", PREFIX, path));
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// POST với đủ auth + tenant + Idempotency-Key
async fn post(app: &Router, tenant: &str, key: &str, path: &str, body: Value) -> Reply {
    send(
        app,
        Method::POST,
        path,
        &[
            ("authorization", "Bearer tok"),
            ("x-tenant-id", tenant),
            ("idempotency-key", key),
        ],
        Some(body),
    )
    .await
}

async fn get(app: &Router, tenant: &str, path: &str) -> Reply {
    send(
        app,
        Method::GET,
        path,
        &[("authorization", "Bearer tok"), ("x-tenant-id", tenant)],
        None,
    )
    .await
}

fn appraiser_body(code: &str) -> Value {
    json!({
        "name": "Ravi Kumar",
        "email": "ravi@bank.com",
        "phone": "9876543210",
        "branch_id": "branch-1",
        "appraiser_code": code,
        "face_image_id": "img-face"
    })
}

fn capture_body() -> Value {
    json!({
        "total_jewel_count": 2,
        "overall_image_id": "img-all",
        "jewel_images": [
            {"index": 1, "image_id": "img-1"},
            {"index": 2, "image_id": "img-2"}
        ]
    })
}

async fn open_loan(app: &Router, tenant: &str) -> String {
    let appraiser = post(app, tenant, "a-1", "/appraisers", appraiser_body("APP001")).await;
    assert_eq!(appraiser.status, StatusCode::CREATED);
    let customer = post(
        app,
        tenant,
        "c-1",
        "/customers",
        json!({"customer_code": "C001", "name": "Suresh", "face_image_id": "img-c"}),
    )
    .await;
    assert_eq!(customer.status, StatusCode::CREATED);

    let loan = post(
        app,
        tenant,
        "l-1",
        "/loans",
        json!({
            "customer_id": customer.data("customer_id"),
            "appraiser_id": appraiser.data("appraiser_id"),
            "bank_id": "bank-1",
            "branch_id": "branch-1"
        }),
    )
    .await;
    assert_eq!(loan.status, StatusCode::CREATED);
    assert_eq!(loan.data("status"), "CREATED");
    loan.data("loan_id")
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let reply = send(&app, Method::GET, "/system/health", &[], None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["ok"], true);
}

#[tokio::test]
async fn test_header_checks() {
    let app = app().await;

    // Không có Authorization → 401, kể cả khi thiếu tenant
    let reply = send(&app, Method::GET, "/appraisers", &[], None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error_code(), "UNAUTHENTICATED");
    assert_eq!(reply.json()["success"], false);

    let reply = send(
        &app,
        Method::GET,
        "/appraisers",
        &[("authorization", "Bearer tok")],
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "INVALID_REQUEST");

    // Mutating call thiếu Idempotency-Key
    let reply = send(
        &app,
        Method::POST,
        "/customers",
        &[("authorization", "Bearer tok"), ("x-tenant-id", "t1")],
        Some(json!({"customer_code": "C", "name": "N", "face_image_id": "i"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "INVALID_REQUEST");

    let long_key = "k".repeat(256);
    let reply = post(&app, "t1", &long_key, "/customers", json!({})).await;
    assert_eq!(reply.error_code(), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_login_needs_no_tenant_headers() {
    let app = app().await;
    let reply = send(
        &app,
        Method::POST,
        "/auth/login",
        &[],
        Some(json!({
            "email": "ravi@bank.com",
            "password": "secret",
            "bank_code": "B1",
            "branch_code": "BR1"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data("role"), "APPRAISER");
    assert_eq!(reply.json()["data"]["expires_in"], 3600);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_request() {
    let app = app().await;
    let reply = post(&app, "t1", "k-1", "/customers", json!({"name": 42})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_full_lifecycle_over_http() {
    let app = app().await;
    let loan_id = open_loan(&app, "t1").await;
    let base = format!("/loans/{}", loan_id);

    let compliance = post(&app, "t1", "cmp-1", &format!("{}/compliance", base), capture_body()).await;
    assert_eq!(compliance.status, StatusCode::OK);
    assert_eq!(compliance.data("status"), "COMPLIANCE_CAPTURED");

    let purity = post(&app, "t1", "pur-1", &format!("{}/purity-test", base), json!({})).await;
    assert_eq!(purity.status, StatusCode::OK);
    assert_eq!(purity.data("status"), "PROCESSING");

    let results = get(&app, "t1", &format!("{}/purity-test", base)).await;
    assert_eq!(results.status, StatusCode::OK);
    assert_eq!(results.json()["data"].as_array().unwrap().len(), 1);

    let summary = post(&app, "t1", "sum-1", &format!("{}/summary", base), json!({})).await;
    assert_eq!(summary.status, StatusCode::OK);

    let done = post(&app, "t1", "done-1", &format!("{}/complete", base), json!({})).await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.data("status"), "COMPLETED");

    let loan = get(&app, "t1", &base).await;
    assert_eq!(loan.data("status"), "COMPLETED");

    // Loan đã đóng → 403
    let closed = post(&app, "t1", "cmp-2", &format!("{}/compliance", base), capture_body()).await;
    assert_eq!(closed.status, StatusCode::FORBIDDEN);
    assert_eq!(closed.error_code(), "LOAN_CLOSED");

    let audit = get(&app, "t1", &format!("/audit?entity_type=LOAN&entity_id={}", loan_id)).await;
    let actions: Vec<String> = audit.json()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        actions,
        vec![
            "CREATE_LOAN",
            "CAPTURE_COMPLIANCE",
            "TRIGGER_PURITY_TEST",
            "GENERATE_SUMMARY",
            "COMPLETE_LOAN"
        ]
    );
}

#[tokio::test]
async fn test_replay_is_byte_identical() {
    let app = app().await;
    let loan_id = open_loan(&app, "t1").await;
    let path = format!("/loans/{}/compliance", loan_id);

    let first = post(&app, "t1", "cmp-1", &path, capture_body()).await;
    let second = post(&app, "t1", "cmp-1", &path, capture_body()).await;

    assert!(!first.replayed());
    assert!(second.replayed());
    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);

    // Replay của create giữ nguyên 201
    let appraiser = post(&app, "t1", "a-1", "/appraisers", appraiser_body("APP001")).await;
    assert_eq!(appraiser.status, StatusCode::CREATED);
    assert!(appraiser.replayed());
}

#[tokio::test]
async fn test_key_reuse_with_different_body_conflicts() {
    let app = app().await;
    let first = post(&app, "t1", "a-1", "/appraisers", appraiser_body("APP001")).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let conflict = post(&app, "t1", "a-1", "/appraisers", appraiser_body("APP002")).await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert_eq!(conflict.error_code(), "IDEMPOTENCY_KEY_CONFLICT");

    let list = get(&app, "t1", "/appraisers").await;
    assert_eq!(list.json()["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tenant_isolation_over_http() {
    let app = app().await;
    let loan_id = open_loan(&app, "t1").await;

    let other = get(&app, "t2", &format!("/loans/{}", loan_id)).await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);
    assert_eq!(other.error_code(), "NOT_FOUND");

    let list = get(&app, "t2", "/appraisers").await;
    assert!(list.json()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_query_requires_both_params() {
    let app = app().await;
    let reply = get(&app, "t1", "/audit?entity_type=LOAN").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "INVALID_REQUEST");

    let reply = get(&app, "t1", "/audit?entity_type=SHIP&entity_id=x").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_url_and_face_verify() {
    let app = app().await;
    let upload = post(
        &app,
        "t1",
        "up-1",
        "/images/upload-url",
        json!({"image_type": "JEWEL", "loan_id": "loan-x"}),
    )
    .await;
    assert_eq!(upload.status, StatusCode::OK);
    let image_id = upload.data("image_id");
    assert!(upload.data("upload_url").ends_with(&image_id));

    let face = post(
        &app,
        "t1",
        "fv-1",
        "/auth/face-verify",
        json!({"appraiser_id": "appr-1", "image_id": image_id}),
    )
    .await;
    assert_eq!(face.status, StatusCode::OK);
    assert_eq!(face.json()["data"]["verified"], true);
}

#[tokio::test]
async fn test_unknown_route_and_method_use_error_envelope() {
    let app = app().await;

    let missing = get(&app, "t1", "/no-such-route").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), "NOT_FOUND");
    assert_eq!(missing.json()["success"], false);
    assert_eq!(missing.json()["meta"]["version"], "v1");

    // /customers chỉ có POST
    let wrong_method = get(&app, "t1", "/customers").await;
    assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(wrong_method.error_code(), "INVALID_REQUEST");
    assert_eq!(wrong_method.json()["success"], false);
}
