//! API Routes

use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build router; mọi route nằm dưới `api_prefix` (rỗng hoặc "/" = root).
/// Route hoặc method không tồn tại cũng trả error envelope.
pub fn create_router(state: AppState, api_prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = api_routes();
    let prefix = api_prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(prefix, api)
    };

    router
        .fallback(handlers::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Method không khớp → 405 trong error envelope
fn methods(router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.fallback(handlers::method_not_allowed)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // System
        .route("/system/health", methods(get(handlers::health_check)))

        // Auth
        .route("/auth/login", methods(post(handlers::login)))
        .route("/auth/face-verify", methods(post(handlers::face_verify)))

        // Parties
        .route(
            "/appraisers",
            methods(post(handlers::create_appraiser).get(handlers::list_appraisers)),
        )
        .route("/customers", methods(post(handlers::create_customer)))

        // Loans
        .route("/loans", methods(post(handlers::create_loan)))
        .route("/loans/:id", methods(get(handlers::get_loan)))
        .route("/loans/:id/complete", methods(post(handlers::complete_loan)))
        .route("/loans/:id/compliance", methods(post(handlers::capture_compliance)))
        .route(
            "/loans/:id/purity-test",
            methods(post(handlers::trigger_purity).get(handlers::purity_results)),
        )
        .route("/loans/:id/summary", methods(post(handlers::generate_summary)))

        // Images & audit
        .route("/images/upload-url", methods(post(handlers::upload_url)))
        .route("/audit", methods(get(handlers::list_audit)))
}
