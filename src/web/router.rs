//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::api_doc::ApiDoc;
use super::handlers::{
    access_applicant, admin_list_applicants, create_applicant, current_session, delete_applicant,
    get_applicant, health_check, list_applicants, login, logout, service_info, update_applicant,
    upload_file, AppState,
};
use super::middleware::{create_cors_layer, origin_guard, security_headers, OriginPolicy};

/// Room for multipart boundaries and the non-file fields on top of the
/// file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the application router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let max_body = app_state.intake.policy().max_file_size as usize + MULTIPART_OVERHEAD_BYTES;

    let upload_routes = Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(max_body));

    // Employer routes (no authentication required)
    let applicant_routes = Router::new()
        .route("/applicants", get(list_applicants))
        .route("/applicants/:id", get(get_applicant))
        .route("/applicants/:id/access", post(access_applicant));

    // Admin routes (bearer session required except login)
    let admin_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(current_session))
        .route(
            "/applicants",
            get(admin_list_applicants).post(create_applicant),
        )
        .route(
            "/applicants/:id",
            put(update_applicant).delete(delete_applicant),
        );

    let api_routes = Router::new()
        .merge(applicant_routes)
        .nest("/admin", admin_routes);

    let files = ServeDir::new(app_state.intake.store().root());
    let files_prefix = app_state.intake.public_prefix().to_string();

    let origin_policy = Arc::new(OriginPolicy::new(cors_origins));
    if origin_policy.is_open() {
        tracing::warn!("No CORS origins configured, accepting requests from any origin");
    }

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(upload_routes)
        .nest("/api", api_routes)
        .nest_service(&files_prefix, files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(origin_policy, origin_guard))
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}
