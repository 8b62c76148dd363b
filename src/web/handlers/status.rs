//! Service status handlers.

use axum::Json;
use chrono::Utc;

use crate::web::dto::{HealthResponse, ServiceInfoResponse};

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "Service",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfoResponse)
    )
)]
pub async fn service_info() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        message: "Document portal file server is running".to_string(),
        status: "Active".to_string(),
        timestamp: Utc::now(),
    })
}

/// Health check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Service",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        server: "running".to_string(),
    })
}
