//! Origin allow-list enforcement.
//!
//! `CorsLayer` only decides which CORS headers to send. This guard rejects
//! browser requests from unknown origins outright so they never reach a
//! handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::ORIGIN, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::web::error::ApiError;

/// Set of origins allowed to call the API.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Build a policy. An empty list allows every origin.
    pub fn new(origins: &[String]) -> Self {
        Self {
            allowed: origins
                .iter()
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }

    /// Whether every origin is allowed.
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether a request with the given `Origin` header may proceed.
    ///
    /// Requests without an `Origin` header always may.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.is_open() => true,
            Some(origin) => self.allowed.iter().any(|allowed| allowed == origin),
        }
    }
}

/// Reject requests whose `Origin` is not allowed with 403.
pub async fn origin_guard(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req.headers().get(ORIGIN).map(|v| v.to_str().unwrap_or(""));

    if !policy.allows(origin) {
        tracing::warn!(
            origin = origin.unwrap_or_default(),
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected request from disallowed origin"
        );
        return ApiError::origin_rejected().into_response();
    }

    next.run(req).await
}
