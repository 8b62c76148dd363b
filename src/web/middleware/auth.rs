//! Admin bearer authentication.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::access::AdminSession;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for a logged-in admin.
///
/// Requires `Authorization: Bearer <token>` naming a live session.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AdminSession);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::unauthorized("Missing authorization"))?;

        let session = state.sessions.get(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "Admin session rejected");
            ApiError::unauthorized("Invalid or expired session")
        })?;

        Ok(AdminUser(session))
    }
}
