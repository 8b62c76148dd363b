//! Employer-facing applicant handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::AppState;
use crate::records::{ApplicantFilter, ApplicantRepository, ApplicantStatus};
use crate::web::dto::{
    AccessRequest, AccessResponse, ApplicantDetails, ApplicantListQuery, ApplicantListResponse,
    ApplicantSummary, ValidatedJson,
};
use crate::web::error::ApiError;

/// Turn listing query parameters into a repository filter.
pub(crate) fn parse_filter(query: ApplicantListQuery) -> Result<ApplicantFilter, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ApplicantStatus>)
        .transpose()
        .map_err(|_| ApiError::bad_request("Status must be Pending, Approved or Rejected"))?;

    Ok(ApplicantFilter {
        search: query.search,
        status,
    })
}

/// List applicants.
#[utoipa::path(
    get,
    path = "/api/applicants",
    tag = "Applicants",
    params(ApplicantListQuery),
    responses(
        (status = 200, description = "Applicants, newest first", body = ApplicantListResponse),
        (status = 400, description = "Invalid status filter")
    )
)]
pub async fn list_applicants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ApplicantListQuery>,
) -> Result<Json<ApplicantListResponse>, ApiError> {
    let filter = parse_filter(query)?;
    let repo = ApplicantRepository::new(state.db.pool());

    let records = repo.list(&filter).await?;
    let counts = repo.status_counts().await?;

    Ok(Json(ApplicantListResponse {
        applicants: records.iter().map(ApplicantSummary::from).collect(),
        counts,
    }))
}

/// Get an applicant summary.
#[utoipa::path(
    get,
    path = "/api/applicants/{id}",
    tag = "Applicants",
    params(
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Applicant summary", body = ApplicantSummary),
        (status = 404, description = "Applicant not found")
    )
)]
pub async fn get_applicant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApplicantSummary>, ApiError> {
    let record = ApplicantRepository::new(state.db.pool())
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant not found"))?;

    Ok(Json(ApplicantSummary::from(&record)))
}

/// Check a document password.
///
/// Every call is evaluated on its own; nothing is remembered between
/// attempts. A wrong password is a normal 200 response with
/// `granted: false`.
#[utoipa::path(
    post,
    path = "/api/applicants/{id}/access",
    tag = "Applicants",
    params(
        ("id" = String, Path, description = "Record id")
    ),
    request_body = AccessRequest,
    responses(
        (status = 200, description = "Access decision", body = AccessResponse),
        (status = 404, description = "Applicant not found")
    )
)]
pub async fn access_applicant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AccessRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let record = ApplicantRepository::new(state.db.pool())
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant not found"))?;

    let decision = record.secret.authorize(&req.password);
    tracing::info!(id = %record.id, granted = decision.is_granted(), "Document access attempt");

    if decision.is_granted() {
        Ok(Json(AccessResponse::granted(ApplicantDetails::from_record(
            &record,
            &state.public_base_url,
        ))))
    } else {
        Ok(Json(AccessResponse::denied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(ApplicantListQuery {
            search: Some("jane".to_string()),
            status: Some("pending".to_string()),
        })
        .unwrap();
        assert_eq!(filter.search.as_deref(), Some("jane"));
        assert_eq!(filter.status, Some(ApplicantStatus::Pending));

        let filter = parse_filter(ApplicantListQuery {
            search: None,
            status: Some(String::new()),
        })
        .unwrap();
        assert!(filter.status.is_none());

        assert!(parse_filter(ApplicantListQuery {
            search: None,
            status: Some("archived".to_string()),
        })
        .is_err());
    }
}
