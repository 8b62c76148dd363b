//! Admin handlers: login and applicant management.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use super::applicants::parse_filter;
use super::AppState;
use crate::access::{verify_password, DocumentSecret};
use crate::records::{ApplicantRepository, ApplicantStatus, ApplicantUpdate, NewApplicant};
use crate::web::dto::{
    AdminApplicant, AdminApplicantListResponse, ApplicantListQuery, CreateApplicantRequest,
    LoginRequest, LoginResponse, MessageResponse, SessionResponse, UpdateApplicantRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AdminUser;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn parse_status(value: Option<&str>) -> Result<Option<ApplicantStatus>, ApiError> {
    value
        .map(str::parse::<ApplicantStatus>)
        .transpose()
        .map_err(ApiError::bad_request)
}

fn document_secret(state: &AppState, password: &str) -> Result<DocumentSecret, ApiError> {
    DocumentSecret::new(password, state.hash_document_passwords).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash document password");
        ApiError::internal()
    })
}

/// Log in as admin.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(admin) = &state.admin else {
        warn!("Admin login attempted but no admin account is configured");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let email_matches = req.email.trim().eq_ignore_ascii_case(&admin.email);
    if !email_matches || verify_password(&req.password, &admin.password_hash).is_err() {
        warn!(email = %req.email, "Failed admin login");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let session = state.sessions.create(&admin.email);
    Ok(Json(LoginResponse::from(session)))
}

/// Log out, ending the current session.
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "Admin",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AdminUser(session): AdminUser,
) -> Json<MessageResponse> {
    state.sessions.remove(&session.token);
    info!(email = %session.email, "Admin logged out");
    Json(MessageResponse::new("Logged out"))
}

/// Describe the current session.
#[utoipa::path(
    get,
    path = "/api/admin/session",
    tag = "Admin",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn current_session(AdminUser(session): AdminUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: session.email,
        expires_at: session.expires_at,
    })
}

/// List applicants with full details.
#[utoipa::path(
    get,
    path = "/api/admin/applicants",
    tag = "Admin",
    params(ApplicantListQuery),
    responses(
        (status = 200, description = "Applicants, newest first", body = AdminApplicantListResponse),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_list_applicants(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ApplicantListQuery>,
) -> Result<Json<AdminApplicantListResponse>, ApiError> {
    let filter = parse_filter(query)?;
    let repo = ApplicantRepository::new(state.db.pool());

    let records = repo.list(&filter).await?;
    let counts = repo.status_counts().await?;

    Ok(Json(AdminApplicantListResponse {
        applicants: records
            .iter()
            .map(|r| AdminApplicant::from_record(r, &state.public_base_url))
            .collect(),
        counts,
    }))
}

/// Create an applicant record for an uploaded document.
///
/// The file path must come from a successful upload; unknown paths are
/// rejected so no record ever points at a missing file.
#[utoipa::path(
    post,
    path = "/api/admin/applicants",
    tag = "Admin",
    request_body = CreateApplicantRequest,
    responses(
        (status = 201, description = "Record created", body = AdminApplicant),
        (status = 400, description = "File not found in storage"),
        (status = 401, description = "Not logged in"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_applicant(
    State(state): State<Arc<AppState>>,
    AdminUser(session): AdminUser,
    ValidatedJson(req): ValidatedJson<CreateApplicantRequest>,
) -> Result<(StatusCode, Json<AdminApplicant>), ApiError> {
    let status = parse_status(req.status.as_deref())?.unwrap_or_default();

    let path = state.intake.resolve_address(&req.file_path).ok_or_else(|| {
        ApiError::bad_request("File not found in storage. Upload the document first.")
    })?;

    let file_size = match req.file_size {
        Some(size) => size,
        None => {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(crate::PortalError::from)?;
            metadata.len() as i64
        }
    };

    let new = NewApplicant {
        name: req.name.trim().to_string(),
        passport_number: req.passport_number.trim().to_string(),
        secret: document_secret(&state, &req.doc_password)?,
        file_path: req.file_path,
        file_name: req.file_name,
        file_type: req.file_type,
        file_size,
        status,
        created_by: Some(session.email.clone()),
    };

    let record = ApplicantRepository::new(state.db.pool()).create(&new).await?;
    info!(id = %record.id, created_by = %session.email, "Applicant record created");

    Ok((
        StatusCode::CREATED,
        Json(AdminApplicant::from_record(&record, &state.public_base_url)),
    ))
}

/// Edit an applicant record.
#[utoipa::path(
    put,
    path = "/api/admin/applicants/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Record id")
    ),
    request_body = UpdateApplicantRequest,
    responses(
        (status = 200, description = "Record updated", body = AdminApplicant),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Applicant not found"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_applicant(
    State(state): State<Arc<AppState>>,
    AdminUser(session): AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateApplicantRequest>,
) -> Result<Json<AdminApplicant>, ApiError> {
    let update = ApplicantUpdate {
        name: req.name.map(|n| n.trim().to_string()),
        passport_number: req.passport_number.map(|p| p.trim().to_string()),
        secret: req
            .doc_password
            .as_deref()
            .map(|p| document_secret(&state, p))
            .transpose()?,
        status: parse_status(req.status.as_deref())?,
    };

    let record = ApplicantRepository::new(state.db.pool())
        .update(&id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant not found"))?;

    info!(id = %record.id, updated_by = %session.email, "Applicant record updated");
    Ok(Json(AdminApplicant::from_record(
        &record,
        &state.public_base_url,
    )))
}

/// Delete an applicant record. The stored file is kept.
#[utoipa::path(
    delete,
    path = "/api/admin/applicants/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Applicant not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_applicant(
    State(state): State<Arc<AppState>>,
    AdminUser(session): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = ApplicantRepository::new(state.db.pool()).delete(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Applicant not found"));
    }

    info!(id = %id, deleted_by = %session.email, "Applicant record deleted");
    Ok(Json(MessageResponse::new("Applicant deleted")))
}
