//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto;
use super::handlers;
use crate::records::{ApplicantStatus, StatusCounts};

/// Registers the admin bearer token scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Portal API",
        description = "Applicant document intake, records and password-gated access."
    ),
    paths(
        handlers::status::service_info,
        handlers::status::health_check,
        handlers::upload::upload_file,
        handlers::applicants::list_applicants,
        handlers::applicants::get_applicant,
        handlers::applicants::access_applicant,
        handlers::admin::login,
        handlers::admin::logout,
        handlers::admin::current_session,
        handlers::admin::admin_list_applicants,
        handlers::admin::create_applicant,
        handlers::admin::update_applicant,
        handlers::admin::delete_applicant,
    ),
    components(
        schemas(
            ApplicantStatus,
            StatusCounts,
            dto::ServiceInfoResponse,
            dto::HealthResponse,
            dto::MessageResponse,
            dto::UploadResponse,
            dto::ApplicantSummary,
            dto::ApplicantListResponse,
            dto::ApplicantDetails,
            dto::AccessRequest,
            dto::AccessResponse,
            dto::AdminApplicant,
            dto::AdminApplicantListResponse,
            dto::LoginRequest,
            dto::LoginResponse,
            dto::SessionResponse,
            dto::CreateApplicantRequest,
            dto::UpdateApplicantRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Service", description = "Service status"),
        (name = "Upload", description = "Document intake"),
        (name = "Applicants", description = "Employer-facing applicant listing and document access"),
        (name = "Admin", description = "Admin login and applicant management")
    )
)]
pub struct ApiDoc;
