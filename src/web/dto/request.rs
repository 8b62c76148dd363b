//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{file_address, known_status, no_control_chars, not_empty_trimmed};

/// Admin login request.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Admin email.
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    /// Admin password.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Create an applicant record for an uploaded document.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantRequest {
    /// Applicant name.
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    /// Passport number as entered.
    #[validate(
        length(max = 50, message = "Passport number must be at most 50 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub passport_number: String,
    /// Password employers must enter to view the document.
    #[validate(length(
        min = 1,
        max = 128,
        message = "Document password must be between 1 and 128 characters"
    ))]
    pub doc_password: String,
    /// `filePath` returned by `POST /upload`.
    #[validate(custom(function = "file_address"))]
    pub file_path: String,
    /// Original filename.
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub file_name: String,
    /// Declared MIME type.
    #[validate(length(min = 1, max = 100, message = "File type must be between 1 and 100 characters"))]
    pub file_type: String,
    /// File size in bytes. Read from the stored file when omitted.
    #[serde(default)]
    #[validate(range(min = 0, message = "File size must not be negative"))]
    pub file_size: Option<i64>,
    /// Initial status, `Approved` when omitted.
    #[serde(default)]
    #[validate(custom(function = "known_status"))]
    pub status: Option<String>,
}

/// Edit an applicant record. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicantRequest {
    /// New name.
    #[serde(default)]
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: Option<String>,
    /// New passport number.
    #[serde(default)]
    #[validate(
        length(max = 50, message = "Passport number must be at most 50 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub passport_number: Option<String>,
    /// New document password.
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 128,
        message = "Document password must be between 1 and 128 characters"
    ))]
    pub doc_password: Option<String>,
    /// New status.
    #[serde(default)]
    #[validate(custom(function = "known_status"))]
    pub status: Option<String>,
}

/// Password attempt for a record.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AccessRequest {
    /// Password as typed by the viewer.
    #[serde(default)]
    pub password: String,
}

/// Listing query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicantListQuery {
    /// Case-insensitive substring of name or passport number.
    pub search: Option<String>,
    /// Exact status (Pending, Approved, Rejected).
    pub status: Option<String>,
}
