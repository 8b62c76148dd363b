//! Request validation for JSON bodies.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::records::ApplicantStatus;
use crate::web::error::ApiError;

/// A JSON extractor that runs `validator` rules after deserializing.
///
/// Malformed JSON is a 400; rule violations are a 422 with per-field
/// messages.
///
/// ```ignore
/// async fn create_applicant(
///     ValidatedJson(req): ValidatedJson<CreateApplicantRequest>,
/// ) -> Result<Json<ApplicantCreatedResponse>, ApiError> {
///     // req has passed validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Reject strings containing control characters.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Reject strings that are empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Require a known applicant status.
pub fn known_status(value: &str) -> Result<(), validator::ValidationError> {
    value.parse::<ApplicantStatus>().map(|_| ()).map_err(|_| {
        validator::ValidationError::new("known_status")
            .with_message("Status must be Pending, Approved or Rejected".into())
    })
}

/// Require a blob store address (an absolute URL path).
pub fn file_address(value: &str) -> Result<(), validator::ValidationError> {
    if !value.starts_with('/') || value.contains("..") {
        return Err(validator::ValidationError::new("file_address")
            .with_message("Must be a file path returned by the upload endpoint".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars() {
        assert!(no_control_chars("Jane Doe").is_ok());
        assert!(no_control_chars("Jane\x00Doe").is_err());
        assert!(no_control_chars("Jane\nDoe").is_err());
    }

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("AB123").is_ok());
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed(" \t ").is_err());
    }

    #[test]
    fn test_known_status() {
        assert!(known_status("Pending").is_ok());
        assert!(known_status("rejected").is_ok());
        assert!(known_status("archived").is_err());
    }

    #[test]
    fn test_file_address() {
        assert!(file_address("/uploads/AB123/passport_1.pdf").is_ok());
        assert!(file_address("uploads/AB123/passport_1.pdf").is_err());
        assert!(file_address("/uploads/../etc/passwd").is_err());
    }
}
