//! File upload handler.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::AppState;
use crate::intake::{IntakeError, PendingUpload};
use crate::web::dto::UploadResponse;
use crate::web::error::ApiError;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the passport number.
pub const PASSPORT_FIELD: &str = "passportNumber";

/// Map a multipart parsing failure to an API error.
fn multipart_error(state: &AppState, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return IntakeError::FileTooLarge {
            max_bytes: state.intake.policy().max_file_size,
        }
        .into();
    }
    debug!(error = %err, "Malformed multipart request");
    ApiError::bad_request(format!("Invalid upload request: {}", err.body_text()))
}

/// Upload an applicant document.
///
/// Request body: multipart/form-data with `file` (JPG, PNG or PDF) and
/// `passportNumber` fields.
///
/// The file is streamed into the holding area and moved under the
/// applicant's directory once the whole request has been read. Any error
/// discards the partial file.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Upload",
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing field, bad file type or file too large"),
        (status = 403, description = "Origin not allowed"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Upload is not a multipart request");
        ApiError::bad_request(format!("Invalid upload request: {}", e.body_text()))
    })?;
    let mut pending: Option<PendingUpload> = None;
    let mut passport_number: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                if pending.is_some() {
                    return Err(ApiError::bad_request("Only one file may be uploaded"));
                }
                let original_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().unwrap_or_default().to_string();

                let mut upload = state.intake.begin(&original_name, &mime_type)?;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(&state, e))?
                {
                    upload.write_chunk(&chunk)?;
                }
                pending = Some(upload);
            }
            PASSPORT_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&state, e))?;
                passport_number = Some(value);
            }
            other => {
                debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let stored = state.intake.complete(pending, passport_number.as_deref())?;
    Ok(Json(UploadResponse::from(stored)))
}
