//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::access::{AdminSession, DocumentSecret};
use crate::intake::StoredFile;
use crate::records::{ApplicantRecord, ApplicantStatus, StatusCounts};

/// Join the public base URL and a file address.
pub fn file_url(public_base_url: &str, file_path: &str) -> String {
    format!("{}{}", public_base_url.trim_end_matches('/'), file_path)
}

// ============================================================================
// Service
// ============================================================================

/// `GET /` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfoResponse {
    /// Service banner.
    pub message: String,
    /// Always `Active`.
    pub status: String,
    /// Current server time.
    pub timestamp: DateTime<Utc>,
}

/// `GET /health` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `OK`.
    pub status: String,
    /// Always `running`.
    pub server: String,
}

/// Plain success message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Create a success message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// Upload
// ============================================================================

/// Successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
    /// Address of the stored file.
    pub file_path: String,
    /// Generated stored filename.
    pub file_name: String,
    /// Client-supplied filename.
    pub original_name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Declared MIME type.
    pub file_type: String,
    /// Sanitized passport number.
    pub passport_number: String,
}

impl From<StoredFile> for UploadResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            success: true,
            message: "File uploaded successfully!".to_string(),
            file_path: file.address,
            file_name: file.file_name,
            original_name: file.original_name,
            file_size: file.size,
            file_type: file.mime_type,
            passport_number: file.applicant_id.to_string(),
        }
    }
}

// ============================================================================
// Applicants
// ============================================================================

/// Public listing entry. Never includes the password or file location.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    /// Record id.
    pub id: String,
    /// Applicant name.
    pub name: String,
    /// Passport number.
    pub passport_number: String,
    /// Review status.
    pub status: ApplicantStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&ApplicantRecord> for ApplicantSummary {
    fn from(record: &ApplicantRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            passport_number: record.passport_number.clone(),
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Public listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicantListResponse {
    /// Matching records, newest first.
    pub applicants: Vec<ApplicantSummary>,
    /// Counts over all records.
    pub counts: StatusCounts,
}

/// Record details revealed after a granted access check.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    /// Record id.
    pub id: String,
    /// Applicant name.
    pub name: String,
    /// Passport number.
    pub passport_number: String,
    /// Review status.
    pub status: ApplicantStatus,
    /// Address of the stored document.
    pub file_path: String,
    /// Download URL for the document.
    pub file_url: String,
    /// Original filename.
    pub file_name: String,
    /// Declared MIME type.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicantDetails {
    /// Build details for a record.
    pub fn from_record(record: &ApplicantRecord, public_base_url: &str) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            passport_number: record.passport_number.clone(),
            status: record.status,
            file_path: record.file_path.clone(),
            file_url: file_url(public_base_url, &record.file_path),
            file_name: record.file_name.clone(),
            file_type: record.file_type.clone(),
            file_size: record.file_size,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Outcome of a document password attempt.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessResponse {
    /// Whether the password matched.
    pub granted: bool,
    /// Record details, only when granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantDetails>,
    /// Reason, only when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AccessResponse {
    /// Access granted.
    pub fn granted(applicant: ApplicantDetails) -> Self {
        Self {
            granted: true,
            applicant: Some(applicant),
            message: None,
        }
    }

    /// Access denied.
    pub fn denied() -> Self {
        Self {
            granted: false,
            applicant: None,
            message: Some("Incorrect password".to_string()),
        }
    }
}

/// Full record as seen by the admin.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminApplicant {
    /// Record details.
    #[serde(flatten)]
    pub details: ApplicantDetails,
    /// Document password. Absent when stored hashed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_password: Option<String>,
    /// `plain` or `argon2`.
    pub password_scheme: String,
    /// Admin who created the record.
    pub created_by: Option<String>,
    /// Employer-facing share link path.
    pub share_path: String,
}

impl AdminApplicant {
    /// Build the admin view of a record.
    pub fn from_record(record: &ApplicantRecord, public_base_url: &str) -> Self {
        let doc_password = match &record.secret {
            DocumentSecret::Plain(password) => Some(password.clone()),
            DocumentSecret::Argon2(_) => None,
        };
        Self {
            details: ApplicantDetails::from_record(record, public_base_url),
            doc_password,
            password_scheme: record.secret.scheme().as_str().to_string(),
            created_by: record.created_by.clone(),
            share_path: record.share_path(),
        }
    }
}

/// Admin listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminApplicantListResponse {
    /// Matching records, newest first.
    pub applicants: Vec<AdminApplicant>,
    /// Counts over all records.
    pub counts: StatusCounts,
}

// ============================================================================
// Admin session
// ============================================================================

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Admin email.
    pub email: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl From<AdminSession> for LoginResponse {
    fn from(session: AdminSession) -> Self {
        Self {
            token: session.token,
            email: session.email,
            expires_at: session.expires_at,
        }
    }
}

/// Current session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Admin email.
    pub email: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::ApplicantId;
    use std::path::PathBuf;

    fn record(secret: DocumentSecret) -> ApplicantRecord {
        ApplicantRecord {
            id: "0f8c".to_string(),
            name: "Jane Doe".to_string(),
            passport_number: "AB123".to_string(),
            secret,
            file_path: "/uploads/AB123/passport_1.pdf".to_string(),
            file_name: "passport.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 2048,
            status: ApplicantStatus::Approved,
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
            searchable_passport: "ab123".to_string(),
            searchable_name: "jane doe".to_string(),
        }
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url("", "/uploads/a/b.pdf"), "/uploads/a/b.pdf");
        assert_eq!(
            file_url("https://files.example.com/", "/uploads/a/b.pdf"),
            "https://files.example.com/uploads/a/b.pdf"
        );
    }

    #[test]
    fn test_upload_response_from_stored_file() {
        let stored = StoredFile {
            applicant_id: ApplicantId::sanitize("AB-123").unwrap(),
            file_name: "passport_1.pdf".to_string(),
            original_name: "passport.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 10,
            address: "/uploads/AB123/passport_1.pdf".to_string(),
            path: PathBuf::from("/tmp/x"),
        };
        let json = serde_json::to_value(UploadResponse::from(stored)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File uploaded successfully!");
        assert_eq!(json["filePath"], "/uploads/AB123/passport_1.pdf");
        assert_eq!(json["passportNumber"], "AB123");
        assert_eq!(json["originalName"], "passport.pdf");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let json = serde_json::to_value(ApplicantSummary::from(&record(DocumentSecret::Plain(
            "1234".to_string(),
        ))))
        .unwrap();
        assert_eq!(json["passportNumber"], "AB123");
        assert!(json.get("docPassword").is_none());
        assert!(json.get("filePath").is_none());
    }

    #[test]
    fn test_access_response_shapes() {
        let denied = serde_json::to_value(AccessResponse::denied()).unwrap();
        assert_eq!(denied["granted"], false);
        assert!(denied.get("applicant").is_none());

        let details = ApplicantDetails::from_record(
            &record(DocumentSecret::Plain("1234".to_string())),
            "",
        );
        let granted = serde_json::to_value(AccessResponse::granted(details)).unwrap();
        assert_eq!(granted["granted"], true);
        assert_eq!(granted["applicant"]["fileUrl"], "/uploads/AB123/passport_1.pdf");
        assert!(granted.get("message").is_none());
    }

    #[test]
    fn test_admin_applicant_password_visibility() {
        let plain = serde_json::to_value(AdminApplicant::from_record(
            &record(DocumentSecret::Plain("1234".to_string())),
            "",
        ))
        .unwrap();
        assert_eq!(plain["docPassword"], "1234");
        assert_eq!(plain["passwordScheme"], "plain");
        assert_eq!(plain["sharePath"], "/employer/document/0f8c");
        assert_eq!(plain["name"], "Jane Doe");

        let hashed = serde_json::to_value(AdminApplicant::from_record(
            &record(DocumentSecret::Argon2("$argon2id$...".to_string())),
            "",
        ))
        .unwrap();
        assert!(hashed.get("docPassword").is_none());
        assert_eq!(hashed["passwordScheme"], "argon2");
    }
}
