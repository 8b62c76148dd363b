//! Applicant record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::access::DocumentSecret;

/// Review status of an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ApplicantStatus {
    /// Awaiting review.
    Pending,
    /// Approved. New records start here.
    #[default]
    Approved,
    /// Rejected.
    Rejected,
}

impl ApplicantStatus {
    /// All statuses, in display order.
    pub const ALL: [ApplicantStatus; 3] = [
        ApplicantStatus::Pending,
        ApplicantStatus::Approved,
        ApplicantStatus::Rejected,
    ];

    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "Pending",
            ApplicantStatus::Approved => "Approved",
            ApplicantStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ApplicantStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// Lower-cased mirror used for case-insensitive search.
///
/// Whitespace is kept as typed, both in stored mirrors and in search terms.
pub fn searchable(value: &str) -> String {
    value.to_lowercase()
}

/// A stored applicant record.
#[derive(Debug, Clone)]
pub struct ApplicantRecord {
    /// Record id (UUID v4).
    pub id: String,
    /// Applicant name.
    pub name: String,
    /// Passport number as entered.
    pub passport_number: String,
    /// Document access password.
    pub secret: DocumentSecret,
    /// Blob store address of the document.
    pub file_path: String,
    /// Original filename.
    pub file_name: String,
    /// Declared MIME type.
    pub file_type: String,
    /// File size in bytes.
    pub file_size: i64,
    /// Review status.
    pub status: ApplicantStatus,
    /// Admin who created the record.
    pub created_by: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Lower-cased passport number.
    pub searchable_passport: String,
    /// Lower-cased name.
    pub searchable_name: String,
}

/// Path of the employer-facing page for a record.
pub fn share_path(id: &str) -> String {
    format!("/employer/document/{id}")
}

impl ApplicantRecord {
    /// Employer-facing share link path.
    pub fn share_path(&self) -> String {
        share_path(&self.id)
    }
}

/// Data for a new record.
#[derive(Debug, Clone)]
pub struct NewApplicant {
    /// Applicant name.
    pub name: String,
    /// Passport number as entered.
    pub passport_number: String,
    /// Document access password.
    pub secret: DocumentSecret,
    /// Blob store address returned by intake.
    pub file_path: String,
    /// Original filename.
    pub file_name: String,
    /// Declared MIME type.
    pub file_type: String,
    /// File size in bytes.
    pub file_size: i64,
    /// Initial status.
    pub status: ApplicantStatus,
    /// Admin creating the record.
    pub created_by: Option<String>,
}

/// Changes applied by the edit flow. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ApplicantUpdate {
    /// New name.
    pub name: Option<String>,
    /// New passport number.
    pub passport_number: Option<String>,
    /// New document password.
    pub secret: Option<DocumentSecret>,
    /// New status.
    pub status: Option<ApplicantStatus>,
}

impl ApplicantUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.passport_number.is_none()
            && self.secret.is_none()
            && self.status.is_none()
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default)]
pub struct ApplicantFilter {
    /// Case-insensitive substring matched against name and passport number.
    pub search: Option<String>,
    /// Exact status.
    pub status: Option<ApplicantStatus>,
}

/// Number of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    /// All records.
    pub total: i64,
    /// Approved records.
    pub approved: i64,
    /// Pending records.
    pub pending: i64,
    /// Rejected records.
    pub rejected: i64,
}
