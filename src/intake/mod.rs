//! File intake for applicant documents.
//!
//! This module accepts one uploaded file plus an applicant identifier and
//! places it in the blob store:
//! - MIME type allow-list and size ceiling
//! - identifier sanitization (ASCII letters and digits only)
//! - collision-free stored names (`<base>_<token><ext>`)
//! - staging in a holding area followed by an atomic rename

mod identifier;
mod naming;
mod service;
mod storage;

pub use identifier::{sanitize_identifier, ApplicantId};
pub use naming::{split_original_name, stored_file_name, TokenSource};
pub use service::{
    IntakeError, IntakeErrorKind, IntakePolicy, IntakeService, PendingUpload, StoredFile,
    UploadRequest,
};
pub use storage::{BlobStore, Placement};

/// MIME types accepted by default.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "application/pdf"];

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum length of the base part of a stored filename, in bytes.
pub const MAX_BASE_NAME_BYTES: usize = 150;

/// Longest extension (without the dot) kept on a stored filename.
pub const MAX_EXTENSION_LENGTH: usize = 10;
