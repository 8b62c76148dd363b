//! Upload validation and placement.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::naming::{stored_file_name, TokenSource};
use super::storage::{BlobStore, Placement};
use super::{ApplicantId, ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE};

/// How many fresh names to try before giving up on a placement.
const MAX_PLACEMENT_ATTEMPTS: usize = 5;

/// Intake failures.
///
/// Every variant except [`IntakeError::Failed`] is caused by the client and
/// its message is safe to show to users.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Declared MIME type is not allowed.
    #[error("Invalid file type. Only JPG, PNG, PDF allowed.")]
    InvalidFileType {
        /// The rejected MIME type.
        mime_type: String,
    },

    /// File exceeds the size ceiling.
    #[error("File too large (max {})", format_size(.max_bytes))]
    FileTooLarge {
        /// Configured ceiling in bytes.
        max_bytes: u64,
    },

    /// No file part in the request.
    #[error("No file uploaded")]
    MissingFile,

    /// No applicant identifier in the request.
    #[error("Passport number is required")]
    MissingIdentifier,

    /// Identifier has no letters or digits left after sanitization.
    #[error("Passport number must contain at least one letter or digit")]
    InvalidIdentifier,

    /// Filesystem failure while staging or placing the file.
    #[error("upload failed: {0}")]
    Failed(#[from] io::Error),
}

/// Coarse classification of intake errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeErrorKind {
    /// The request was invalid; retrying it unchanged will fail again.
    Validation,
    /// Storage failed; the whole upload may be retried.
    IntakeFailed,
}

impl IntakeError {
    /// Classify the error.
    pub fn kind(&self) -> IntakeErrorKind {
        match self {
            IntakeError::Failed(_) => IntakeErrorKind::IntakeFailed,
            _ => IntakeErrorKind::Validation,
        }
    }

    /// Whether the client caused the error.
    pub fn is_validation(&self) -> bool {
        self.kind() == IntakeErrorKind::Validation
    }
}

fn format_size(bytes: &u64) -> String {
    const MB: u64 = 1024 * 1024;
    if *bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if *bytes >= 1024 && bytes % 1024 == 0 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}

/// Limits applied to every upload.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types, lower case.
    pub allowed_types: Vec<String>,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl IntakePolicy {
    /// Default allow-list with the given size ceiling.
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            allowed_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Whether a normalized MIME type is allowed.
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// Reduce a Content-Type value to its lower-case essence (`type/subtype`).
fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// An upload that has passed the type check and is being written to the
/// holding area.
///
/// Dropping it discards the partial file.
#[derive(Debug)]
pub struct PendingUpload {
    file: NamedTempFile,
    original_name: String,
    mime_type: String,
    size: u64,
    max_size: u64,
}

impl PendingUpload {
    /// Append a chunk of file content.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), IntakeError> {
        let new_size = self.size + chunk.len() as u64;
        if new_size > self.max_size {
            return Err(IntakeError::FileTooLarge {
                max_bytes: self.max_size,
            });
        }
        self.file.write_all(chunk)?;
        self.size = new_size;
        Ok(())
    }

    /// Bytes received so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Client-supplied filename.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Normalized declared MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Location of the partial file.
    pub fn holding_path(&self) -> &Path {
        self.file.path()
    }
}

/// A file that has been placed in the blob store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Sanitized applicant identifier.
    pub applicant_id: ApplicantId,
    /// Generated stored filename.
    pub file_name: String,
    /// Client-supplied filename.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Externally addressable path, e.g. `/uploads/AB123456/passport_1718000000000.pdf`.
    pub address: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// A complete in-memory upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// File content.
    pub bytes: &'a [u8],
    /// Declared MIME type.
    pub mime_type: &'a str,
    /// Client-supplied filename.
    pub original_name: &'a str,
    /// Raw applicant identifier.
    pub identifier: Option<&'a str>,
}

/// Validates uploads and places them in the blob store.
#[derive(Debug)]
pub struct IntakeService {
    store: BlobStore,
    policy: IntakePolicy,
    public_prefix: String,
    tokens: TokenSource,
}

impl IntakeService {
    /// Create an intake service.
    ///
    /// `public_prefix` is the URL path stored files are served under.
    pub fn new(store: BlobStore, policy: IntakePolicy, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Self {
            store,
            policy,
            public_prefix,
            tokens: TokenSource::new(),
        }
    }

    /// The underlying blob store.
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// The active limits.
    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// URL path stored files are served under.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Start an upload.
    ///
    /// The MIME type is checked before anything is written to disk.
    pub fn begin(&self, original_name: &str, mime_type: &str) -> Result<PendingUpload, IntakeError> {
        let mime_type = normalize_mime(mime_type);
        if !self.policy.allows(&mime_type) {
            warn!(
                original_name = %original_name,
                mime_type = %mime_type,
                "Rejected upload with disallowed file type"
            );
            return Err(IntakeError::InvalidFileType { mime_type });
        }

        let file = self.store.stage()?;
        debug!(holding = %file.path().display(), "Staging upload");

        Ok(PendingUpload {
            file,
            original_name: original_name.to_string(),
            mime_type,
            size: 0,
            max_size: self.policy.max_file_size,
        })
    }

    /// Finish an upload by moving it into the applicant's directory.
    ///
    /// On any error the staged file is discarded and nothing is left under
    /// the blob root.
    pub fn complete(
        &self,
        upload: Option<PendingUpload>,
        identifier: Option<&str>,
    ) -> Result<StoredFile, IntakeError> {
        let upload = upload.ok_or(IntakeError::MissingFile)?;
        let raw = identifier
            .filter(|s| !s.is_empty())
            .ok_or(IntakeError::MissingIdentifier)?;
        let applicant_id = ApplicantId::sanitize(raw).ok_or(IntakeError::InvalidIdentifier)?;

        let PendingUpload {
            file,
            original_name,
            mime_type,
            size,
            ..
        } = upload;
        file.as_file().sync_all()?;

        let mut staged = file;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let file_name = stored_file_name(&original_name, self.tokens.next_token());
            match self.store.place(staged, &applicant_id, &file_name)? {
                Placement::Placed(path) => {
                    let address = self.address_for(&applicant_id, &file_name);
                    info!(
                        applicant = %applicant_id,
                        file_name = %file_name,
                        size = size,
                        mime_type = %mime_type,
                        "File stored"
                    );
                    return Ok(StoredFile {
                        applicant_id,
                        file_name,
                        original_name,
                        mime_type,
                        size,
                        address,
                        path,
                    });
                }
                Placement::Occupied(returned) => {
                    warn!(
                        applicant = %applicant_id,
                        file_name = %file_name,
                        "Stored name already taken, retrying with a new token"
                    );
                    staged = returned;
                }
            }
        }

        Err(IntakeError::Failed(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not find a free stored file name",
        )))
    }

    /// Validate and store a complete in-memory upload.
    pub fn intake(&self, request: UploadRequest<'_>) -> Result<StoredFile, IntakeError> {
        let mut upload = self.begin(request.original_name, request.mime_type)?;
        upload.write_chunk(request.bytes)?;
        self.complete(Some(upload), request.identifier)
    }

    /// Public address of a stored file.
    pub fn address_for(&self, applicant_id: &ApplicantId, file_name: &str) -> String {
        format!("{}/{}/{}", self.public_prefix, applicant_id, file_name)
    }

    /// Map a public address back to a stored file on disk.
    ///
    /// Returns `None` for addresses this service did not issue or whose file
    /// no longer exists.
    pub fn resolve_address(&self, address: &str) -> Option<PathBuf> {
        let rest = address
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')?;
        let (applicant_dir, file_name) = rest.split_once('/')?;
        self.store.resolve(applicant_dir, file_name)
    }
}
