//! docportal - applicant document portal
//!
//! Accepts identity documents over HTTP, stores them per applicant, keeps
//! applicant records in SQLite and reveals record details only to viewers
//! who know the per-document password.

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod logging;
pub mod records;
pub mod web;

pub use access::{
    authorize, hash_password, verify_password, AccessDecision, AdminSession, DocumentSecret,
    PasswordError, PasswordScheme, SessionError, SessionManager,
};
pub use config::Config;
pub use db::{Database, DbPool};
pub use error::{PortalError, Result};
pub use intake::{
    ApplicantId, BlobStore, IntakeError, IntakeErrorKind, IntakePolicy, IntakeService, StoredFile,
    UploadRequest,
};
pub use records::{
    ApplicantFilter, ApplicantRecord, ApplicantRepository, ApplicantStatus, ApplicantUpdate,
    NewApplicant, StatusCounts,
};
pub use web::{create_router, AppState, WebServer};
