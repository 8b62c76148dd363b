//! Shared helpers for the web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use docportal::intake::{BlobStore, IntakePolicy, IntakeService};
use docportal::web::{create_router, AppState};
use docportal::{hash_password, Database};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const UPLOAD_PREFIX: &str = "/uploads";

/// Knobs for building a test portal.
#[derive(Debug, Clone)]
pub struct PortalOptions {
    pub max_file_size: u64,
    pub cors_origins: Vec<String>,
    pub admin: bool,
    pub session_ttl: Duration,
    pub hash_document_passwords: bool,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
            admin: true,
            session_ttl: Duration::from_secs(3600),
            hash_document_passwords: false,
        }
    }
}

/// A running portal on an in-memory database and a temporary blob store.
pub struct TestPortal {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

impl TestPortal {
    pub async fn new() -> Self {
        Self::with_options(PortalOptions::default()).await
    }

    pub async fn with_options(options: PortalOptions) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = BlobStore::new(dir.path().join("uploads"), dir.path().join("temp"))
            .expect("Failed to create blob store");
        let intake = IntakeService::new(
            store,
            IntakePolicy::new(options.max_file_size),
            UPLOAD_PREFIX,
        );

        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");

        let mut state = AppState::new(db, intake)
            .with_session_ttl(options.session_ttl)
            .with_document_password_hashing(options.hash_document_passwords);
        if options.admin {
            let hash = hash_password(ADMIN_PASSWORD).expect("Failed to hash admin password");
            state = state.with_admin(ADMIN_EMAIL, &hash);
        }

        let state = Arc::new(state);
        let router = create_router(state.clone(), &options.cors_origins);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state, dir }
    }

    /// Number of entries directly below the blob root.
    pub fn stored_entries(&self) -> usize {
        std::fs::read_dir(self.state.intake.store().root())
            .expect("blob root readable")
            .count()
    }

    /// Number of files left in the holding area.
    pub fn holding_entries(&self) -> usize {
        std::fs::read_dir(self.state.intake.store().holding_path())
            .expect("holding dir readable")
            .count()
    }

    /// Upload a file and return the JSON response body.
    pub async fn upload(&self, passport: &str, file_name: &str, mime: &str, bytes: &[u8]) -> Value {
        let response = self
            .server
            .post("/upload")
            .multipart(upload_form(passport, file_name, mime, bytes))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Log in as the configured admin and return the bearer token.
    pub async fn admin_token(&self) -> String {
        let response = self
            .server
            .post("/api/admin/login")
            .json(&json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Upload a document and create a record for it.
    pub async fn create_applicant(
        &self,
        token: &str,
        name: &str,
        passport: &str,
        doc_password: &str,
        status: &str,
    ) -> Value {
        let uploaded = self
            .upload(passport, "passport.pdf", "application/pdf", b"%PDF-1.4 test")
            .await;

        let response = self
            .server
            .post("/api/admin/applicants")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({
                "name": name,
                "passportNumber": passport,
                "docPassword": doc_password,
                "filePath": uploaded["filePath"],
                "fileName": uploaded["originalName"],
                "fileType": uploaded["fileType"],
                "fileSize": uploaded["fileSize"],
                "status": status
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn upload_form(passport: &str, file_name: &str, mime: &str, bytes: &[u8]) -> MultipartForm {
    MultipartForm::new()
        .add_text("passportNumber", passport.to_string())
        .add_part(
            "file",
            Part::bytes(bytes.to_vec())
                .file_name(file_name.to_string())
                .mime_type(mime.to_string()),
        )
}
