//! API handlers.

pub mod admin;
pub mod applicants;
pub mod status;
pub mod upload;

pub use admin::*;
pub use applicants::*;
pub use status::*;
pub use upload::*;

use std::path::Path;
use std::time::Duration;

use crate::access::SessionManager;
use crate::config::Config;
use crate::intake::{BlobStore, IntakePolicy, IntakeService};
use crate::{Database, Result};

/// Configured admin login.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    /// Admin email.
    pub email: String,
    /// Argon2id PHC hash of the admin password.
    pub password_hash: String,
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Record database.
    pub db: Database,
    /// File intake.
    pub intake: IntakeService,
    /// Admin sessions.
    pub sessions: SessionManager,
    /// Admin login, if configured.
    pub admin: Option<AdminCredentials>,
    /// Prefix for download URLs.
    pub public_base_url: String,
    /// Hash document passwords on create and edit.
    pub hash_document_passwords: bool,
}

impl AppState {
    /// Create application state with default settings.
    pub fn new(db: Database, intake: IntakeService) -> Self {
        Self {
            db,
            intake,
            sessions: SessionManager::default(),
            admin: None,
            public_base_url: String::new(),
            hash_document_passwords: false,
        }
    }

    /// Build application state from configuration.
    ///
    /// Relative storage paths are resolved against `base_dir`.
    pub fn from_config(db: Database, config: &Config, base_dir: &Path) -> Result<Self> {
        let store = BlobStore::new(
            base_dir.join(&config.storage.upload_dir),
            base_dir.join(&config.storage.holding_dir),
        )?;
        let intake = IntakeService::new(
            store,
            IntakePolicy::new(config.storage.max_upload_bytes()),
            config.storage.public_prefix.clone(),
        );

        let mut state = Self::new(db, intake)
            .with_session_ttl(Duration::from_secs(config.admin.session_ttl_secs))
            .with_public_base_url(&config.web.public_base_url)
            .with_document_password_hashing(config.records.hash_document_passwords);

        if config.admin.is_configured() {
            state = state.with_admin(&config.admin.email, &config.admin.password_hash);
        }

        Ok(state)
    }

    /// Set the admin login.
    pub fn with_admin(mut self, email: &str, password_hash: &str) -> Self {
        self.admin = Some(AdminCredentials {
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        });
        self
    }

    /// Set the admin session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionManager::new(ttl);
        self
    }

    /// Set the prefix for download URLs.
    pub fn with_public_base_url(mut self, url: &str) -> Self {
        self.public_base_url = url.to_string();
        self
    }

    /// Enable or disable hashing of document passwords.
    pub fn with_document_password_hashing(mut self, enabled: bool) -> Self {
        self.hash_document_passwords = enabled;
        self
    }
}
