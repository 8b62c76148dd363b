//! Configuration module for the document portal.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::{PortalError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Uploaded file storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root of the blob store; one subdirectory per applicant.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Holding area for uploads still in flight.
    #[serde(default = "default_holding_dir")]
    pub holding_dir: String,
    /// URL path under which stored files are served.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_holding_dir() -> String {
    "temp".to_string()
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            holding_dir: default_holding_dir(),
            public_prefix: default_public_prefix(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/portal.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Origins allowed to call the API from a browser.
    ///
    /// An empty list disables the origin check.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Public base URL prepended to file paths when building download links.
    #[serde(default)]
    pub public_base_url: String,
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            public_base_url: String::new(),
        }
    }
}

/// Admin login configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Admin login email.
    #[serde(default)]
    pub email: String,
    /// Argon2 PHC hash of the admin password.
    #[serde(default)]
    pub password_hash: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_session_ttl() -> u64 {
    8 * 60 * 60
}

impl AdminConfig {
    /// Whether admin credentials have been configured.
    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password_hash.is_empty()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password_hash: String::new(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

/// Applicant record configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordsConfig {
    /// Store document passwords as Argon2 hashes instead of plaintext.
    #[serde(default)]
    pub hash_document_passwords: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/docportal.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// URL paths the public file prefix must not shadow.
const RESERVED_PREFIXES: [&str; 4] = ["/api", "/api-docs", "/upload", "/health"];

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Uploaded file storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Admin login configuration.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Applicant record configuration.
    #[serde(default)]
    pub records: RecordsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PortalError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PortalError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listen port
    /// - `PORTAL_UPLOAD_DIR`: blob store root
    /// - `PORTAL_CORS_ORIGINS`: comma-separated allowed origins
    /// - `PORTAL_ADMIN_PASSWORD_HASH`: admin password hash
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT override"),
            }
        }

        if let Ok(dir) = std::env::var("PORTAL_UPLOAD_DIR") {
            if !dir.is_empty() {
                self.storage.upload_dir = dir;
            }
        }

        if let Ok(origins) = std::env::var("PORTAL_CORS_ORIGINS") {
            self.web.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(hash) = std::env::var("PORTAL_ADMIN_PASSWORD_HASH") {
            if !hash.is_empty() {
                self.admin.password_hash = hash;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the maximum upload size is zero
    /// - the holding directory is the upload directory or inside it
    /// - the public prefix is not a plain absolute path or shadows an API route
    /// - only one of admin email and password hash is set
    pub fn validate(&self) -> Result<()> {
        if self.storage.max_upload_size_mb == 0 {
            return Err(PortalError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }

        // Files under the upload dir are publicly served, so in-flight
        // uploads must live elsewhere.
        let holding = normalize_dir(&self.storage.holding_dir);
        if holding.starts_with(normalize_dir(&self.storage.upload_dir)) {
            return Err(PortalError::Config(
                "storage.holding_dir must not be inside storage.upload_dir".to_string(),
            ));
        }

        let prefix = self.storage.public_prefix.trim_end_matches('/');
        let well_formed = prefix.len() >= 2
            && prefix.starts_with('/')
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_'));
        if !well_formed {
            return Err(PortalError::Config(
                "storage.public_prefix must be an absolute URL path such as /uploads".to_string(),
            ));
        }
        if RESERVED_PREFIXES
            .iter()
            .any(|reserved| prefix == *reserved || prefix.starts_with(&format!("{reserved}/")))
        {
            return Err(PortalError::Config(format!(
                "storage.public_prefix {prefix} collides with a built-in route"
            )));
        }

        if self.admin.email.is_empty() != self.admin.password_hash.is_empty() {
            return Err(PortalError::Config(
                "admin.email and admin.password_hash must be set together. \
                 Generate a hash with `docportal hash-password <password>`."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Lexically normalize a directory setting: relative paths are anchored at
/// the working directory, `.` components are dropped and `..` pops a level.
/// Symlinks are not resolved.
fn normalize_dir(dir: &str) -> PathBuf {
    let path = Path::new(dir);
    let anchored = if path.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };

    let mut normalized = PathBuf::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
