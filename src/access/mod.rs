//! Access control.
//!
//! - [`gate`]: per-document password check for viewers
//! - [`password`]: Argon2id hashing
//! - [`session`]: admin bearer sessions

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{authorize, AccessDecision, DocumentSecret, PasswordScheme};
pub use password::{hash_password, validate_admin_password, verify_password, PasswordError};
pub use session::{AdminSession, SessionError, SessionManager, DEFAULT_SESSION_TTL_SECS};
