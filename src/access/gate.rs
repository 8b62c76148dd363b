//! Per-document access gate.
//!
//! A record's document password is compared with what the viewer typed.
//! A denial is a normal result, never an error, and nothing is counted or
//! remembered between attempts.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::password::{hash_password, verify_password, PasswordError};

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The supplied password matches.
    Granted,
    /// The supplied password does not match.
    Denied,
}

impl AccessDecision {
    /// Whether access was granted.
    pub fn is_granted(self) -> bool {
        self == AccessDecision::Granted
    }
}

/// Compare a stored plaintext password with the supplied one.
///
/// Exact, case-sensitive equality with no trimming. An empty supplied
/// password is always denied.
pub fn authorize(stored: &str, supplied: &str) -> AccessDecision {
    if !supplied.is_empty() && stored == supplied {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied
    }
}

/// How a document password is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Stored as typed.
    Plain,
    /// Stored as an Argon2id PHC string.
    Argon2,
}

impl PasswordScheme {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordScheme::Plain => "plain",
            PasswordScheme::Argon2 => "argon2",
        }
    }

    /// Parse the database representation. Unknown values are treated as
    /// plaintext.
    pub fn from_db(value: &str) -> Self {
        match value {
            "argon2" => PasswordScheme::Argon2,
            _ => PasswordScheme::Plain,
        }
    }
}

/// A document password as kept on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSecret {
    /// Plaintext password.
    Plain(String),
    /// Argon2id hash of the password.
    Argon2(String),
}

impl DocumentSecret {
    /// Build a secret for a new password.
    ///
    /// With `hashed` set the password is run through Argon2id first.
    pub fn new(password: &str, hashed: bool) -> Result<Self, PasswordError> {
        if hashed {
            Ok(DocumentSecret::Argon2(hash_password(password)?))
        } else {
            Ok(DocumentSecret::Plain(password.to_string()))
        }
    }

    /// Rebuild a secret from its stored columns.
    pub fn from_parts(scheme: PasswordScheme, value: String) -> Self {
        match scheme {
            PasswordScheme::Plain => DocumentSecret::Plain(value),
            PasswordScheme::Argon2 => DocumentSecret::Argon2(value),
        }
    }

    /// Storage scheme.
    pub fn scheme(&self) -> PasswordScheme {
        match self {
            DocumentSecret::Plain(_) => PasswordScheme::Plain,
            DocumentSecret::Argon2(_) => PasswordScheme::Argon2,
        }
    }

    /// Stored column value.
    pub fn stored_value(&self) -> &str {
        match self {
            DocumentSecret::Plain(value) | DocumentSecret::Argon2(value) => value,
        }
    }

    /// Whether the secret is hashed.
    pub fn is_hashed(&self) -> bool {
        matches!(self, DocumentSecret::Argon2(_))
    }

    /// Check a supplied password against this secret.
    pub fn authorize(&self, supplied: &str) -> AccessDecision {
        match self {
            DocumentSecret::Plain(stored) => authorize(stored, supplied),
            DocumentSecret::Argon2(_) if supplied.is_empty() => AccessDecision::Denied,
            DocumentSecret::Argon2(hash) => match verify_password(supplied, hash) {
                Ok(()) => AccessDecision::Granted,
                Err(PasswordError::VerificationFailed) => AccessDecision::Denied,
                Err(e) => {
                    warn!(error = %e, "Stored document password hash is unusable");
                    AccessDecision::Denied
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_exact_match() {
        assert_eq!(authorize("s3cret", "s3cret"), AccessDecision::Granted);
        assert!(authorize("s3cret", "s3cret").is_granted());
    }

    #[test]
    fn test_authorize_is_case_sensitive() {
        assert_eq!(authorize("Secret", "secret"), AccessDecision::Denied);
    }

    #[test]
    fn test_authorize_does_not_trim() {
        assert_eq!(authorize("secret", "secret "), AccessDecision::Denied);
        assert_eq!(authorize("secret", " secret"), AccessDecision::Denied);
    }

    #[test]
    fn test_authorize_empty_supplied() {
        assert_eq!(authorize("secret", ""), AccessDecision::Denied);
        assert_eq!(authorize("", ""), AccessDecision::Denied);
    }

    #[test]
    fn test_authorize_repeated_denials() {
        for _ in 0..50 {
            assert_eq!(authorize("secret", "guess"), AccessDecision::Denied);
        }
        assert_eq!(authorize("secret", "secret"), AccessDecision::Granted);
    }

    #[test]
    fn test_plain_secret() {
        let secret = DocumentSecret::new("1234", false).unwrap();
        assert_eq!(secret.scheme(), PasswordScheme::Plain);
        assert_eq!(secret.stored_value(), "1234");
        assert!(!secret.is_hashed());
        assert!(secret.authorize("1234").is_granted());
        assert!(!secret.authorize("12345").is_granted());
    }

    #[test]
    fn test_hashed_secret() {
        let secret = DocumentSecret::new("1234", true).unwrap();
        assert_eq!(secret.scheme(), PasswordScheme::Argon2);
        assert_ne!(secret.stored_value(), "1234");
        assert!(secret.is_hashed());
        assert!(secret.authorize("1234").is_granted());
        assert!(!secret.authorize("1235").is_granted());
        assert!(!secret.authorize("").is_granted());
    }

    #[test]
    fn test_corrupt_hash_denies() {
        let secret = DocumentSecret::from_parts(PasswordScheme::Argon2, "garbage".to_string());
        assert_eq!(secret.authorize("garbage"), AccessDecision::Denied);
    }

    #[test]
    fn test_scheme_round_trip() {
        for scheme in [PasswordScheme::Plain, PasswordScheme::Argon2] {
            assert_eq!(PasswordScheme::from_db(scheme.as_str()), scheme);
        }
        assert_eq!(PasswordScheme::from_db("rot13"), PasswordScheme::Plain);
    }
}
