//! Applicant identifiers used as blob store directory names.

use std::fmt;

/// A sanitized applicant identifier.
///
/// Only ASCII letters and digits survive sanitization, so the value is always
/// safe to use as a single path segment directly below the blob root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicantId(String);

impl ApplicantId {
    /// Sanitize a raw identifier (e.g. a passport number as typed).
    ///
    /// Returns `None` when nothing is left after sanitization.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let cleaned = sanitize_identifier(raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// Parse an identifier that must already be in sanitized form.
    pub fn parse_sanitized(value: &str) -> Option<Self> {
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// The sanitized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApplicantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip every character that is not an ASCII letter or digit.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_punctuation_and_spaces() {
        assert_eq!(sanitize_identifier("AB-123 456"), "AB123456");
        assert_eq!(sanitize_identifier("x.y_z"), "xyz");
    }

    #[test]
    fn test_sanitize_strips_path_traversal() {
        let id = ApplicantId::sanitize("../../etc").unwrap();
        assert_eq!(id.as_str(), "etc");

        let id = ApplicantId::sanitize("..\\..\\windows\\system32").unwrap();
        assert_eq!(id.as_str(), "windowssystem32");
        assert!(!id.as_str().contains(['/', '\\', '.']));
    }

    #[test]
    fn test_sanitize_strips_unicode() {
        assert_eq!(sanitize_identifier("Ñ123ü"), "123");
        assert_eq!(sanitize_identifier("パスポート"), "");
    }

    #[test]
    fn test_sanitize_preserves_case() {
        assert_eq!(sanitize_identifier("aB12cD"), "aB12cD");
    }

    #[test]
    fn test_sanitize_empty_result() {
        assert!(ApplicantId::sanitize("").is_none());
        assert!(ApplicantId::sanitize("   ").is_none());
        assert!(ApplicantId::sanitize("../..//").is_none());
    }

    #[test]
    fn test_parse_sanitized() {
        assert!(ApplicantId::parse_sanitized("AB123").is_some());
        assert!(ApplicantId::parse_sanitized("AB-123").is_none());
        assert!(ApplicantId::parse_sanitized("..").is_none());
        assert!(ApplicantId::parse_sanitized("").is_none());
    }
}
