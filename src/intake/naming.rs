//! Stored filename generation.
//!
//! Stored names have the form `<base>_<token><ext>` where `token` is a
//! millisecond timestamp that never repeats within a process.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::{MAX_BASE_NAME_BYTES, MAX_EXTENSION_LENGTH};

/// Base name used when the original name has nothing usable.
const FALLBACK_BASE_NAME: &str = "file";

/// Issues strictly increasing uniqueness tokens.
///
/// Each token is the current Unix time in milliseconds, or one more than the
/// previous token if the clock has not advanced.
#[derive(Debug, Default)]
pub struct TokenSource {
    last: AtomicU64,
}

impl TokenSource {
    /// Create a new token source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token.
    pub fn next_token(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Split a client-supplied filename into a safe base name and extension.
///
/// Only the last path segment is considered. The extension includes its
/// leading dot and is dropped unless it is short and ASCII alphanumeric.
/// The base is cut to [`MAX_BASE_NAME_BYTES`] on a char boundary, so
/// `<base>_<token><ext>` fits any filesystem's 255-byte name limit.
pub fn split_original_name(original: &str) -> (String, String) {
    let segment = original.rsplit(['/', '\\']).next().unwrap_or(original);

    let (base, ext) = match segment.rfind('.') {
        // A leading dot marks a hidden file, not an extension.
        Some(idx) if idx > 0 => {
            let ext = &segment[idx + 1..];
            if is_safe_extension(ext) {
                (&segment[..idx], format!(".{ext}"))
            } else {
                (&segment[..idx], String::new())
            }
        }
        _ => (segment, String::new()),
    };

    let mut base: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    truncate_to_bytes(&mut base, MAX_BASE_NAME_BYTES);
    let base = if base.trim().is_empty() || base == "." || base == ".." {
        FALLBACK_BASE_NAME.to_string()
    } else {
        base
    };

    (base, ext)
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LENGTH
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Shorten `s` to at most `max` bytes without splitting a character.
fn truncate_to_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// Build the stored filename for an upload.
pub fn stored_file_name(original: &str, token: u64) -> String {
    let (base, ext) = split_original_name(original);
    format!("{base}_{token}{ext}")
}
