//! Email address normalization.

use validator::ValidateEmail;

/// Canonical form used for storage and lookups: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate the syntax of an (already normalized) email address.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(format!("'{email}' is not a valid email address"))
    }
}
