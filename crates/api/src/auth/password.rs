//! Argon2id password hashing, verification, and strength validation.
//!
//! All password hashes use the Argon2id variant with a random salt generated
//! via [`OsRng`]. The PHC string format is used for storage so that algorithm
//! parameters and salt are embedded in the hash itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of character classes (lower, upper, digit, symbol) required.
const MIN_CHARACTER_CLASSES: usize = 2;

pub const WEAK_PASSWORD_MESSAGE: &str =
    "Password too weak. Use at least 8 characters, with numbers & symbols.";

/// Well-formed argon2id hash (default parameters) that matches no password.
/// Logins for unknown emails verify against it so they cost the same as a
/// wrong password.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$YnJpZWZkZXNrLWR1bW15IQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Spend one verification on [`DUMMY_PASSWORD_HASH`]. Always `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    verify_password(password, DUMMY_PASSWORD_HASH).unwrap_or(false)
}

/// Validate that a password meets minimum strength requirements.
///
/// Requires `min_length` characters drawn from at least two of: lowercase,
/// uppercase, digits, symbols.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length || character_classes(password) < MIN_CHARACTER_CLASSES
    {
        return Err(WEAK_PASSWORD_MESSAGE.to_string());
    }
    Ok(())
}

fn character_classes(password: &str) -> usize {
    let checks: [fn(char) -> bool; 4] = [
        char::is_lowercase,
        char::is_uppercase,
        char::is_numeric,
        |c| !c.is_alphanumeric(),
    ];
    checks
        .iter()
        .filter(|check| password.chars().any(|c| check(c)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(hash.starts_with("$argon2id$"), "expected argon2id PHC prefix");
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("x", "plaintext-not-a-hash").is_err());
    }

    #[test]
    fn test_dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("", DUMMY_PASSWORD_HASH).unwrap());
        assert!(!verify_against_dummy("Sunflower42!"));
        assert!(PasswordHash::new(DUMMY_PASSWORD_HASH).is_ok());
    }

    #[test]
    fn test_strength_rules() {
        assert!(validate_password_strength("abc1", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("abcdefghij", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("12345678", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("abcdefg1", MIN_PASSWORD_LENGTH).is_ok());
        assert!(validate_password_strength("Password", MIN_PASSWORD_LENGTH).is_ok());
        assert_eq!(
            validate_password_strength("short", MIN_PASSWORD_LENGTH).unwrap_err(),
            WEAK_PASSWORD_MESSAGE
        );
    }
}
