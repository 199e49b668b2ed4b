//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing, verification and strength rules.
//! - [`jwt`] -- session and password-reset token generation and validation.

pub mod jwt;
pub mod password;
