//! Event type names published on the event bus.
//!
//! Used by the API handlers when publishing and by the email dispatcher when
//! deciding which events produce mail.

/// A new brand or staff account was created.
/// Payload: `{ "email": .., "firstName": .. }`.
pub const USER_SIGNED_UP: &str = "user.signed_up";

/// Someone asked for a password reset on an existing account.
/// Payload: `{ "email": .., "token": .. }`.
pub const PASSWORD_RESET_REQUESTED: &str = "auth.password_reset_requested";

/// A project was created by a brand.
pub const PROJECT_CREATED: &str = "project.created";

/// A project moved to a new lifecycle status.
/// Payload: `{ "action": .., "status": .. }`.
pub const PROJECT_STATUS_CHANGED: &str = "project.status_changed";
