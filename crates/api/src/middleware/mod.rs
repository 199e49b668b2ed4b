//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireStaff`] -- Requires the `staff` role.
//! - [`rbac::RequireBrand`] -- Requires the `brand` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`brand::CurrentBrand`] -- Brand user plus their brand document.
//! - [`brand::RequirePlan`] -- `CurrentBrand` that passes the subscription gate.

pub mod auth;
pub mod brand;
pub mod rbac;
