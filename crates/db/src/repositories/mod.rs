//! Repository layer: zero-sized structs with async functions over [`DbPool`].
//!
//! Each repository owns one collection. Lookups clone documents out of the
//! store; mutations run inside [`DocumentStore::write`] so they apply and
//! persist atomically.
//!
//! [`DbPool`]: crate::DbPool
//! [`DocumentStore::write`]: crate::store::DocumentStore::write

pub mod brand_repo;
pub mod project_repo;
pub mod user_repo;

pub use brand_repo::BrandRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;

use briefdesk_core::error::CoreError;
use briefdesk_core::types::DbId;

use crate::models::brand::Brand;
use crate::models::project::Project;
use crate::store::{Collections, StoreError};

pub(crate) fn brand_mut(c: &mut Collections, id: DbId) -> Result<&mut Brand, StoreError> {
    c.brands
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| CoreError::not_found("Brand", id).into())
}

pub(crate) fn project_mut(c: &mut Collections, id: DbId) -> Result<&mut Project, StoreError> {
    c.projects
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Project", id).into())
}

/// Email of the user owning `owner_id`, if that user still exists.
pub(crate) fn owner_email(c: &Collections, owner_id: DbId) -> Option<String> {
    c.users
        .iter()
        .find(|u| u.id == owner_id)
        .map(|u| u.email.clone())
}
