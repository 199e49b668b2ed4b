//! Repository for the `users` collection.

use briefdesk_core::types::{DbId, Timestamp};
use chrono::Utc;

use crate::models::brand::{Brand, CreateBrand};
use crate::models::user::{CreateUser, User};
use crate::store::{Collections, StoreError};
use crate::DbPool;

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created document.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the email is taken.
    pub async fn create(pool: &DbPool, input: &CreateUser) -> Result<User, StoreError> {
        pool.write(|c| {
            ensure_email_free(c, &input.email)?;
            let user = User::new(input, Utc::now());
            c.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    /// Insert a brand owner together with their brand in one write.
    pub async fn create_with_brand(
        pool: &DbPool,
        input: &CreateUser,
        brand: &CreateBrand,
    ) -> Result<(User, Brand), StoreError> {
        pool.write(|c| {
            ensure_email_free(c, &input.email)?;
            let now = Utc::now();
            let mut user = User::new(input, now);
            let brand = Brand::new(user.id, &user.email, brand, now);
            user.brand_id = Some(brand.id);
            c.users.push(user.clone());
            c.brands.push(brand.clone());
            Ok((user, brand))
        })
        .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(pool
            .read(|c| c.users.iter().find(|u| u.id == id).cloned())
            .await)
    }

    /// Find a user by normalized email (case-insensitive).
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, StoreError> {
        Ok(pool
            .read(|c| {
                c.users
                    .iter()
                    .find(|u| u.email.eq_ignore_ascii_case(email))
                    .cloned()
            })
            .await)
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &DbPool) -> Result<Vec<User>, StoreError> {
        let mut users = pool.read(|c| c.users.clone()).await;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Replace a user's password hash. Returns `true` if the user exists.
    pub async fn update_password(
        pool: &DbPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        pool.write(|c| {
            let Some(user) = c.users.iter_mut().find(|u| u.id == id) else {
                return Ok(false);
            };
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            Ok(true)
        })
        .await
    }

    /// Set or clear the end of a user's free trial.
    pub async fn set_trial_end(
        pool: &DbPool,
        id: DbId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<bool, StoreError> {
        pool.write(|c| {
            let Some(user) = c.users.iter_mut().find(|u| u.id == id) else {
                return Ok(false);
            };
            user.trial_ends_at = trial_ends_at;
            user.updated_at = Utc::now();
            Ok(true)
        })
        .await
    }
}

fn ensure_email_free(c: &Collections, email: &str) -> Result<(), StoreError> {
    if c.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
        return Err(StoreError::UniqueViolation {
            collection: "users",
            field: "email",
            value: email.to_string(),
        });
    }
    Ok(())
}
