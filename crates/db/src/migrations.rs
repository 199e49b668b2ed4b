//! Schema upgrades applied to the data file at startup.
//!
//! Missing fields are already filled by serde defaults when the file is
//! loaded; this pass repairs relationships that defaults cannot express.

use std::collections::HashSet;

use briefdesk_core::email::normalize_email;
use briefdesk_core::roles::Role;
use chrono::Utc;
use serde::Serialize;

use crate::models::brand::{Brand, CreateBrand};
use crate::store::{Collections, StoreError};
use crate::DbPool;

/// What a migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub emails_normalized: usize,
    pub owners_restored: usize,
    pub brands_created: usize,
    pub brand_links_repaired: usize,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply all upgrades. Nothing is written when the data is already current.
///
/// Two users whose emails differ only in case or whitespace cannot be
/// merged automatically; the run fails with [`StoreError::UniqueViolation`]
/// and `briefdesk-admin cleanup` has to resolve them first.
pub async fn run(pool: &DbPool) -> Result<MigrationReport, StoreError> {
    let report = pool
        .read(|c| plan(&mut c.clone()))
        .await
        .inspect_err(|e| {
            tracing::error!(
                error = %e,
                "Duplicate emails in data file, run `briefdesk-admin cleanup`"
            );
        })?;
    if report.is_empty() {
        tracing::debug!("Data file is up to date");
        return Ok(report);
    }

    let report = pool.write(plan).await?;
    tracing::info!(?report, "Data file migrated");
    Ok(report)
}

fn ensure_unique_emails(c: &Collections) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for user in &c.users {
        let email = normalize_email(&user.email);
        if !seen.insert(email.clone()) {
            return Err(StoreError::UniqueViolation {
                collection: "users",
                field: "email",
                value: email,
            });
        }
    }
    Ok(())
}

fn plan(c: &mut Collections) -> Result<MigrationReport, StoreError> {
    ensure_unique_emails(c)?;

    let mut report = MigrationReport::default();
    let now = Utc::now();

    for user in &mut c.users {
        let normalized = normalize_email(&user.email);
        if normalized != user.email {
            user.email = normalized;
            report.emails_normalized += 1;
        }
    }

    for user in c.users.iter_mut().filter(|u| u.role == Role::Brand) {
        let linked = user
            .brand_id
            .filter(|id| c.brands.iter().any(|b| b.id == *id));
        if linked.is_some() {
            continue;
        }

        if let Some(owned) = c.brands.iter().find(|b| b.owner_id == user.id) {
            user.brand_id = Some(owned.id);
            report.brand_links_repaired += 1;
        } else {
            let brand = Brand::new(user.id, &user.email, &CreateBrand::default(), now);
            user.brand_id = Some(brand.id);
            c.brands.push(brand);
            report.brands_created += 1;
        }
    }

    for brand in &mut c.brands {
        let owner = c.users.iter().find(|u| u.id == brand.owner_id);
        if let Some(owner) = owner {
            if brand.ensure_owner_member(&owner.email) {
                report.owners_restored += 1;
            }
        }
    }

    Ok(report)
}
