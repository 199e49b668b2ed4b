//! Bulk maintenance operations used by the `briefdesk-admin` binary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use briefdesk_core::email::normalize_email;
use briefdesk_core::roles::Role;
use briefdesk_core::types::DbId;
use serde::Serialize;

use crate::store::{Collections, StoreError};
use crate::DbPool;

/// Outcome of [`cleanup_users`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub backup_path: Option<PathBuf>,
    pub emails_normalized: usize,
    pub removed_empty: usize,
    pub removed_duplicates: usize,
    pub users_remaining: usize,
    /// Brands of removed users handed to the surviving account with the
    /// same email.
    pub brands_reassigned: usize,
    /// Brands of removed users with nobody to take them over.
    pub brands_removed: usize,
    pub projects_removed: usize,
}

/// Outcome of [`reset_keep_staff`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReport {
    pub staff_kept: usize,
    pub users_removed: usize,
    pub brands_removed: usize,
    pub projects_removed: usize,
}

/// Backup location for a data file: `data/db.json` -> `data/db-backup.json`.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "db".to_string());
    path.with_file_name(format!("{stem}-backup.json"))
}

/// Normalize user emails, drop users without one and drop duplicates
/// (the first occurrence wins). The data file is backed up first.
///
/// A brand owned by a dropped duplicate moves to the surviving brand account
/// with that email when that account has no brand yet. Otherwise the brand
/// and its projects are deleted with the owner.
pub async fn cleanup_users(pool: &DbPool) -> Result<CleanupReport, StoreError> {
    let backup_path = match pool.path() {
        Some(path) => {
            let dest = backup_path_for(path);
            pool.backup_to(&dest).await?;
            tracing::info!(path = %dest.display(), "Backup created");
            Some(dest)
        }
        None => None,
    };

    pool.write(|c| {
        let mut report = CleanupReport {
            backup_path,
            ..CleanupReport::default()
        };
        let mut seen = HashSet::new();
        let mut removed = Vec::new();

        c.users.retain_mut(|user| {
            let normalized = normalize_email(&user.email);
            if normalized.is_empty() {
                report.removed_empty += 1;
                removed.push(RemovedUser {
                    id: user.id,
                    email: None,
                });
                return false;
            }
            if normalized != user.email {
                user.email = normalized;
                report.emails_normalized += 1;
            }
            if !seen.insert(user.email.clone()) {
                report.removed_duplicates += 1;
                removed.push(RemovedUser {
                    id: user.id,
                    email: Some(user.email.clone()),
                });
                return false;
            }
            true
        });

        settle_orphaned_brands(c, &removed, &mut report);
        report.users_remaining = c.users.len();
        Ok(report)
    })
    .await
}

struct RemovedUser {
    id: DbId,
    email: Option<String>,
}

fn settle_orphaned_brands(
    c: &mut Collections,
    removed: &[RemovedUser],
    report: &mut CleanupReport,
) {
    let mut dropped = HashSet::new();

    for brand in &mut c.brands {
        let Some(owner) = removed.iter().find(|r| r.id == brand.owner_id) else {
            continue;
        };
        let heir = owner.email.as_deref().and_then(|email| {
            c.users
                .iter_mut()
                .find(|u| u.email == email && u.role == Role::Brand && u.brand_id.is_none())
        });

        match heir {
            Some(heir) => {
                heir.brand_id = Some(brand.id);
                brand.owner_id = heir.id;
                brand.ensure_owner_member(&heir.email);
                report.brands_reassigned += 1;
            }
            None => {
                dropped.insert(brand.id);
            }
        }
    }

    if dropped.is_empty() {
        return;
    }

    let projects_before = c.projects.len();
    c.brands.retain(|b| !dropped.contains(&b.id));
    c.projects.retain(|p| !dropped.contains(&p.brand_id));
    for user in &mut c.users {
        if user.brand_id.is_some_and(|id| dropped.contains(&id)) {
            user.brand_id = None;
        }
    }

    report.brands_removed = dropped.len();
    report.projects_removed = projects_before - c.projects.len();
}

/// Keep only staff accounts and clear every brand and project.
pub async fn reset_keep_staff(pool: &DbPool) -> Result<ResetReport, StoreError> {
    pool.write(|c| {
        let before = c.users.len();
        c.users.retain(|u| u.role == Role::Staff);
        let report = ResetReport {
            staff_kept: c.users.len(),
            users_removed: before - c.users.len(),
            brands_removed: c.brands.len(),
            projects_removed: c.projects.len(),
        };
        c.brands.clear();
        c.projects.clear();
        Ok(report)
    })
    .await
}

/// Delete every project. Returns how many were removed.
pub async fn clear_projects(pool: &DbPool) -> Result<usize, StoreError> {
    pool.write(|c| {
        let removed = c.projects.len();
        c.projects.clear();
        Ok(removed)
    })
    .await
}

/// Replace every stored password that is not already a PHC hash with
/// `hash(plaintext)`. Returns the emails that were rehashed.
pub async fn hash_plaintext_passwords<E>(
    pool: &DbPool,
    hash: impl Fn(&str) -> Result<String, E>,
) -> Result<Vec<String>, StoreError>
where
    E: std::fmt::Display,
{
    pool.write(|c| {
        let mut changed = Vec::new();
        for user in &mut c.users {
            if user.password_hash.is_empty() || user.password_hash.starts_with('$') {
                continue;
            }
            user.password_hash = hash(&user.password_hash).map_err(|e| {
                briefdesk_core::error::CoreError::Internal(format!(
                    "Failed to hash password for {}: {e}",
                    user.email
                ))
            })?;
            changed.push(user.email.clone());
        }
        Ok(changed)
    })
    .await
}
