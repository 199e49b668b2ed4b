//! Repository for the `brands` collection.

use briefdesk_core::error::CoreError;
use briefdesk_core::roles::MemberRole;
use briefdesk_core::subscription::{Subscription, SubscriptionStatus};
use briefdesk_core::types::DbId;
use chrono::Utc;

use crate::models::brand::{Brand, BrandSummary, CreateBrand, Member, UpdateBrand};
use crate::repositories::{brand_mut, owner_email};
use crate::store::{Collections, StoreError};
use crate::DbPool;

/// Provides lookups, onboarding, subscription and team operations for brands.
pub struct BrandRepo;

impl BrandRepo {
    /// Find a brand by id.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Brand>, StoreError> {
        Ok(pool
            .read(|c| c.brands.iter().find(|b| b.id == id).cloned())
            .await)
    }

    /// Find the brand owned by `owner_id`.
    pub async fn find_by_owner(pool: &DbPool, owner_id: DbId) -> Result<Option<Brand>, StoreError> {
        Ok(pool
            .read(|c| c.brands.iter().find(|b| b.owner_id == owner_id).cloned())
            .await)
    }

    /// Find the brand a user works for: the one referenced by their
    /// `brandId`, falling back to the brand they own.
    pub async fn find_for_user(pool: &DbPool, user_id: DbId) -> Result<Option<Brand>, StoreError> {
        Ok(pool
            .read(|c| brand_index_for_user(c, user_id).map(|i| c.brands[i].clone()))
            .await)
    }

    /// List all brands, newest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<Brand>, StoreError> {
        let mut brands = pool.read(|c| c.brands.clone()).await;
        brands.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(brands)
    }

    /// Staff overview rows with active project counts and owner emails.
    pub async fn list_summaries(pool: &DbPool) -> Result<Vec<BrandSummary>, StoreError> {
        let mut rows = pool
            .read(|c| {
                c.brands
                    .iter()
                    .map(|b| BrandSummary {
                        id: b.id,
                        name: b.business_name.clone(),
                        industry: b.industry.clone(),
                        subscription: b.subscription.clone(),
                        active_projects: c
                            .projects
                            .iter()
                            .filter(|p| p.brand_id == b.id && p.status.is_active())
                            .count(),
                        owner_email: owner_email(c, b.owner_id),
                    })
                    .collect::<Vec<_>>()
            })
            .await;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Merge profile fields into the user's brand, creating it if missing.
    ///
    /// A supplied member list replaces the current one; the owner is always
    /// kept as an `Admin`.
    pub async fn onboard(
        pool: &DbPool,
        user_id: DbId,
        input: &UpdateBrand,
    ) -> Result<Brand, StoreError> {
        pool.write(|c| {
            let now = Utc::now();
            let index = match brand_index_for_user(c, user_id) {
                Some(i) => i,
                None => {
                    let user = c
                        .users
                        .iter_mut()
                        .find(|u| u.id == user_id)
                        .ok_or_else(|| CoreError::not_found("User", user_id))?;
                    let brand = Brand::new(user.id, &user.email, &CreateBrand::default(), now);
                    user.brand_id = Some(brand.id);
                    c.brands.push(brand);
                    c.brands.len() - 1
                }
            };

            let owner = owner_email(c, c.brands[index].owner_id);
            let brand = &mut c.brands[index];

            if let Some(v) = &input.business_name {
                brand.business_name = Some(v.trim().to_string());
            }
            if let Some(v) = &input.industry {
                brand.industry = Some(v.clone());
            }
            if let Some(v) = &input.brand_color {
                brand.brand_color = Some(v.clone());
            }
            if let Some(v) = &input.typography {
                brand.typography = Some(v.clone());
            }
            if let Some(members) = &input.members {
                brand.members = dedupe_members(members);
            }
            if let Some(owner) = owner {
                brand.ensure_owner_member(&owner);
            }

            brand.record("brand.onboarded", None, now);
            Ok(brand.clone())
        })
        .await
    }

    /// Replace a brand's subscription and log the change.
    pub async fn set_subscription(
        pool: &DbPool,
        brand_id: DbId,
        subscription: Subscription,
    ) -> Result<Subscription, StoreError> {
        pool.write(|c| {
            let brand = brand_mut(c, brand_id)?;
            let (action, detail) = match subscription.status {
                SubscriptionStatus::Active => ("subscription.activated", subscription.plan.clone()),
                SubscriptionStatus::Skipped => ("subscription.skipped", None),
                SubscriptionStatus::None => ("subscription.cleared", None),
            };
            brand.subscription = subscription;
            brand.record(action, detail, Utc::now());
            Ok(brand.subscription.clone())
        })
        .await
    }

    /// Invite a member. Fails with a conflict if the email is already listed.
    pub async fn add_member(
        pool: &DbPool,
        brand_id: DbId,
        member: Member,
    ) -> Result<Brand, StoreError> {
        pool.write(|c| {
            let brand = brand_mut(c, brand_id)?;
            if brand.member(&member.email).is_some() {
                return Err(CoreError::Conflict(format!(
                    "{} is already a member of this brand",
                    member.email
                ))
                .into());
            }
            let detail = format!("{} as {:?}", member.email, member.role);
            brand.members.push(member);
            brand.record("member.added", Some(detail), Utc::now());
            Ok(brand.clone())
        })
        .await
    }

    /// Change a member's role. The owner cannot be demoted.
    pub async fn update_member_role(
        pool: &DbPool,
        brand_id: DbId,
        email: &str,
        role: MemberRole,
    ) -> Result<Brand, StoreError> {
        pool.write(|c| {
            let owner = owner_email(c, brand_lookup(c, brand_id)?.owner_id);
            if owner.as_deref() == Some(email) && role != MemberRole::Admin {
                return Err(CoreError::Validation(
                    "The brand owner must remain an Admin".into(),
                )
                .into());
            }

            let brand = brand_mut(c, brand_id)?;
            let member = brand
                .members
                .iter_mut()
                .find(|m| m.email == email)
                .ok_or_else(|| CoreError::not_found("Member", email))?;
            member.role = role;
            brand.record("member.role_changed", Some(format!("{email} to {role:?}")), Utc::now());
            Ok(brand.clone())
        })
        .await
    }

    /// Remove a member. The owner cannot be removed.
    pub async fn remove_member(
        pool: &DbPool,
        brand_id: DbId,
        email: &str,
    ) -> Result<Brand, StoreError> {
        pool.write(|c| {
            let owner = owner_email(c, brand_lookup(c, brand_id)?.owner_id);
            if owner.as_deref() == Some(email) {
                return Err(
                    CoreError::Validation("The brand owner cannot be removed".into()).into(),
                );
            }

            let brand = brand_mut(c, brand_id)?;
            let before = brand.members.len();
            brand.members.retain(|m| m.email != email);
            if brand.members.len() == before {
                return Err(CoreError::not_found("Member", email).into());
            }
            brand.record("member.removed", Some(email.to_string()), Utc::now());
            Ok(brand.clone())
        })
        .await
    }
}

fn brand_lookup(c: &Collections, id: DbId) -> Result<&Brand, StoreError> {
    c.brands
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| CoreError::not_found("Brand", id).into())
}

fn brand_index_for_user(c: &Collections, user_id: DbId) -> Option<usize> {
    let linked = c
        .users
        .iter()
        .find(|u| u.id == user_id)
        .and_then(|u| u.brand_id);

    linked
        .and_then(|id| c.brands.iter().position(|b| b.id == id))
        .or_else(|| c.brands.iter().position(|b| b.owner_id == user_id))
}

/// Normalize member emails and keep the first entry per address.
fn dedupe_members(members: &[Member]) -> Vec<Member> {
    let mut out: Vec<Member> = Vec::with_capacity(members.len());
    for m in members {
        let email = briefdesk_core::email::normalize_email(&m.email);
        if email.is_empty() || out.iter().any(|o| o.email == email) {
            continue;
        }
        out.push(Member {
            email,
            role: m.role,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_members_normalizes_and_keeps_first() {
        let members = vec![
            Member {
                email: " A@x.io".into(),
                role: MemberRole::Editor,
            },
            Member {
                email: "a@x.io".into(),
                role: MemberRole::Viewer,
            },
            Member {
                email: "  ".into(),
                role: MemberRole::Viewer,
            },
        ];
        let out = dedupe_members(&members);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].email, "a@x.io");
        assert_eq!(out[0].role, MemberRole::Editor);
    }
}
