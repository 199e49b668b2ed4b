//! Brand document, team members, activity history and DTOs.

use briefdesk_core::roles::MemberRole;
use briefdesk_core::subscription::Subscription;
use briefdesk_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A person on a brand's team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
}

/// One line of a brand's activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: Timestamp,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Brand (tenant) document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: DbId,
    pub owner_id: DbId,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub typography: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub subscription: Subscription,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default = "Utc::now")]
    pub created_at: Timestamp,
    #[serde(default = "Utc::now")]
    pub updated_at: Timestamp,
}

/// Profile fields supplied at signup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrand {
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub brand_color: Option<String>,
    pub typography: Option<String>,
}

/// Onboarding patch. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrand {
    #[validate(length(max = 200, message = "Business name is too long"))]
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub brand_color: Option<String>,
    pub typography: Option<String>,
    /// Replaces the whole member list. The owner is always kept as `Admin`.
    pub members: Option<Vec<Member>>,
}

/// Row in the staff "all brands" table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub id: DbId,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub subscription: Subscription,
    pub active_projects: usize,
    pub owner_email: Option<String>,
}

impl Brand {
    pub(crate) fn new(owner_id: DbId, owner_email: &str, input: &CreateBrand, now: Timestamp) -> Self {
        Self {
            id: briefdesk_core::types::new_id(),
            owner_id,
            business_name: input.business_name.clone(),
            industry: input.industry.clone(),
            brand_color: input.brand_color.clone(),
            typography: input.typography.clone(),
            members: vec![Member {
                email: owner_email.to_string(),
                role: MemberRole::Admin,
            }],
            subscription: Subscription::default(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an activity entry and bump `updated_at`.
    pub fn record(&mut self, action: &str, detail: Option<String>, now: Timestamp) {
        self.history.push(HistoryEntry {
            at: now,
            action: action.to_string(),
            detail,
        });
        self.updated_at = now;
    }

    pub fn member(&self, email: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.email == email)
    }

    /// Make sure `owner_email` is listed as an `Admin` member.
    ///
    /// Returns `true` if the member list had to be changed.
    pub fn ensure_owner_member(&mut self, owner_email: &str) -> bool {
        match self.members.iter_mut().find(|m| m.email == owner_email) {
            Some(m) if m.role == MemberRole::Admin => false,
            Some(m) => {
                m.role = MemberRole::Admin;
                true
            }
            None => {
                self.members.insert(
                    0,
                    Member {
                        email: owner_email.to_string(),
                        role: MemberRole::Admin,
                    },
                );
                true
            }
        }
    }
}
