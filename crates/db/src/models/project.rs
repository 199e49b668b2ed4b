//! Project document, uploaded files and DTOs.

use briefdesk_core::project_status::ProjectStatus;
use briefdesk_core::roles::Role;
use briefdesk_core::types::{DbId, Timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Keys the server owns. Extra client fields with these names are dropped so
/// they cannot shadow real fields in the flattened output.
const RESERVED_KEYS: &[&str] = &[
    "id",
    "brandId",
    "brandName",
    "brandEmail",
    "status",
    "files",
    "changeRequests",
    "assignee",
    "deliveredAt",
    "createdAt",
    "updatedAt",
];

/// Brand assets referenced by a project brief.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssets {
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub typography: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
}

/// A file attached to a project by the brand or delivered by staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    /// Public URL, e.g. `/uploads/1718000000000-123456789.png`.
    pub url: String,
    pub original_name: String,
    #[serde(default)]
    pub uploaded_by: Role,
    pub uploaded_at: Timestamp,
    #[serde(default)]
    pub size_bytes: u64,
}

/// A brand's request for another round after a delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    #[serde(default)]
    pub notes: Option<String>,
    pub requested_at: Timestamp,
}

/// Project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub brand_id: DbId,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub brand_email: String,
    pub name: String,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub key_features: Option<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub tone_of_voice: Vec<String>,
    #[serde(default)]
    pub usage: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assets: ProjectAssets,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
    #[serde(default, deserialize_with = "deserialize_flexible_timestamp")]
    pub deadline: Option<Timestamp>,
    #[serde(default)]
    pub delivered_at: Option<Timestamp>,
    #[serde(default = "Utc::now")]
    pub created_at: Timestamp,
    #[serde(default = "Utc::now")]
    pub updated_at: Timestamp,
    /// Any additional brief fields the client sent, kept verbatim.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// DTO for creating a project. Unknown fields land in `metadata`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub name: String,
    pub brief: Option<String>,
    pub requirements: Option<String>,
    pub primary_goal: Option<String>,
    pub key_features: Option<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub tone_of_voice: Vec<String>,
    #[serde(default)]
    pub usage: Vec<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub assets: ProjectAssets,
    #[serde(default, deserialize_with = "deserialize_flexible_timestamp")]
    pub deadline: Option<Timestamp>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Project {
    pub(crate) fn new(
        brand_id: DbId,
        brand_name: Option<String>,
        brand_email: String,
        input: &CreateProject,
        now: Timestamp,
    ) -> Self {
        let metadata = input
            .metadata
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            id: briefdesk_core::types::new_id(),
            brand_id,
            brand_name,
            brand_email,
            name: input.name.trim().to_string(),
            brief: input.brief.clone(),
            requirements: input.requirements.clone(),
            primary_goal: input.primary_goal.clone(),
            key_features: input.key_features.clone(),
            target_audience: input.target_audience.clone(),
            tone_of_voice: input.tone_of_voice.clone(),
            usage: input.usage.clone(),
            notes: input.notes.clone(),
            assets: input.assets.clone(),
            assignee: None,
            status: ProjectStatus::Pending,
            files: Vec::new(),
            change_requests: Vec::new(),
            deadline: input.deadline,
            delivered_at: None,
            created_at: now,
            updated_at: now,
            metadata,
        }
    }
}

/// Accept either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date
/// (midnight UTC), as sent by HTML date inputs.
fn deserialize_flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}
