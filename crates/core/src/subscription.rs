//! Subscription state of a brand and the project-creation gate.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Length of one paid billing period.
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Message returned when the gate refuses project creation.
pub const TRIAL_EXPIRED_MESSAGE: &str = "Trial expired. Please subscribe to continue.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Never chose a plan.
    #[default]
    None,
    Active,
    /// Explicitly declined a plan during onboarding.
    Skipped,
}

/// Subscription sub-document embedded in a brand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: Option<String>,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub renews_at: Option<Timestamp>,
    pub gateway: Option<String>,
}

impl Subscription {
    /// An active subscription on `plan`, renewing one period after `now`.
    pub fn activate(plan: String, gateway: Option<String>, now: Timestamp) -> Self {
        Self {
            plan: Some(plan),
            status: SubscriptionStatus::Active,
            renews_at: Some(now + Duration::days(SUBSCRIPTION_PERIOD_DAYS)),
            gateway,
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: SubscriptionStatus::Skipped,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Whether this subscription contributes to recurring revenue.
    pub fn is_billable(&self) -> bool {
        self.is_active() && self.plan.is_some()
    }
}

/// End of the free trial for an account created at `now`.
pub fn trial_end(now: Timestamp, trial_days: i64) -> Timestamp {
    now + Duration::days(trial_days)
}

/// A brand may create projects with an active subscription or while its
/// trial is running (the trial end instant itself still counts).
pub fn can_create_projects(
    subscription: Option<&Subscription>,
    trial_ends_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    let has_active_sub = subscription.is_some_and(Subscription::is_active);
    let within_trial = trial_ends_at.is_some_and(|end| now <= end);
    has_active_sub || within_trial
}

/// [`can_create_projects`] as a guard returning [`CoreError::PaymentRequired`].
pub fn ensure_can_create_projects(
    subscription: Option<&Subscription>,
    trial_ends_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if can_create_projects(subscription, trial_ends_at, now) {
        Ok(())
    } else {
        Err(CoreError::PaymentRequired(TRIAL_EXPIRED_MESSAGE.to_string()))
    }
}
