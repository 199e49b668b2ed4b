//! Project lifecycle: statuses, actions and the transition table.
//!
//! ```text
//! Pending --assign--> In Progress --deliver--> Delivered --approve--> Completed
//!                          ^                       |
//!                          +----request changes----+
//! ```
//!
//! Staff may re-assign an in-progress project and may re-deliver a delivered
//! one (e.g. to attach more final files). Completed is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Delivered,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Delivered => "Delivered",
            ProjectStatus::Completed => "Completed",
        }
    }

    /// A project counts as active until it is completed.
    pub fn is_active(self) -> bool {
        self != ProjectStatus::Completed
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a brand or staff member does to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    /// Staff takes (or hands over) the work.
    Assign,
    /// Staff hands final files to the brand.
    Deliver,
    /// Brand accepts the delivery.
    Approve,
    /// Brand sends the delivery back for another round.
    RequestChanges,
}

impl ProjectAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectAction::Assign => "assign",
            ProjectAction::Deliver => "deliver",
            ProjectAction::Approve => "approve",
            ProjectAction::RequestChanges => "request changes",
        }
    }
}

/// Compute the status a project moves to when `action` is applied in `from`.
///
/// Returns [`CoreError::Conflict`] when the action is not allowed in the
/// current status.
pub fn transition(from: ProjectStatus, action: ProjectAction) -> Result<ProjectStatus, CoreError> {
    use ProjectAction as A;
    use ProjectStatus as S;

    let to = match (from, action) {
        (S::Pending | S::InProgress, A::Assign) => S::InProgress,
        (S::InProgress | S::Delivered, A::Deliver) => S::Delivered,
        (S::Delivered, A::Approve) => S::Completed,
        (S::Delivered, A::RequestChanges) => S::InProgress,
        _ => {
            return Err(CoreError::Conflict(format!(
                "Cannot {} a project that is {}",
                action.as_str(),
                from
            )))
        }
    };
    Ok(to)
}
