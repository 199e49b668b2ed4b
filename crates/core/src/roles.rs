//! Account roles and brand team roles.
//!
//! [`Role`] is the platform-level role carried in JWT claims. [`MemberRole`]
//! is the role a person holds inside one brand's team.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_BRAND: &str = "brand";
pub const ROLE_STAFF: &str = "staff";

/// Platform role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A tenant client that requests projects.
    #[default]
    Brand,
    /// An internal fulfiller who works on projects.
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Brand => ROLE_BRAND,
            Role::Staff => ROLE_STAFF,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_BRAND => Ok(Role::Brand),
            ROLE_STAFF => Ok(Role::Staff),
            other => Err(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_BRAND}, {ROLE_STAFF}"
            )),
        }
    }
}

/// Role of a member inside a brand's team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberRole {
    Admin,
    Editor,
    #[default]
    Viewer,
}
