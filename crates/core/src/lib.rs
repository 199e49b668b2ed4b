//! Domain building blocks shared by every briefdesk crate.
//!
//! Nothing in here touches I/O: roles, lifecycle rules, the subscription
//! gate and analytics are plain functions over plain data.

pub mod analytics;
pub mod email;
pub mod error;
pub mod event_types;
pub mod project_status;
pub mod roles;
pub mod subscription;
pub mod types;
