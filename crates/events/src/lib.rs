//! Briefdesk event bus and email notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`EmailDispatcher`]: background service that sends account emails.
//! - [`delivery`]: SMTP delivery.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{EventBus, EventSubject, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, EmailMessage};
pub use dispatcher::EmailDispatcher;
