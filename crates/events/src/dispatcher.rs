//! Background service that turns account events into emails.
//!
//! [`EmailDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and sends a welcome email on `user.signed_up` and a reset link on
//! `auth.password_reset_requested`. Delivery failures are logged and never
//! reach the request that published the event.

use briefdesk_core::event_types::{PASSWORD_RESET_REQUESTED, USER_SIGNED_UP};
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::delivery::email::{EmailDelivery, EmailMessage};

/// Routes account events to the mailer.
pub struct EmailDispatcher {
    delivery: Option<EmailDelivery>,
    frontend_url: String,
    reset_expiry_mins: i64,
}

impl EmailDispatcher {
    /// `delivery` is `None` when SMTP is not configured; events are then
    /// acknowledged and dropped.
    pub fn new(delivery: Option<EmailDelivery>, frontend_url: String, reset_expiry_mins: i64) -> Self {
        Self {
            delivery,
            frontend_url,
            reset_expiry_mins,
        }
    }

    /// Render the email for `event`, if it is one this dispatcher handles.
    pub fn compose(&self, event: &PlatformEvent) -> Option<EmailMessage> {
        match event.event_type.as_str() {
            USER_SIGNED_UP => {
                let to = event.payload_str("email")?;
                let first_name = event.payload_str("firstName").unwrap_or_default();
                Some(EmailMessage::welcome(to, first_name))
            }
            PASSWORD_RESET_REQUESTED => {
                let to = event.payload_str("email")?;
                let token = event.payload_str("token")?;
                Some(EmailMessage::password_reset(
                    to,
                    &self.frontend_url,
                    token,
                    self.reset_expiry_mins,
                ))
            }
            _ => None,
        }
    }

    /// Run the dispatch loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Email dispatcher lagged, some emails were not sent");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email dispatcher shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) {
        let Some(message) = self.compose(event) else {
            return;
        };

        let Some(delivery) = &self.delivery else {
            tracing::debug!(
                to = %message.to,
                event_type = %event.event_type,
                "SMTP not configured, email skipped"
            );
            return;
        };

        if let Err(e) = delivery.send(&message).await {
            tracing::error!(
                error = %e,
                to = %message.to,
                event_type = %event.event_type,
                "Failed to send email"
            );
        }
    }
}
