//! Fan-out of [`PlatformEvent`]s from request handlers to background
//! services, over a `tokio::sync::broadcast` channel.

use briefdesk_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The record an event is about, e.g. the project that changed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSubject {
    pub kind: String,
    pub id: DbId,
}

/// Something that happened to an account or a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEvent {
    /// Dot-separated name from [`briefdesk_core::event_types`].
    pub event_type: String,
    pub subject: Option<EventSubject>,
    /// User whose request produced the event.
    pub actor_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            subject: None,
            actor_id: None,
            payload: serde_json::json!({}),
            occurred_at: Utc::now(),
        }
    }

    pub fn about(mut self, kind: impl Into<String>, id: DbId) -> Self {
        self.subject = Some(EventSubject {
            kind: kind.into(),
            id,
        });
        self
    }

    pub fn by(mut self, user_id: DbId) -> Self {
        self.actor_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// String field of the payload, if present.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// Shared as `Arc<EventBus>`; dropping the last handle closes every receiver.
///
/// ```rust
/// use briefdesk_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.publish(PlatformEvent::new("project.created"));
/// assert_eq!(rx.try_recv().unwrap().event_type, "project.created");
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Receivers falling more than `capacity` events behind see
    /// `RecvError::Lagged` and lose the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Events published while nobody is subscribed are discarded.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
