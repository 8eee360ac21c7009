//! Session change notifications.
//!
//! [`SessionEvents`] is created once at startup and shared through `AppState`. Login and logout
//! publish to it; the `/authentication/session/events` stream subscribes. A subscriber
//! unsubscribes by dropping its receiver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::types::UserId;

/// Buffered events per subscriber before the slowest one starts lagging
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, kind: SessionEventKind, user_id: UserId) {
        let event = SessionEvent {
            kind,
            user_id,
            at: Utc::now(),
        };
        if self.sender.send(event).is_err() {
            tracing::trace!("no session event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        let user = Uuid::new_v4();

        events.publish(SessionEventKind::SignedIn, user);
        events.publish(SessionEventKind::SignedOut, user);

        assert_eq!(rx.recv().await.unwrap().kind, SessionEventKind::SignedIn);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, SessionEventKind::SignedOut);
        assert_eq!(second.user_id, user);
    }

    #[test]
    fn test_dropping_receiver_unsubscribes() {
        let events = SessionEvents::new();
        let rx = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);
        drop(rx);
        assert_eq!(events.subscriber_count(), 0);

        // Publishing without subscribers must not panic
        events.publish(SessionEventKind::SignedIn, Uuid::new_v4());
    }
}
