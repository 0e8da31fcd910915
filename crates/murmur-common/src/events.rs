use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{SessionId, UserId};

/// Why a chat session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Voluntary,
    Failure,
}

/// Events the engine publishes for the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    Paired {
        a: UserId,
        b: UserId,
        session_id: SessionId,
    },
    Waiting {
        user: UserId,
    },
    /// `user` is the side that stopped (or whose message bounced).
    Ended {
        user: UserId,
        partner: UserId,
        reason: EndReason,
    },
    DeliveryFailed {
        user: UserId,
    },
}

pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: EngineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(EngineEvent::Waiting {
            user: UserId::from("alice"),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EngineEvent::Waiting { ref user } if user.as_str() == "alice"));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(EngineEvent::DeliveryFailed {
            user: UserId::from("bob"),
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(EngineEvent::Waiting {
            user: UserId::from("x"),
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn ended_event_serializes_reason() {
        let event = EngineEvent::Ended {
            user: UserId::from("a"),
            partner: UserId::from("b"),
            reason: EndReason::Failure,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Ended\""));
        assert!(json.contains("\"reason\":\"failure\""));
    }
}
