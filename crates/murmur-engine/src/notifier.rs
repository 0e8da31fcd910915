//! Outbound delivery seam: whatever transport carries notices to users.

use std::time::Duration;

use async_trait::async_trait;
use murmur_common::{DeliveryError, UserId};
use serde::{Deserialize, Serialize};

/// Something the engine wants a user to see.
///
/// `Message` carries only the text: the recipient never learns
/// who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    PartnerFound,
    Message { text: String },
    PartnerLeft,
    PartnerLost,
}

impl Notice {
    /// Human-readable rendering for plain-text transports.
    pub fn text(&self) -> String {
        match self {
            Notice::PartnerFound => "Stranger found! Say hi.".into(),
            Notice::Message { text } => format!("Stranger: {text}"),
            Notice::PartnerLeft => {
                "The stranger ended the chat. Request a new chat to meet someone else.".into()
            }
            Notice::PartnerLost => {
                "The other side disconnected unexpectedly. Request a new chat to meet someone else."
                    .into()
            }
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user: &UserId, notice: Notice) -> Result<(), DeliveryError>;
}

/// Send one notice, bounded by `limit`. Running out of time is a failure.
pub(crate) async fn deliver(
    notifier: &dyn Notifier,
    user: &UserId,
    notice: Notice,
    limit: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(limit, notifier.send(user, notice)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(limit)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// Records every delivered notice; can be told to fail or stall per user.
    #[derive(Default)]
    pub struct RecordingNotifier {
        delivered: Mutex<Vec<(UserId, Notice)>>,
        failing: Mutex<HashSet<UserId>>,
        stalled: Mutex<HashSet<UserId>>,
    }

    impl RecordingNotifier {
        pub fn fail_for(&self, user: &UserId) {
            self.failing.lock().unwrap().insert(user.clone());
        }

        pub fn stall_for(&self, user: &UserId) {
            self.stalled.lock().unwrap().insert(user.clone());
        }

        pub fn resume_for(&self, user: &UserId) {
            self.stalled.lock().unwrap().remove(user);
        }

        pub fn delivered(&self) -> Vec<(UserId, Notice)> {
            self.delivered.lock().unwrap().clone()
        }

        pub fn delivered_to(&self, user: &UserId) -> Vec<Notice> {
            self.delivered()
                .into_iter()
                .filter(|(u, _)| u == user)
                .map(|(_, n)| n)
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, user: &UserId, notice: Notice) -> Result<(), DeliveryError> {
            let failing = self.failing.lock().unwrap().contains(user);
            if failing {
                return Err(DeliveryError::Unreachable(format!("{user} blocked the bot")));
            }
            let stalled = self.stalled.lock().unwrap().contains(user);
            if stalled {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.delivered.lock().unwrap().push((user.clone(), notice));
            Ok(())
        }
    }
}
