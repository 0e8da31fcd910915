use murmur_common::{EngineError, EngineEvent, UserId};
use tracing::{debug, warn};

use super::Engine;
use crate::notifier::Notice;

impl Engine {
    /// Forward `payload` to the sender's partner, without the sender's identity.
    ///
    /// A failed or timed-out delivery ends the session (the sender is told
    /// the other side is gone) and returns `DeliveryFailure`, or `Timeout`
    /// when the notifier ran out of time. No retry.
    pub async fn relay(&self, sender: &UserId, payload: &str) -> Result<(), EngineError> {
        let (session_id, partner) = self
            .state()
            .read()
            .await
            .directory
            .route(sender)
            .ok_or(EngineError::NotInSession)?;

        let notice = Notice::Message {
            text: payload.to_string(),
        };
        match self.notify(&partner, notice).await {
            Ok(()) => {
                debug!(session = %session_id, bytes = payload.len(), "Relayed message");
                Ok(())
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "Relay failed, ending session");
                self.end_failed_session(sender, &partner, Some(&session_id))
                    .await;
                self.publish(EngineEvent::DeliveryFailed {
                    user: sender.clone(),
                });
                Err(e.into())
            }
        }
    }
}
