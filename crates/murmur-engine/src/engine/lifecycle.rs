use murmur_common::{EndReason, EngineError, EngineEvent, SessionId, UserId, UserState};
use tracing::{debug, info, warn};

use super::Engine;
use crate::notifier::Notice;

/// What a successful `stop` or `cancel` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    LeftQueue,
    ChatEnded { partner: UserId },
}

impl Engine {
    /// Leave the queue or the current chat. `NotActive` for idle users.
    pub async fn stop(&self, user: &UserId) -> Result<StopOutcome, EngineError> {
        let ended = {
            let mut state = self.state().write().await;
            match state.user_state(user) {
                UserState::Idle => return Err(EngineError::NotActive),
                UserState::Waiting => {
                    state.cancel_waiting(user)?;
                    None
                }
                UserState::InSession(_) => Some(state.end_session(user)?),
            }
        };

        let Some(session) = ended else {
            info!(user = %user, "Left the queue");
            return Ok(StopOutcome::LeftQueue);
        };

        let partner = session
            .partner_of(user)
            .cloned()
            .ok_or(EngineError::NotInSession)?;
        info!(session = %session.session_id, "Chat ended by participant");

        if let Err(e) = self.notify(&partner, Notice::PartnerLeft).await {
            debug!(session = %session.session_id, error = %e, "Partner already gone");
        }
        self.publish(EngineEvent::Ended {
            user: user.clone(),
            partner: partner.clone(),
            reason: EndReason::Voluntary,
        });
        Ok(StopOutcome::ChatEnded { partner })
    }

    /// Withdraw a pending pairing request.
    ///
    /// Only valid while waiting: a chatting user gets `InvalidTransition` and
    /// must `stop` instead.
    pub async fn cancel(&self, user: &UserId) -> Result<StopOutcome, EngineError> {
        let mut state = self.state().write().await;
        match state.user_state(user) {
            UserState::Idle => Err(EngineError::NotActive),
            UserState::InSession(_) => Err(EngineError::InvalidTransition(
                "cancel is only valid while waiting; stop the chat instead".into(),
            )),
            UserState::Waiting => {
                state.cancel_waiting(user)?;
                info!(user = %user, "Pairing request cancelled");
                Ok(StopOutcome::LeftQueue)
            }
        }
    }

    /// Tear down the session between `user` and an unreachable `partner`.
    ///
    /// `user` is the side still connected and is the one told that the other
    /// side disappeared. Returns `false` if the two are no longer paired.
    pub async fn end_on_failure(&self, user: &UserId, partner: &UserId) -> bool {
        self.end_failed_session(user, partner, None).await
    }

    pub(crate) async fn end_failed_session(
        &self,
        user: &UserId,
        partner: &UserId,
        expected: Option<&SessionId>,
    ) -> bool {
        let ended = self
            .state()
            .write()
            .await
            .end_if_linked(user, partner, expected);
        let Some(session) = ended else {
            debug!(user = %user, "Session already gone, nothing to tear down");
            return false;
        };

        warn!(session = %session.session_id, "Chat ended after delivery failure");
        if let Err(e) = self.notify(user, Notice::PartnerLost).await {
            debug!(session = %session.session_id, error = %e, "Could not report lost partner");
        }
        self.publish(EngineEvent::Ended {
            user: user.clone(),
            partner: partner.clone(),
            reason: EndReason::Failure,
        });
        true
    }
}
