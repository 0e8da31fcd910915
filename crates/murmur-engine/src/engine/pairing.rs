use murmur_common::{EndReason, EngineError, EngineEvent, SessionId, Tier, UserId};
use tracing::{info, warn};

use super::Engine;
use crate::notifier::Notice;
use crate::state::Matchup;

/// What happened to a pairing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    Paired {
        partner: UserId,
        session_id: SessionId,
    },
    Waiting {
        position: usize,
    },
}

impl Engine {
    /// Pair `user` with the longest-waiting candidate of the highest tier, or
    /// queue them at `tier`.
    ///
    /// The decision is made under the write lock without any I/O. Both sides
    /// are told afterwards. A candidate who cannot be reached is dropped and
    /// the request moves on to the next one (or queues), without `user`
    /// hearing about it. If `user` cannot be reached, the partner is told the
    /// session was lost and the delivery error is returned.
    pub async fn request_pairing(
        &self,
        user: &UserId,
        tier: Tier,
    ) -> Result<PairingOutcome, EngineError> {
        loop {
            let matchup = self.state().write().await.pair_or_enqueue(user, tier)?;

            let (partner, session_id) = match matchup {
                Matchup::Queued { position } => {
                    info!(user = %user, ?tier, position, "Waiting for a partner");
                    self.publish(EngineEvent::Waiting { user: user.clone() });
                    return Ok(PairingOutcome::Waiting { position });
                }
                Matchup::Paired {
                    partner,
                    session_id,
                } => (partner, session_id),
            };

            info!(session = %session_id, "Strangers paired");
            self.publish(EngineEvent::Paired {
                a: partner.clone(),
                b: user.clone(),
                session_id: session_id.clone(),
            });

            if let Err(e) = self.notify(&partner, Notice::PartnerFound).await {
                warn!(session = %session_id, error = %e, "Waiting partner unreachable, trying next");
                self.abandon_pairing(user, &partner, &session_id).await;
                continue;
            }
            if let Err(e) = self.notify(user, Notice::PartnerFound).await {
                warn!(session = %session_id, error = %e, "Requester unreachable");
                self.end_failed_session(&partner, user, Some(&session_id))
                    .await;
                return Err(e.into());
            }

            return Ok(PairingOutcome::Paired {
                partner,
                session_id,
            });
        }
    }

    async fn abandon_pairing(&self, user: &UserId, partner: &UserId, session_id: &SessionId) {
        let abandoned = self
            .state()
            .write()
            .await
            .abandon_pairing(user, session_id);
        if abandoned.is_some() {
            self.publish(EngineEvent::Ended {
                user: user.clone(),
                partner: partner.clone(),
                reason: EndReason::Failure,
            });
        }
    }
}
