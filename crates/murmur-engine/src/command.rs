//! Abstract command surface: what transports feed into the engine.

use murmur_common::{EngineError, SessionId, Tier, UserId};

use crate::engine::{Engine, PairingOutcome, StopOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestPairing { user: UserId, tier: Tier },
    Cancel { user: UserId },
    Stop { user: UserId },
    SendMessage { user: UserId, payload: String },
}

/// Reply to the user who issued a command. Never names the partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Paired { session_id: SessionId },
    Waiting { position: usize },
    LeftQueue,
    ChatEnded,
    Delivered,
}

impl Engine {
    pub async fn handle(&self, command: Command) -> Result<Reply, EngineError> {
        match command {
            Command::RequestPairing { user, tier } => {
                match self.request_pairing(&user, tier).await? {
                    PairingOutcome::Paired { session_id, .. } => Ok(Reply::Paired { session_id }),
                    PairingOutcome::Waiting { position } => Ok(Reply::Waiting { position }),
                }
            }
            Command::Cancel { user } => self.cancel(&user).await.map(stop_reply),
            Command::Stop { user } => self.stop(&user).await.map(stop_reply),
            Command::SendMessage { user, payload } => {
                self.relay(&user, &payload).await?;
                Ok(Reply::Delivered)
            }
        }
    }
}

fn stop_reply(outcome: StopOutcome) -> Reply {
    match outcome {
        StopOutcome::LeftQueue => Reply::LeftQueue,
        StopOutcome::ChatEnded { .. } => Reply::ChatEnded,
    }
}
