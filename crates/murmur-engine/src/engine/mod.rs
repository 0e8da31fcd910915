//! The pairing and relay engine.
//!
//! `Engine` is a cheap-to-clone handle. All state sits behind one `RwLock`:
//! pairing, cancellation and teardown take the write side, relays only read
//! the partner and drop the lock before delivering. No notifier call is made
//! while the lock is held.

mod lifecycle;
mod pairing;
mod relay;


use std::sync::Arc;
use std::time::Duration;

use murmur_common::{DeliveryError, EngineEvent, EventBus, UserId, UserState};
use tokio::sync::{broadcast, RwLock};

use crate::notifier::{deliver, Notice, Notifier};
use crate::state::{EngineState, UserStats};

pub use lifecycle::StopOutcome;
pub use pairing::PairingOutcome;

/// Runtime knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on every notifier call.
    pub delivery_timeout: Duration,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(5),
            event_capacity: 256,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    state: Arc<RwLock<EngineState>>,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventBus>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(RwLock::new(EngineState::new())),
            notifier,
            events: Arc::new(EventBus::new(config.event_capacity)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub async fn user_state(&self, user: &UserId) -> UserState {
        self.state.read().await.user_state(user)
    }

    pub async fn lookup_partner(&self, user: &UserId) -> Option<UserId> {
        self.state.read().await.directory.lookup_partner(user)
    }

    pub async fn stats(&self, user: &UserId) -> UserStats {
        self.state.read().await.stats(user)
    }

    pub async fn waiting_count(&self) -> usize {
        self.state.read().await.pool.len()
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.directory.len()
    }

    /// Panics if any user is both waiting and chatting, or any session is
    /// one-sided.
    pub async fn check_invariants(&self) {
        self.state.read().await.check_invariants();
    }

    pub(crate) fn publish(&self, event: EngineEvent) {
        self.events.publish(event);
    }

    pub(crate) async fn notify(&self, user: &UserId, notice: Notice) -> Result<(), DeliveryError> {
        deliver(
            self.notifier.as_ref(),
            user,
            notice,
            self.config.delivery_timeout,
        )
        .await
    }

    pub(crate) fn state(&self) -> &RwLock<EngineState> {
        &self.state
    }
}
