//! Live connections keyed by user, and the `Notifier` that writes to them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use murmur_common::{DeliveryError, UserId};
use murmur_engine::{Notice, Notifier};
use tokio::sync::{mpsc, RwLock};

use crate::protocol::ServerFrame;

struct Connection {
    id: u64,
    tx: mpsc::Sender<String>,
}

/// Thread-safe map of connected users to their outbound channels.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    conns: Arc<RwLock<HashMap<UserId, Connection>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user`. One connection per user.
    pub async fn register(
        &self,
        user: &UserId,
        tx: mpsc::Sender<String>,
    ) -> Result<u64, &'static str> {
        let mut map = self.conns.write().await;
        if map.contains_key(user) {
            return Err("user already connected");
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        map.insert(user.clone(), Connection { id, tx });
        Ok(id)
    }

    /// Drop `user`'s connection, unless it has since been replaced.
    pub async fn unregister(&self, user: &UserId, conn_id: u64) -> bool {
        let mut map = self.conns.write().await;
        if map.get(user).is_some_and(|c| c.id == conn_id) {
            map.remove(user);
            return true;
        }
        false
    }

    pub async fn send_frame(&self, user: &UserId, frame: &ServerFrame) -> Result<(), DeliveryError> {
        let tx = self
            .conns
            .read()
            .await
            .get(user)
            .map(|c| c.tx.clone())
            .ok_or_else(|| DeliveryError::Unreachable(format!("{user} is not connected")))?;

        let json = frame
            .to_json()
            .map_err(|e| DeliveryError::Unreachable(format!("unencodable frame: {e}")))?;
        tx.send(json)
            .await
            .map_err(|_| DeliveryError::Unreachable(format!("{user} connection closed")))
    }
}

#[async_trait]
impl Notifier for ConnectionRegistry {
    async fn send(&self, user: &UserId, notice: Notice) -> Result<(), DeliveryError> {
        self.send_frame(user, &ServerFrame::notice(notice)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_registered_user() {
        let registry = ConnectionRegistry::new();
        let alice = UserId::from("alice");
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(&alice, tx).await.unwrap();

        registry.send(&alice, Notice::PartnerFound).await.unwrap();
        let frame = rx.recv().await.unwrap();
        assert!(frame.contains("partner_found"));
    }

    #[tokio::test]
    async fn unknown_user_is_unreachable() {
        let registry = ConnectionRegistry::new();
        let err = registry
            .send(&UserId::from("ghost"), Notice::PartnerLeft)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Unreachable(_)));
    }

    #[tokio::test]
    async fn closed_channel_is_unreachable() {
        let registry = ConnectionRegistry::new();
        let bob = UserId::from("bob");
        let (tx, rx) = mpsc::channel(4);
        registry.register(&bob, tx).await.unwrap();
        drop(rx);

        assert!(registry.send(&bob, Notice::PartnerFound).await.is_err());
    }

    #[tokio::test]
    async fn second_connection_rejected() {
        let registry = ConnectionRegistry::new();
        let bob = UserId::from("bob");
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        registry.register(&bob, tx1).await.unwrap();
        assert!(registry.register(&bob, tx2).await.is_err());

        registry.send(&bob, Notice::PartnerLeft).await.unwrap();
        assert!(rx1.recv().await.unwrap().contains("partner_left"));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_unregister_keeps_newer_connection() {
        let registry = ConnectionRegistry::new();
        let bob = UserId::from("bob");
        let (tx1, _rx1) = mpsc::channel(4);
        let old = registry.register(&bob, tx1).await.unwrap();
        assert!(registry.unregister(&bob, old).await);

        let (tx2, _rx2) = mpsc::channel(4);
        let new = registry.register(&bob, tx2).await.unwrap();
        assert!(!registry.unregister(&bob, old).await);
        assert!(registry.send(&bob, Notice::PartnerFound).await.is_ok());
        assert!(registry.unregister(&bob, new).await);
    }
}
