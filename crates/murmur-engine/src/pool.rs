//! Tiered FIFO of users waiting for a partner.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use murmur_common::{EngineError, Tier, UserId};
use serde::{Deserialize, Serialize};

/// A user waiting to be matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingEntry {
    pub user: UserId,
    pub tier: Tier,
    pub enqueued_at: DateTime<Utc>,
    /// Insertion sequence. Breaks ties between entries with the same timestamp.
    pub seq: u64,
}

/// Waiting users, one FIFO per tier.
///
/// Only checks its own membership. Whether the user is already chatting is
/// the caller's concern (see `EngineState`), which holds both stores under
/// one lock.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queues: BTreeMap<Tier, VecDeque<WaitingEntry>>,
    index: HashMap<UserId, Tier>,
    next_seq: u64,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `user` to the tail of `tier`.
    pub fn enqueue(&mut self, user: &UserId, tier: Tier) -> Result<WaitingEntry, EngineError> {
        if self.index.contains_key(user) {
            return Err(EngineError::AlreadyWaiting);
        }
        let entry = WaitingEntry {
            user: user.clone(),
            tier,
            enqueued_at: Utc::now(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.index.insert(user.clone(), tier);

        self.queues.entry(tier).or_default().push_back(entry.clone());
        Ok(entry)
    }

    /// Remove and return the oldest entry of the highest non-empty tier.
    pub fn pop_candidate(&mut self) -> Option<WaitingEntry> {
        for tier in Tier::SERVICE_ORDER {
            if let Some(entry) = self.queues.get_mut(&tier).and_then(VecDeque::pop_front) {
                self.index.remove(&entry.user);
                return Some(entry);
            }
        }
        None
    }

    /// Cancel a waiting user. `NotActive` if they were not waiting.
    pub fn remove(&mut self, user: &UserId) -> Result<WaitingEntry, EngineError> {
        let tier = self.index.remove(user).ok_or(EngineError::NotActive)?;
        let queue = self.queues.get_mut(&tier).ok_or(EngineError::NotActive)?;
        let pos = queue
            .iter()
            .position(|e| &e.user == user)
            .ok_or(EngineError::NotActive)?;
        queue.remove(pos).ok_or(EngineError::NotActive)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.index.contains_key(user)
    }

    /// 1-based position in overall service order, counting every entry in
    /// higher tiers ahead of the user.
    pub fn position(&self, user: &UserId) -> Option<usize> {
        let tier = *self.index.get(user)?;
        let mut ahead = 0;
        for t in Tier::SERVICE_ORDER {
            let queue = self.queues.get(&t);
            if t == tier {
                let pos = queue?.iter().position(|e| &e.user == user)?;
                return Some(ahead + pos + 1);
            }
            ahead += queue.map_or(0, VecDeque::len);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len_in(&self, tier: Tier) -> usize {
        self.queues.get(&tier).map_or(0, VecDeque::len)
    }

    /// All entries in service order.
    pub fn entries(&self) -> Vec<WaitingEntry> {
        Tier::SERVICE_ORDER
            .iter()
            .filter_map(|t| self.queues.get(t))
            .flat_map(|q| q.iter().cloned())
            .collect()
    }

    /// Rebuild a pool from previously saved entries, keeping their sequence
    /// numbers so FIFO order survives a restart.
    pub fn from_entries(mut entries: Vec<WaitingEntry>) -> Result<Self, EngineError> {
        entries.sort_by_key(|e| e.seq);
        let mut pool = Self::new();
        for entry in entries {
            if pool.index.insert(entry.user.clone(), entry.tier).is_some() {
                return Err(EngineError::Snapshot(format!(
                    "user {} is queued twice",
                    entry.user
                )));
            }
            let after = entry.seq.checked_add(1).ok_or_else(|| {
                EngineError::Snapshot(format!("user {} has an out-of-range sequence", entry.user))
            })?;
            pool.next_seq = pool.next_seq.max(after);
            pool.queues.entry(entry.tier).or_default().push_back(entry);
        }
        Ok(pool)
    }
}
