//! Combined engine state: waiting pool, session directory and per-user stats.
//!
//! Both stores live in one struct behind one lock so that every mutation
//! (enqueue, pop, cancel, create, end) is serialized with every other. A
//! user recorded as waiting *and* chatting at once is a bug, not an error
//! result, and trips an assertion.

use std::collections::BTreeMap;

use murmur_common::{EngineError, SessionId, Tier, UserId, UserState};
use serde::{Deserialize, Serialize};

use crate::directory::{ChatSession, SessionDirectory};
use crate::pool::{WaitingEntry, WaitingPool};

/// Lifetime counters for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub chats_completed: u64,
}

/// Result of the synchronous pair-or-wait decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matchup {
    Paired {
        partner: UserId,
        session_id: SessionId,
    },
    Queued {
        position: usize,
    },
}

#[derive(Debug, Default)]
pub struct EngineState {
    pub(crate) pool: WaitingPool,
    pub(crate) directory: SessionDirectory,
    pub(crate) stats: BTreeMap<UserId, UserStats>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_state(&self, user: &UserId) -> UserState {
        let waiting = self.pool.contains(user);
        let session = self.directory.session_of(user);
        assert!(
            !(waiting && session.is_some()),
            "user {user} is recorded as both waiting and in a session"
        );
        match session {
            Some(sid) => UserState::InSession(sid.clone()),
            None if waiting => UserState::Waiting,
            None => UserState::Idle,
        }
    }

    pub(crate) fn assert_consistent(&self, user: &UserId) {
        let _ = self.user_state(user);
    }

    /// Match `user` with the best waiting candidate, or queue them.
    pub(crate) fn pair_or_enqueue(
        &mut self,
        user: &UserId,
        tier: Tier,
    ) -> Result<Matchup, EngineError> {
        match self.user_state(user) {
            UserState::Idle => {}
            UserState::Waiting => return Err(EngineError::AlreadyWaiting),
            UserState::InSession(_) => return Err(EngineError::AlreadyInSession),
        }

        let matchup = match self.pool.pop_candidate() {
            Some(candidate) => {
                let session_id = self.directory.create(&candidate.user, user)?;
                Matchup::Paired {
                    partner: candidate.user,
                    session_id,
                }
            }
            None => {
                self.pool.enqueue(user, tier)?;
                Matchup::Queued {
                    position: self.pool.position(user).unwrap_or(1),
                }
            }
        };

        self.assert_consistent(user);
        Ok(matchup)
    }

    /// Take `user` out of the waiting pool.
    pub(crate) fn cancel_waiting(&mut self, user: &UserId) -> Result<WaitingEntry, EngineError> {
        self.pool.remove(user)
    }

    /// End the session `user` belongs to and count it for both sides.
    pub(crate) fn end_session(&mut self, user: &UserId) -> Result<ChatSession, EngineError> {
        let session = self.directory.end(user)?;
        for participant in [&session.participant_a, &session.participant_b] {
            self.stats
                .entry(participant.clone())
                .or_default()
                .chats_completed += 1;
        }
        Ok(session)
    }

    /// End the session only if it is still the one identified by `expected`
    /// (or, with no id, still links `user` and `partner`).
    pub(crate) fn end_if_linked(
        &mut self,
        user: &UserId,
        partner: &UserId,
        expected: Option<&SessionId>,
    ) -> Option<ChatSession> {
        let (session_id, current) = self.directory.route(user)?;
        if &current != partner || expected.is_some_and(|sid| sid != &session_id) {
            return None;
        }
        self.end_session(user).ok()
    }

    /// Undo a pairing neither side was told about. Not counted in stats.
    pub(crate) fn abandon_pairing(
        &mut self,
        user: &UserId,
        session_id: &SessionId,
    ) -> Option<ChatSession> {
        if self.directory.session_of(user) != Some(session_id) {
            return None;
        }
        self.directory.end(user).ok()
    }

    pub fn stats(&self, user: &UserId) -> UserStats {
        self.stats.get(user).copied().unwrap_or_default()
    }

    /// Full scan of the cross-store invariants.
    pub fn check_invariants(&self) {
        for entry in self.pool.entries() {
            self.assert_consistent(&entry.user);
        }
        for session in self.directory.sessions() {
            assert_ne!(session.participant_a, session.participant_b);
            for user in [&session.participant_a, &session.participant_b] {
                let partner = self.directory.lookup_partner(user);
                let back = partner
                    .as_ref()
                    .and_then(|p| self.directory.lookup_partner(p));
                assert_eq!(back.as_ref(), Some(user), "asymmetric session for {user}");
                self.assert_consistent(user);
            }
        }
    }

    /// Rebuild state from saved parts, rejecting anything that would break
    /// the per-user invariants.
    pub(crate) fn from_parts(
        waiting: Vec<WaitingEntry>,
        sessions: Vec<ChatSession>,
        stats: BTreeMap<UserId, UserStats>,
    ) -> Result<Self, EngineError> {
        let pool = WaitingPool::from_entries(waiting)?;
        let mut directory = SessionDirectory::new();
        for session in sessions {
            let id = session.session_id.clone();
            if pool.contains(&session.participant_a) || pool.contains(&session.participant_b) {
                return Err(EngineError::Snapshot(format!(
                    "session {id} has a participant who is also waiting"
                )));
            }
            directory
                .insert(session)
                .map_err(|e| EngineError::Snapshot(format!("session {id}: {e}")))?;
        }
        Ok(Self {
            pool,
            directory,
            stats,
        })
    }
}
