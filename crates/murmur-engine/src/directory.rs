//! Directory of active two-party chat sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use murmur_common::{EngineError, SessionId, UserId};
use serde::{Deserialize, Serialize};

/// A live link between two strangers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: SessionId,
    pub participant_a: UserId,
    pub participant_b: UserId,
    pub started_at: DateTime<Utc>,
}

impl ChatSession {
    /// The other participant, or `None` if `user` is not part of this session.
    pub fn partner_of(&self, user: &UserId) -> Option<&UserId> {
        if &self.participant_a == user {
            Some(&self.participant_b)
        } else if &self.participant_b == user {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

/// Sessions keyed by id, plus a user → session index.
///
/// Partners are always resolved through the session record, never stored
/// per user, so the relation is symmetric by construction.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: HashMap<SessionId, ChatSession>,
    by_user: HashMap<UserId, SessionId>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `a` and `b` in a fresh session.
    pub fn create(&mut self, a: &UserId, b: &UserId) -> Result<SessionId, EngineError> {
        let session = ChatSession {
            session_id: SessionId::new(),
            participant_a: a.clone(),
            participant_b: b.clone(),
            started_at: Utc::now(),
        };
        let session_id = session.session_id.clone();
        self.insert(session)?;
        Ok(session_id)
    }

    /// Install an existing session record (fresh or restored).
    pub fn insert(&mut self, session: ChatSession) -> Result<(), EngineError> {
        if session.participant_a == session.participant_b {
            return Err(EngineError::InvalidTransition(format!(
                "user {} cannot chat with themselves",
                session.participant_a
            )));
        }
        if self.by_user.contains_key(&session.participant_a)
            || self.by_user.contains_key(&session.participant_b)
        {
            return Err(EngineError::AlreadyInSession);
        }

        self.by_user
            .insert(session.participant_a.clone(), session.session_id.clone());
        self.by_user
            .insert(session.participant_b.clone(), session.session_id.clone());
        self.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    pub fn lookup_partner(&self, user: &UserId) -> Option<UserId> {
        self.route(user).map(|(_, partner)| partner)
    }

    /// Session id and partner for `user`, resolved together.
    pub fn route(&self, user: &UserId) -> Option<(SessionId, UserId)> {
        let session = self.get(self.by_user.get(user)?)?;
        let partner = session.partner_of(user)?.clone();
        Some((session.session_id.clone(), partner))
    }

    pub fn session_of(&self, user: &UserId) -> Option<&SessionId> {
        self.by_user.get(user)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&ChatSession> {
        self.sessions.get(session_id)
    }

    /// Remove the session `user` belongs to, unlinking both sides at once.
    pub fn end(&mut self, user: &UserId) -> Result<ChatSession, EngineError> {
        let session_id = self.by_user.get(user).ok_or(EngineError::NotInSession)?;
        let session = self
            .sessions
            .remove(session_id)
            .ok_or(EngineError::NotInSession)?;
        self.by_user.remove(&session.participant_a);
        self.by_user.remove(&session.participant_b);
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> Vec<ChatSession> {
        let mut all: Vec<ChatSession> = self.sessions.values().cloned().collect();
        all.sort_by_key(|s| s.started_at);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    #[test]
    fn create_links_both_sides() {
        let mut dir = SessionDirectory::new();
        let sid = dir.create(&user("a"), &user("b")).unwrap();

        assert_eq!(dir.lookup_partner(&user("a")), Some(user("b")));
        assert_eq!(dir.lookup_partner(&user("b")), Some(user("a")));
        assert_eq!(dir.session_of(&user("a")), Some(&sid));
        assert_eq!(dir.session_of(&user("b")), Some(&sid));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn create_rejects_busy_participant() {
        let mut dir = SessionDirectory::new();
        dir.create(&user("a"), &user("b")).unwrap();

        assert_eq!(
            dir.create(&user("c"), &user("a")),
            Err(EngineError::AlreadyInSession)
        );
        assert_eq!(dir.lookup_partner(&user("c")), None);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn create_rejects_self_pair() {
        let mut dir = SessionDirectory::new();
        let err = dir.create(&user("a"), &user("a")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
        assert!(dir.is_empty());
    }

    #[test]
    fn end_unlinks_both_sides() {
        let mut dir = SessionDirectory::new();
        dir.create(&user("a"), &user("b")).unwrap();

        let ended = dir.end(&user("b")).unwrap();
        assert_eq!(ended.partner_of(&user("b")), Some(&user("a")));
        assert_eq!(dir.lookup_partner(&user("a")), None);
        assert_eq!(dir.lookup_partner(&user("b")), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn end_twice_reports_not_in_session() {
        let mut dir = SessionDirectory::new();
        dir.create(&user("a"), &user("b")).unwrap();
        dir.end(&user("a")).unwrap();

        assert_eq!(dir.end(&user("a")), Err(EngineError::NotInSession));
        assert_eq!(dir.end(&user("b")), Err(EngineError::NotInSession));
    }

    #[test]
    fn partners_stay_symmetric_across_churn() {
        let mut dir = SessionDirectory::new();
        let users: Vec<UserId> = (0..8).map(|i| user(&format!("u{i}"))).collect();
        for pair in users.chunks(2) {
            dir.create(&pair[0], &pair[1]).unwrap();
        }
        dir.end(&users[2]).unwrap();
        dir.end(&users[7]).unwrap();
        dir.create(&users[2], &users[7]).unwrap();

        for u in &users {
            if let Some(p) = dir.lookup_partner(u) {
                assert_eq!(dir.lookup_partner(&p).as_ref(), Some(u));
            }
        }
        assert_eq!(dir.lookup_partner(&users[2]), Some(users[7].clone()));
        assert_eq!(dir.lookup_partner(&users[3]), None);
    }

    #[test]
    fn partner_of_outsider_is_none() {
        let mut dir = SessionDirectory::new();
        let sid = dir.create(&user("a"), &user("b")).unwrap();
        let session = dir.get(&sid).unwrap();
        assert_eq!(session.partner_of(&user("z")), None);
    }
}
