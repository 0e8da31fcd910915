use serde::{Deserialize, Serialize};

use crate::id::SessionId;

/// Priority class of a waiting user. Higher tiers are always matched first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Standard,
    Priority,
}

impl Tier {
    /// All tiers, highest first.
    pub const SERVICE_ORDER: [Tier; 2] = [Tier::Priority, Tier::Standard];
}

/// Where a user currently stands with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "session_id", rename_all = "snake_case")]
pub enum UserState {
    Idle,
    Waiting,
    InSession(SessionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_outranks_standard() {
        assert!(Tier::Priority > Tier::Standard);
        assert_eq!(Tier::SERVICE_ORDER[0], Tier::Priority);
        assert_eq!(Tier::default(), Tier::Standard);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Priority).unwrap(), "\"priority\"");
        let t: Tier = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(t, Tier::Standard);
    }

    #[test]
    fn user_state_serializes_session_id() {
        let sid: SessionId = serde_json::from_str("\"s-1\"").unwrap();
        let json = serde_json::to_string(&UserState::InSession(sid)).unwrap();
        assert_eq!(json, r#"{"state":"in_session","session_id":"s-1"}"#);
    }
}
