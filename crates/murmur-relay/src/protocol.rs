//! Relay-level wire protocol: JSON text frames tagged by `type`.

use murmur_common::EngineError;
use murmur_engine::{Notice, Reply};
use serde::{Deserialize, Serialize};

/// First message a client sends to identify itself.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientHello {
    #[serde(rename = "hello")]
    Hello { user_id: String },
}

/// Everything a client may send after the hello.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "chat")]
    Chat,

    #[serde(rename = "cancel")]
    Cancel,

    #[serde(rename = "stop")]
    Stop,

    #[serde(rename = "message")]
    Message { text: String },
}

/// Messages the relay sends back to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "waiting")]
    Waiting { position: usize },

    #[serde(rename = "left_queue")]
    LeftQueue,

    #[serde(rename = "chat_ended")]
    ChatEnded,

    /// Pushed by the engine: partner found, stranger message, partner gone.
    #[serde(rename = "notice")]
    Notice { notice: Notice, text: String },

    #[serde(rename = "error")]
    Error { code: &'static str, message: String },
}

impl ServerFrame {
    pub fn notice(notice: Notice) -> Self {
        let text = notice.text();
        ServerFrame::Notice { notice, text }
    }

    /// Frame answering the command's issuer. `None` when the engine already
    /// told the user through a notice (pairing) or nothing needs saying.
    pub fn from_reply(reply: Reply) -> Option<Self> {
        match reply {
            Reply::Waiting { position } => Some(ServerFrame::Waiting { position }),
            Reply::LeftQueue => Some(ServerFrame::LeftQueue),
            Reply::ChatEnded => Some(ServerFrame::ChatEnded),
            Reply::Paired { .. } | Reply::Delivered => None,
        }
    }

    pub fn from_error(err: &EngineError) -> Self {
        let code = match err {
            EngineError::AlreadyWaiting => "already_waiting",
            EngineError::AlreadyInSession => "already_in_session",
            EngineError::NotInSession => "not_in_session",
            EngineError::NotActive => "not_active",
            EngineError::DeliveryFailure => "delivery_failed",
            EngineError::Timeout => "timeout",
            EngineError::InvalidTransition(_) => "invalid_transition",
            EngineError::Snapshot(_) => "internal",
        };
        ServerFrame::Error {
            code,
            message: err.to_string(),
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        ServerFrame::Error {
            code,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello() {
        let hello: ClientHello =
            serde_json::from_str(r#"{"type":"hello","user_id":"42"}"#).unwrap();
        let ClientHello::Hello { user_id } = hello;
        assert_eq!(user_id, "42");
    }

    #[test]
    fn parses_client_frames() {
        assert!(matches!(
            serde_json::from_str::<ClientFrame>(r#"{"type":"chat"}"#).unwrap(),
            ClientFrame::Chat
        ));
        assert!(matches!(
            serde_json::from_str::<ClientFrame>(r#"{"type":"message","text":"hey"}"#).unwrap(),
            ClientFrame::Message { ref text } if text == "hey"
        ));
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"add_premium"}"#).is_err());
    }

    #[test]
    fn notice_frame_carries_text_only() {
        let json = ServerFrame::notice(Notice::Message { text: "hi".into() })
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"type":"notice","notice":{"kind":"message","text":"hi"},"text":"Stranger: hi"}"#
        );
    }

    #[test]
    fn replies_map_to_frames() {
        assert!(matches!(
            ServerFrame::from_reply(Reply::Waiting { position: 2 }),
            Some(ServerFrame::Waiting { position: 2 })
        ));
        assert!(ServerFrame::from_reply(Reply::Delivered).is_none());
    }

    #[test]
    fn errors_get_stable_codes() {
        let json = ServerFrame::from_error(&EngineError::NotInSession)
            .to_json()
            .unwrap();
        assert!(json.contains(r#""code":"not_in_session""#));
    }
}
