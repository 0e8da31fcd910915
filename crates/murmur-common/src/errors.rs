use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Why a notifier could not hand a notice to a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("recipient unreachable: {0}")]
    Unreachable(String),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Typed results of pairing, relay and lifecycle operations.
///
/// None of these are fatal. `DeliveryFailure` and `Timeout` are reported after
/// the affected session has already been torn down; the rest leave state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("user is already waiting for a partner")]
    AlreadyWaiting,

    #[error("user is already in a chat session")]
    AlreadyInSession,

    #[error("user is not in a chat session")]
    NotInSession,

    #[error("user is not waiting or chatting")]
    NotActive,

    #[error("message could not be delivered to the partner")]
    DeliveryFailure,

    #[error("delivery timed out")]
    Timeout,

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<DeliveryError> for EngineError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Unreachable(_) => EngineError::DeliveryFailure,
            DeliveryError::Timeout(_) => EngineError::Timeout,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MurmurError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),
}
