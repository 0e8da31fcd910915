pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, DeliveryError, EngineError, MurmurError};
pub use events::{EndReason, EngineEvent, EventBus};
pub use id::{new_id, SessionId, UserId};
pub use types::{Tier, UserState};

pub type Result<T> = std::result::Result<T, MurmurError>;
