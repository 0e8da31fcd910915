//! Anonymous pairing and relay engine.
//!
//! Matches strangers into two-party chat sessions, forwards their messages
//! without revealing who sent them, and tears sessions down when either side
//! leaves or becomes unreachable.
//!
//! - [`WaitingPool`]: tiered FIFO of users waiting for a partner.
//! - [`SessionDirectory`]: symmetric user ↔ user session relation.
//! - [`Engine`]: pairing, relay and lifecycle operations over both, behind
//!   a single lock.
//! - [`Notifier`]: the transport seam the engine delivers through.

pub mod command;
pub mod directory;
pub mod engine;
pub mod notifier;
pub mod pool;
pub mod snapshot;
pub mod state;

pub use command::{Command, Reply};
pub use directory::{ChatSession, SessionDirectory};
pub use engine::{Engine, EngineConfig, PairingOutcome, StopOutcome};
pub use notifier::{Notice, Notifier};
pub use pool::{WaitingEntry, WaitingPool};
pub use snapshot::{JsonFileStore, Snapshot, SnapshotStore, SNAPSHOT_VERSION};
pub use state::{EngineState, UserStats};
