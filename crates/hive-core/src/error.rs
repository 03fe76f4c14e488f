//! Error types for the `hive-core` crate.
//!
//! Scheduling has exactly one class of fatal error: a colony whose primary
//! room is not actually owned (or cannot be seen) cannot schedule anything.
//! Everything else the host reports is transient and handled by re-running
//! the same decisions next tick. [`ConfigError`] lives with the config
//! loader.
//!
//! [`ConfigError`]: crate::config::ConfigError

use hive_types::{Role, RoomName};

/// Fatal configuration errors raised while scheduling a colony.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The primary room's control level is 0.
    #[error("room {room} is at level 0, maybe it's not owned")]
    NotOwned {
        /// Primary room of the colony.
        room: RoomName,
    },

    /// The primary room is not visible this tick.
    #[error("room {room} not found")]
    RoomNotVisible {
        /// Primary room of the colony.
        room: RoomName,
    },

    /// A scheduler needing a room was initialized without one.
    #[error("cannot initialize {role} scheduler without a room name")]
    MissingRoomName {
        /// Role of the scheduler being initialized.
        role: Role,
    },
}

/// Errors reading or writing the persisted memory blob.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The blob is not a valid snapshot.
    #[error("failed to parse persisted state: {source}")]
    Parse {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The snapshot could not be encoded.
    #[error("failed to serialize persisted state: {source}")]
    Serialize {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Errors that abort a whole [`Hive::tick`](crate::hive::Hive::tick).
///
/// Per-colony scheduling failures never surface here; they are logged and
/// the remaining colonies still run.
#[derive(Debug, thiserror::Error)]
pub enum HiveError {
    /// The persisted state could not be loaded or saved.
    #[error("state store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}
