//! Error types for the `hive-world` crate.
//!
//! Only world construction can fail. Action primitives report outcomes as
//! [`ActionStatus`] codes instead.
//!
//! [`ActionStatus`]: hive_types::ActionStatus

use hive_types::{ObjectId, RoomName};

/// Errors that can occur while assembling a [`SimWorld`].
///
/// [`SimWorld`]: crate::sim::SimWorld
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An object was placed in a room that was never added.
    #[error("room not found: {0}")]
    RoomNotFound(RoomName),

    /// An object id was inserted twice.
    #[error("duplicate object id: {0}")]
    DuplicateObject(ObjectId),

    /// A unit or spawn name was inserted twice.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A position lies outside the room grid.
    #[error("position ({x}, {y}) is outside the room grid")]
    OutOfBounds {
        /// Column.
        x: u8,
        /// Row.
        y: u8,
    },
}
