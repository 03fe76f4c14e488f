//! Host boundary and simulated world for the Hive colony scheduler.
//!
//! The scheduler core talks to the game only through the [`Host`] trait.
//! This crate defines that trait, the repair-points policy that builders
//! use to judge structure health, and [`SimWorld`], a deterministic
//! in-memory host used by the engine binary and the test suites.
//!
//! # Modules
//!
//! - [`host`] -- The [`Host`] trait and interaction ranges
//! - [`structure`] -- Repair-points policy per structure kind and level
//! - [`sim`] -- In-memory [`Host`] implementation
//! - [`starting_world`] -- Seed world for simulation runs
//! - [`error`] -- World construction errors

pub mod error;
pub mod host;
pub mod sim;
pub mod starting_world;
pub mod structure;

pub use error::WorldError;
pub use host::{ADJACENT_RANGE, Host, WORK_RANGE};
pub use sim::{ActionKind, ActionRecord, SimWorld};
pub use starting_world::{STARTING_ROOM, STARTING_SPAWN, create_starting_world};
pub use structure::{needs_repair, repair_points};
