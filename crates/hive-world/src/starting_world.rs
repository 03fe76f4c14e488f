//! Starting world for simulation runs.
//!
//! One owned room, `W1N1`, at control level 2:
//!
//! ```text
//!        0         10        20        30        40
//!   5   .  .  .  S1 .  .  .  .  .  .  .  .  .  .  .   S1 = source
//!  10   .  .  .  .  .  .  .  .  .  .  .  .  .  .  .
//!  20   .  .  .  .  .  E  Sp E  .  .  .  .  .  .  .   Sp = Spawn1, E = extension
//!  25   .  .  .  .  .  .  .  .  C  .  .  .  .  .  .   C = controller
//!  40   .  .  .  .  .  .  .  .  .  .  .  S2 .  M  .   M = mineral
//! ```
//!
//! A damaged road and a pending extension site give builders something to
//! do from the first tick.

use hive_types::{NodeKind, Position, StructureKind};
use tracing::info;

use crate::error::WorldError;
use crate::sim::SimWorld;

/// Name of the starting room.
pub const STARTING_ROOM: &str = "W1N1";

/// Name of the starting spawn.
pub const STARTING_SPAWN: &str = "Spawn1";

/// Energy capacity of each source.
pub const SOURCE_CAPACITY: u32 = 3_000;

/// Amount held by the mineral deposit.
pub const MINERAL_CAPACITY: u32 = 70_000;

fn at(x: u8, y: u8) -> Position {
    Position::new(STARTING_ROOM, x, y)
}

/// Build the starting world.
pub fn create_starting_world() -> Result<SimWorld, WorldError> {
    let mut world = SimWorld::new();

    world.add_owned_room(STARTING_ROOM, 2, (25, 25))?;
    world.add_spawn(STARTING_SPAWN, at(20, 20), 300)?;
    world.add_built(StructureKind::Extension, at(18, 20))?;
    world.add_built(StructureKind::Extension, at(22, 20))?;

    world.add_node(NodeKind::Source, at(10, 5), SOURCE_CAPACITY)?;
    world.add_node(NodeKind::Source, at(35, 40), SOURCE_CAPACITY)?;
    world.add_node(NodeKind::Mineral, at(42, 40), MINERAL_CAPACITY)?;

    world.add_structure(StructureKind::Road, at(21, 21), 1_000, 5_000, None)?;
    world.add_site(StructureKind::Extension, at(20, 18), 3_000)?;

    info!(room = STARTING_ROOM, spawn = STARTING_SPAWN, "Starting world created");
    Ok(world)
}
