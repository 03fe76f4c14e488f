//! The host boundary.
//!
//! The scheduler core never owns simulation state. Every tick it reads live
//! objects through a [`Host`] by identifier, asks the host to perform
//! fire-and-forget actions, and reads/writes one opaque memory blob. A
//! production host wraps the game API; [`SimWorld`] is a deterministic
//! in-memory implementation.
//!
//! Lookups return `None` for anything that no longer exists. Callers treat
//! that as "recompute" or "drop", never as an error.
//!
//! [`SimWorld`]: crate::sim::SimWorld

use hive_types::{
    ActionStatus, BodyPart, ConstructionSite, Creep, CreepMemory, DroppedResource, ObjectId,
    Position, ResourceNode, Room, RoomName, Spawn, Structure,
};

/// Range of harvest, pickup, withdraw and transfer.
pub const ADJACENT_RANGE: u32 = 1;

/// Range of build, repair and upgrade.
pub const WORK_RANGE: u32 = 3;

/// Live simulation state and action primitives, as provided by the host.
pub trait Host {
    // ---------------------------------------------------------------
    // Live state
    // ---------------------------------------------------------------

    /// Current tick counter. Monotonically increasing.
    fn time(&self) -> u64;

    /// A visible room by name.
    fn room(&self, name: &RoomName) -> Option<&Room>;

    /// Names of every room whose controller the controlling party owns.
    fn owned_rooms(&self) -> Vec<RoomName>;

    /// A live unit by name.
    fn creep(&self, name: &str) -> Option<&Creep>;

    /// A structure by id.
    fn structure(&self, id: &ObjectId) -> Option<&Structure>;

    /// A source, mineral or deposit by id.
    fn resource_node(&self, id: &ObjectId) -> Option<&ResourceNode>;

    /// A dropped resource pile by id.
    fn dropped_resource(&self, id: &ObjectId) -> Option<&DroppedResource>;

    /// A construction site by id.
    fn construction_site(&self, id: &ObjectId) -> Option<&ConstructionSite>;

    /// Every structure in a room.
    fn structures_in(&self, room: &RoomName) -> Vec<&Structure>;

    /// Every source, mineral and deposit in a room.
    fn resource_nodes_in(&self, room: &RoomName) -> Vec<&ResourceNode>;

    /// Every dropped resource pile in a room.
    fn dropped_resources_in(&self, room: &RoomName) -> Vec<&DroppedResource>;

    /// Every construction site owned by the controlling party.
    fn construction_sites(&self) -> Vec<&ConstructionSite>;

    /// Every spawning facility in a room.
    fn spawns_in(&self, room: &RoomName) -> Vec<&Spawn>;

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    /// The persisted memory blob as last written. Empty on first activation.
    fn raw_memory(&self) -> &str;

    /// Replace the persisted memory blob.
    fn set_raw_memory(&mut self, blob: String);

    // ---------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------

    /// Move one step toward a position.
    fn move_to(&mut self, creep: &str, target: &Position) -> ActionStatus;

    /// Harvest a source, mineral or deposit.
    fn harvest(&mut self, creep: &str, node: &ObjectId) -> ActionStatus;

    /// Pick up a dropped pile.
    fn pickup(&mut self, creep: &str, pile: &ObjectId) -> ActionStatus;

    /// Withdraw energy from a structure.
    fn withdraw(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus;

    /// Transfer carried energy into a structure.
    fn transfer(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus;

    /// Spend carried energy on a construction site.
    fn build(&mut self, creep: &str, site: &ObjectId) -> ActionStatus;

    /// Spend carried energy repairing a structure.
    fn repair(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus;

    /// Spend carried energy on a room's controller.
    fn upgrade_controller(&mut self, creep: &str, room: &RoomName) -> ActionStatus;

    /// Ask a spawning facility to create a unit.
    fn spawn_creep(
        &mut self,
        spawn: &str,
        parts: &[BodyPart],
        name: &str,
        memory: &CreepMemory,
    ) -> ActionStatus;
}
