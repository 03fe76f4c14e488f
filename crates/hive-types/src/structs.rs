//! Read-only views of live host objects.
//!
//! These mirror what the host exposes each tick. They are looked up by
//! identifier every time they are needed and never cached across a tick,
//! since the underlying object may disappear between ticks without notice.

use serde::{Deserialize, Serialize};

use crate::enums::{BodyPart, NodeKind, ResourceKind, StructureKind};
use crate::ids::{ObjectId, RoomName};

/// Width and height of a room grid.
pub const ROOM_SIZE: u8 = 50;

/// A tile inside a room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Room the tile belongs to.
    pub room: RoomName,
    /// Column, `0..50`.
    pub x: u8,
    /// Row, `0..50`.
    pub y: u8,
}

impl Position {
    /// Create a position.
    pub fn new(room: impl Into<RoomName>, x: u8, y: u8) -> Self {
        Self {
            room: room.into(),
            x,
            y,
        }
    }

    /// Chebyshev distance to `other`, or `u32::MAX` across rooms.
    pub fn range_to(&self, other: &Self) -> u32 {
        if self.room != other.room {
            return u32::MAX;
        }
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        u32::from(dx.max(dy))
    }

    /// Whether `other` is within `range` tiles.
    pub fn in_range_to(&self, other: &Self, range: u32) -> bool {
        self.range_to(other) <= range
    }

    /// The tile one step closer to `target`, or `self` if already there or
    /// in another room.
    pub fn step_toward(&self, target: &Self) -> Self {
        if self.room != target.room {
            return self.clone();
        }
        Self {
            room: self.room.clone(),
            x: step(self.x, target.x),
            y: step(self.y, target.y),
        }
    }
}

const fn step(from: u8, to: u8) -> u8 {
    if from < to {
        from.saturating_add(1)
    } else if from > to {
        from.saturating_sub(1)
    } else {
        from
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{} {},{}]", self.room, self.x, self.y)
    }
}

/// An energy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Store {
    /// Energy currently held.
    pub energy: u32,
    /// Maximum energy the store can hold.
    pub capacity: u32,
}

impl Store {
    /// Create a store.
    pub const fn new(energy: u32, capacity: u32) -> Self {
        Self { energy, capacity }
    }

    /// Energy held.
    pub const fn used(&self) -> u32 {
        self.energy
    }

    /// Room left before the store is full.
    pub const fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.energy)
    }

    /// Whether no more energy fits.
    pub const fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Whether nothing is held.
    pub const fn is_empty(&self) -> bool {
        self.energy == 0
    }
}

/// A live unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creep {
    /// Unique name, chosen at spawn time.
    pub name: String,
    /// Current tile.
    pub pos: Position,
    /// Loadout.
    pub body: Vec<BodyPart>,
    /// Carried energy.
    pub store: Store,
    /// Ticks until the unit expires.
    pub ticks_to_live: u32,
    /// Whether the unit is still being spawned.
    pub spawning: bool,
}

impl Creep {
    /// Number of parts of the given kind.
    pub fn parts(&self, part: BodyPart) -> u32 {
        let count = self.body.iter().filter(|p| **p == part).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// A built structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    /// Object id.
    pub id: ObjectId,
    /// Structure kind.
    pub kind: StructureKind,
    /// Tile it stands on.
    pub pos: Position,
    /// Current hit points.
    pub hits: u32,
    /// Maximum hit points.
    pub hits_max: u32,
    /// Energy store, if the structure has one.
    pub store: Option<Store>,
}

impl Structure {
    /// Free energy capacity, zero for structures without a store.
    pub fn free_capacity(&self) -> u32 {
        self.store.map_or(0, |s| s.free())
    }

    /// Stored energy, zero for structures without a store.
    pub fn stored_energy(&self) -> u32 {
        self.store.map_or(0, |s| s.used())
    }
}

/// A harvestable node: source, mineral or deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Object id.
    pub id: ObjectId,
    /// Node kind.
    pub kind: NodeKind,
    /// Tile it occupies.
    pub pos: Position,
    /// Units left before regeneration.
    pub amount: u32,
    /// Units restored on regeneration.
    pub capacity: u32,
}

/// A resource pile lying on the ground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedResource {
    /// Object id.
    pub id: ObjectId,
    /// Resource type.
    pub resource: ResourceKind,
    /// Tile it lies on.
    pub pos: Position,
    /// Amount in the pile.
    pub amount: u32,
}

/// An outstanding construction job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionSite {
    /// Object id.
    pub id: ObjectId,
    /// Structure it will become.
    pub kind: StructureKind,
    /// Tile it occupies.
    pub pos: Position,
    /// Progress made so far.
    pub progress: u32,
    /// Progress required to finish.
    pub progress_total: u32,
}

impl ConstructionSite {
    /// Outstanding build progress.
    pub const fn remaining(&self) -> u32 {
        self.progress_total.saturating_sub(self.progress)
    }
}

/// A spawning facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawn {
    /// Spawn name, unique across the host.
    pub name: String,
    /// Object id of the underlying structure.
    pub id: ObjectId,
    /// Tile it stands on.
    pub pos: Position,
    /// Name of the unit currently being spawned, if any.
    pub spawning: Option<String>,
}

impl Spawn {
    /// Whether the facility can accept a spawn request.
    pub const fn is_idle(&self) -> bool {
        self.spawning.is_none()
    }
}

/// A room's control structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    /// Object id.
    pub id: ObjectId,
    /// Tile it stands on.
    pub pos: Position,
    /// Control level, 0 when unowned.
    pub level: u8,
    /// Whether the controlling party owns it.
    pub my: bool,
    /// Upgrade progress toward the next level.
    pub progress: u32,
}

/// A visible room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Room name.
    pub name: RoomName,
    /// Control structure, absent in highway rooms.
    pub controller: Option<Controller>,
    /// Bulk storage structure id, if built.
    pub storage: Option<ObjectId>,
}

impl Room {
    /// Control level, 0 when there is no owned controller.
    pub fn control_level(&self) -> u8 {
        self.controller.as_ref().map_or(0, |c| c.level)
    }

    /// Whether the controlling party owns this room.
    pub fn is_owned(&self) -> bool {
        self.controller.as_ref().is_some_and(|c| c.my)
    }
}
