//! Deterministic in-memory host.
//!
//! [`SimWorld`] implements [`Host`] over plain `BTreeMap`s so the scheduler
//! core can be exercised without a game server. It models just enough of
//! the game to make the schedulers' decisions observable:
//!
//! - spawning costs energy from spawns and extensions, and a requested unit
//!   appears on the next tick, still spawning for 3 ticks per body part;
//! - harvesting yields 2 energy per work part; whatever the unit cannot
//!   carry falls into a container on its tile or onto a dropped pile;
//! - build, repair and upgrade spend carried energy at the usual rates;
//! - units age and expire, sources regenerate every 300 ticks, spawns
//!   trickle energy while the room is below 300.
//!
//! Every action attempted during the current tick is recorded in an
//! [`ActionRecord`] log that [`SimWorld::advance`] clears.

use std::collections::{BTreeMap, BTreeSet};

use hive_types::{
    ActionStatus, BodyPart, ConstructionSite, Controller, Creep, CreepMemory, DroppedResource,
    NodeKind, ObjectId, Position, ROOM_SIZE, ResourceKind, ResourceNode, Room, RoomName, Spawn,
    Store, Structure, StructureKind,
};
use tracing::debug;

use crate::error::WorldError;
use crate::host::{ADJACENT_RANGE, Host, WORK_RANGE};

/// Energy harvested per work part per tick.
pub const HARVEST_POWER: u32 = 2;

/// Build progress per work part per tick.
pub const BUILD_POWER: u32 = 5;

/// Hit points restored per work part per tick.
pub const REPAIR_POWER: u32 = 100;

/// Carry capacity per carry part.
pub const CARRY_CAPACITY: u32 = 50;

/// Ticks spent spawning per body part.
pub const SPAWN_TIME_PER_PART: u32 = 3;

/// Lifetime of a freshly spawned unit.
pub const CREEP_LIFE_TIME: u32 = 1_500;

/// Ticks between source regenerations.
pub const REGEN_INTERVAL: u64 = 300;

/// Room energy below which spawns regenerate on their own.
pub const SPAWN_ENERGY_FLOOR: u32 = 300;

/// Energy capacity of a spawn.
pub const SPAWN_ENERGY_CAPACITY: u32 = 300;

/// Progress needed to leave each control level, starting at level 1.
pub const CONTROLLER_LEVELS: [u32; 7] = [
    200, 45_000, 135_000, 405_000, 1_215_000, 3_645_000, 10_935_000,
];

/// Which primitive an [`ActionRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// `move_to`.
    Move,
    /// `harvest`.
    Harvest,
    /// `pickup`.
    Pickup,
    /// `withdraw`.
    Withdraw,
    /// `transfer`.
    Transfer,
    /// `build`.
    Build,
    /// `repair`.
    Repair,
    /// `upgrade_controller`.
    Upgrade,
    /// `spawn_creep`.
    Spawn,
}

/// One attempted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Acting unit, or the spawn for [`ActionKind::Spawn`].
    pub actor: String,
    /// Primitive invoked.
    pub kind: ActionKind,
    /// Target id, room, position or requested unit name.
    pub target: String,
    /// Outcome reported to the caller.
    pub status: ActionStatus,
}

/// Hit points and store of a freshly completed structure.
fn blueprint(kind: StructureKind) -> (u32, u32, Option<Store>) {
    match kind {
        StructureKind::Spawn => (5_000, 5_000, Some(Store::new(0, SPAWN_ENERGY_CAPACITY))),
        StructureKind::Extension => (1_000, 1_000, Some(Store::new(0, 50))),
        StructureKind::Road => (5_000, 5_000, None),
        StructureKind::Wall => (1, 300_000_000, None),
        StructureKind::Rampart => (1, 300_000, None),
        StructureKind::Container => (250_000, 250_000, Some(Store::new(0, 2_000))),
        StructureKind::Storage => (10_000, 10_000, Some(Store::new(0, 1_000_000))),
        StructureKind::Tower => (3_000, 3_000, Some(Store::new(0, 1_000))),
        StructureKind::Terminal => (3_000, 3_000, Some(Store::new(0, 300_000))),
        StructureKind::Extractor => (500, 500, None),
        StructureKind::InvaderCore => (100_000, 100_000, None),
    }
}

/// In-memory world implementing [`Host`].
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    time: u64,
    rooms: BTreeMap<RoomName, Room>,
    creeps: BTreeMap<String, Creep>,
    /// Units requested this tick; they appear on the next [`advance`].
    ///
    /// [`advance`]: SimWorld::advance
    pending: Vec<Creep>,
    /// Remaining spawn time of units still spawning, keyed by unit name.
    spawn_timers: BTreeMap<String, u32>,
    memories: BTreeMap<String, CreepMemory>,
    structures: BTreeMap<ObjectId, Structure>,
    nodes: BTreeMap<ObjectId, ResourceNode>,
    dropped: BTreeMap<ObjectId, DroppedResource>,
    sites: BTreeMap<ObjectId, ConstructionSite>,
    spawns: BTreeMap<String, Spawn>,
    memory: String,
    moved: BTreeSet<String>,
    log: Vec<ActionRecord>,
    next_id: u64,
}

impl SimWorld {
    /// Create an empty world at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world at the given tick.
    pub fn at_time(time: u64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    fn allocate_id(&mut self, prefix: &str) -> ObjectId {
        self.next_id = self.next_id.saturating_add(1);
        ObjectId::new(format!("{prefix}{:06x}", self.next_id))
    }

    fn check_position(&self, pos: &Position) -> Result<(), WorldError> {
        if pos.x >= ROOM_SIZE || pos.y >= ROOM_SIZE {
            return Err(WorldError::OutOfBounds { x: pos.x, y: pos.y });
        }
        if !self.rooms.contains_key(&pos.room) {
            return Err(WorldError::RoomNotFound(pos.room.clone()));
        }
        Ok(())
    }

    /// Add a room without a controller.
    pub fn add_room(&mut self, name: impl Into<RoomName>) -> Result<(), WorldError> {
        let name = name.into();
        if self.rooms.contains_key(&name) {
            return Err(WorldError::DuplicateName(name.into_inner()));
        }
        self.rooms.insert(
            name.clone(),
            Room {
                name,
                controller: None,
                storage: None,
            },
        );
        Ok(())
    }

    /// Add a room with an owned controller at the given tile. Returns the
    /// controller id.
    pub fn add_owned_room(
        &mut self,
        name: impl Into<RoomName>,
        level: u8,
        controller: (u8, u8),
    ) -> Result<ObjectId, WorldError> {
        let name = name.into();
        self.add_room(name.clone())?;
        let pos = Position::new(name.clone(), controller.0, controller.1);
        self.check_position(&pos)?;
        let id = self.allocate_id("ctrl");
        if let Some(room) = self.rooms.get_mut(&name) {
            room.controller = Some(Controller {
                id: id.clone(),
                pos,
                level,
                my: true,
                progress: 0,
            });
        }
        Ok(id)
    }

    /// Change a room's control level.
    pub fn set_control_level(&mut self, room: &RoomName, level: u8) {
        if let Some(controller) = self.rooms.get_mut(room).and_then(|r| r.controller.as_mut()) {
            controller.level = level;
        }
    }

    /// Change whether the controlling party owns a room.
    pub fn set_owned(&mut self, room: &RoomName, my: bool) {
        if let Some(controller) = self.rooms.get_mut(room).and_then(|r| r.controller.as_mut()) {
            controller.my = my;
        }
    }

    /// Add a structure with explicit hit points and store.
    pub fn add_structure(
        &mut self,
        kind: StructureKind,
        pos: Position,
        hits: u32,
        hits_max: u32,
        store: Option<Store>,
    ) -> Result<ObjectId, WorldError> {
        self.check_position(&pos)?;
        let id = self.allocate_id("st");
        if kind == StructureKind::Storage
            && let Some(room) = self.rooms.get_mut(&pos.room)
        {
            room.storage = Some(id.clone());
        }
        self.structures.insert(
            id.clone(),
            Structure {
                id: id.clone(),
                kind,
                pos,
                hits,
                hits_max,
                store,
            },
        );
        Ok(id)
    }

    /// Add a structure in its freshly built state.
    pub fn add_built(&mut self, kind: StructureKind, pos: Position) -> Result<ObjectId, WorldError> {
        let (hits, hits_max, store) = blueprint(kind);
        self.add_structure(kind, pos, hits, hits_max, store)
    }

    /// Add a spawning facility holding `energy`.
    pub fn add_spawn(
        &mut self,
        name: &str,
        pos: Position,
        energy: u32,
    ) -> Result<ObjectId, WorldError> {
        if self.spawns.contains_key(name) {
            return Err(WorldError::DuplicateName(name.to_owned()));
        }
        let (hits, hits_max, _) = blueprint(StructureKind::Spawn);
        let store = Store::new(energy.min(SPAWN_ENERGY_CAPACITY), SPAWN_ENERGY_CAPACITY);
        let id = self.add_structure(StructureKind::Spawn, pos.clone(), hits, hits_max, Some(store))?;
        self.spawns.insert(
            name.to_owned(),
            Spawn {
                name: name.to_owned(),
                id: id.clone(),
                pos,
                spawning: None,
            },
        );
        Ok(id)
    }

    /// Add a full source, mineral or deposit.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        pos: Position,
        capacity: u32,
    ) -> Result<ObjectId, WorldError> {
        self.check_position(&pos)?;
        let id = self.allocate_id("node");
        self.nodes.insert(
            id.clone(),
            ResourceNode {
                id: id.clone(),
                kind,
                pos,
                amount: capacity,
                capacity,
            },
        );
        Ok(id)
    }

    /// Add a dropped pile.
    pub fn add_dropped(
        &mut self,
        resource: ResourceKind,
        pos: Position,
        amount: u32,
    ) -> Result<ObjectId, WorldError> {
        self.check_position(&pos)?;
        let id = self.allocate_id("pile");
        self.dropped.insert(
            id.clone(),
            DroppedResource {
                id: id.clone(),
                resource,
                pos,
                amount,
            },
        );
        Ok(id)
    }

    /// Add a construction site with no progress.
    pub fn add_site(
        &mut self,
        kind: StructureKind,
        pos: Position,
        progress_total: u32,
    ) -> Result<ObjectId, WorldError> {
        self.check_position(&pos)?;
        let id = self.allocate_id("site");
        self.sites.insert(
            id.clone(),
            ConstructionSite {
                id: id.clone(),
                kind,
                pos,
                progress: 0,
                progress_total,
            },
        );
        Ok(id)
    }

    /// Add a fully spawned unit.
    pub fn add_creep(&mut self, creep: Creep) -> Result<(), WorldError> {
        self.check_position(&creep.pos)?;
        if self.creeps.contains_key(&creep.name) {
            return Err(WorldError::DuplicateName(creep.name));
        }
        self.creeps.insert(creep.name.clone(), creep);
        Ok(())
    }

    /// Build a fully spawned unit with the given loadout at `pos`.
    pub fn creep_with(name: &str, body: &[BodyPart], pos: Position) -> Creep {
        let carry = u32::try_from(body.iter().filter(|p| **p == BodyPart::Carry).count())
            .unwrap_or(u32::MAX);
        Creep {
            name: name.to_owned(),
            pos,
            body: body.to_vec(),
            store: Store::new(0, carry.saturating_mul(CARRY_CAPACITY)),
            ticks_to_live: CREEP_LIFE_TIME,
            spawning: false,
        }
    }

    /// Remove a unit as if it had died.
    pub fn kill_creep(&mut self, name: &str) -> Option<Creep> {
        self.memories.remove(name);
        self.spawn_timers.remove(name);
        self.creeps.remove(name)
    }

    /// Mutable access to a unit, for test setup.
    pub fn creep_mut(&mut self, name: &str) -> Option<&mut Creep> {
        self.creeps.get_mut(name)
    }

    /// Mutable access to a structure, for test setup.
    pub fn structure_mut(&mut self, id: &ObjectId) -> Option<&mut Structure> {
        self.structures.get_mut(id)
    }

    /// Remove a structure as if it had been destroyed.
    pub fn destroy_structure(&mut self, id: &ObjectId) -> Option<Structure> {
        let removed = self.structures.remove(id);
        if let Some(structure) = &removed
            && let Some(room) = self.rooms.get_mut(&structure.pos.room)
            && room.storage.as_ref() == Some(id)
        {
            room.storage = None;
        }
        removed
    }

    /// Remove a dropped pile.
    pub fn remove_dropped(&mut self, id: &ObjectId) -> Option<DroppedResource> {
        self.dropped.remove(id)
    }

    // -----------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------

    /// Actions attempted since the last [`advance`](Self::advance).
    pub fn action_log(&self) -> &[ActionRecord] {
        &self.log
    }

    /// Memory attached to a unit when it was requested.
    pub fn creep_memory(&self, name: &str) -> Option<&CreepMemory> {
        self.memories.get(name)
    }

    /// Number of live units, including those still spawning.
    pub fn creep_count(&self) -> usize {
        self.creeps.len()
    }

    /// Names of live units.
    pub fn creep_names(&self) -> Vec<String> {
        self.creeps.keys().cloned().collect()
    }

    /// Energy available for spawning in a room.
    pub fn room_energy(&self, room: &RoomName) -> u32 {
        self.structures
            .values()
            .filter(|s| s.pos.room == *room && s.kind.holds_spawn_energy())
            .fold(0_u32, |acc, s| acc.saturating_add(s.stored_energy()))
    }

    // -----------------------------------------------------------------
    // Tick progression
    // -----------------------------------------------------------------

    /// Advance to the next tick.
    pub fn advance(&mut self) {
        self.time = self.time.saturating_add(1);
        self.moved.clear();
        self.log.clear();

        for creep in std::mem::take(&mut self.pending) {
            self.creeps.insert(creep.name.clone(), creep);
        }

        self.finish_spawning();
        self.age_creeps();
        self.regenerate_spawns();

        if self.time.checked_rem(REGEN_INTERVAL) == Some(0) {
            for node in self.nodes.values_mut() {
                node.amount = node.capacity;
            }
        }
    }

    fn finish_spawning(&mut self) {
        let mut finished = Vec::new();
        for (name, remaining) in &mut self.spawn_timers {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                finished.push(name.clone());
            }
        }
        for name in finished {
            self.spawn_timers.remove(&name);
            if let Some(creep) = self.creeps.get_mut(&name) {
                creep.spawning = false;
            }
            for spawn in self.spawns.values_mut() {
                if spawn.spawning.as_deref() == Some(name.as_str()) {
                    spawn.spawning = None;
                }
            }
        }
    }

    fn age_creeps(&mut self) {
        let mut expired = Vec::new();
        for creep in self.creeps.values_mut().filter(|c| !c.spawning) {
            creep.ticks_to_live = creep.ticks_to_live.saturating_sub(1);
            if creep.ticks_to_live == 0 {
                expired.push(creep.name.clone());
            }
        }
        for name in expired {
            debug!(creep = %name, "Creep expired");
            self.kill_creep(&name);
        }
    }

    fn regenerate_spawns(&mut self) {
        let rooms: Vec<RoomName> = self.rooms.keys().cloned().collect();
        for room in rooms {
            if self.room_energy(&room) >= SPAWN_ENERGY_FLOOR {
                continue;
            }
            for spawn in self.spawns.values() {
                if spawn.pos.room != room {
                    continue;
                }
                if let Some(store) = self
                    .structures
                    .get_mut(&spawn.id)
                    .and_then(|s| s.store.as_mut())
                    && !store.is_full()
                {
                    store.energy = store.energy.saturating_add(1);
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Action helpers
    // -----------------------------------------------------------------

    fn record(
        &mut self,
        actor: &str,
        kind: ActionKind,
        target: impl ToString,
        status: ActionStatus,
    ) -> ActionStatus {
        self.log.push(ActionRecord {
            actor: actor.to_owned(),
            kind,
            target: target.to_string(),
            status,
        });
        status
    }

    /// Resolve an acting unit that is allowed to act this tick.
    fn actor(&self, name: &str) -> Result<&Creep, ActionStatus> {
        match self.creeps.get(name) {
            None => Err(ActionStatus::NotFound),
            Some(creep) if creep.spawning => Err(ActionStatus::Busy),
            Some(creep) => Ok(creep),
        }
    }

    /// Put energy or minerals on a tile, filling a container there first.
    fn drop_at(&mut self, pos: &Position, resource: ResourceKind, amount: u32) {
        let mut left = amount;
        if resource == ResourceKind::Energy
            && let Some(store) = self
                .structures
                .values_mut()
                .find(|s| s.kind == StructureKind::Container && s.pos == *pos)
                .and_then(|s| s.store.as_mut())
        {
            let put = left.min(store.free());
            store.energy = store.energy.saturating_add(put);
            left = left.saturating_sub(put);
        }
        if left == 0 {
            return;
        }
        if let Some(pile) = self
            .dropped
            .values_mut()
            .find(|p| p.pos == *pos && p.resource == resource)
        {
            pile.amount = pile.amount.saturating_add(left);
            return;
        }
        let id = self.allocate_id("pile");
        self.dropped.insert(
            id.clone(),
            DroppedResource {
                id,
                resource,
                pos: pos.clone(),
                amount: left,
            },
        );
    }

    fn complete_site(&mut self, site: &ConstructionSite) {
        let (hits, hits_max, store) = blueprint(site.kind);
        if let Err(err) = self.add_structure(site.kind, site.pos.clone(), hits, hits_max, store) {
            debug!(site = %site.id, error = %err, "Completed site could not be placed");
        }
    }

    fn try_harvest(&mut self, name: &str, node_id: &ObjectId) -> ActionStatus {
        let (pos, work, free) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.parts(BodyPart::Work), c.store.free()),
            Err(status) => return status,
        };
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let Some(node) = self.nodes.get_mut(node_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&node.pos, ADJACENT_RANGE) {
            return ActionStatus::NotInRange;
        }
        if node.amount == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let yielded = work.saturating_mul(HARVEST_POWER).min(node.amount);
        node.amount = node.amount.saturating_sub(yielded);
        let resource = if node.kind == NodeKind::Source {
            ResourceKind::Energy
        } else {
            ResourceKind::Mineral
        };

        let kept = if resource == ResourceKind::Energy {
            yielded.min(free)
        } else {
            0
        };
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_add(kept);
        }
        let overflow = yielded.saturating_sub(kept);
        if overflow > 0 {
            self.drop_at(&pos, resource, overflow);
        }
        ActionStatus::Ok
    }

    fn try_pickup(&mut self, name: &str, pile_id: &ObjectId) -> ActionStatus {
        let (pos, free) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.store.free()),
            Err(status) => return status,
        };
        let Some(pile) = self.dropped.get_mut(pile_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&pile.pos, ADJACENT_RANGE) {
            return ActionStatus::NotInRange;
        }
        if pile.resource != ResourceKind::Energy {
            return ActionStatus::InvalidTarget;
        }
        if free == 0 {
            return ActionStatus::Full;
        }
        let taken = free.min(pile.amount);
        pile.amount = pile.amount.saturating_sub(taken);
        if pile.amount == 0 {
            self.dropped.remove(pile_id);
        }
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_add(taken);
        }
        ActionStatus::Ok
    }

    fn try_withdraw(&mut self, name: &str, structure_id: &ObjectId) -> ActionStatus {
        let (pos, free) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.store.free()),
            Err(status) => return status,
        };
        let Some(structure) = self.structures.get_mut(structure_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&structure.pos, ADJACENT_RANGE) {
            return ActionStatus::NotInRange;
        }
        let Some(store) = structure.store.as_mut() else {
            return ActionStatus::InvalidTarget;
        };
        if store.is_empty() {
            return ActionStatus::NotEnoughResources;
        }
        if free == 0 {
            return ActionStatus::Full;
        }
        let taken = free.min(store.energy);
        store.energy = store.energy.saturating_sub(taken);
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_add(taken);
        }
        ActionStatus::Ok
    }

    fn try_transfer(&mut self, name: &str, structure_id: &ObjectId) -> ActionStatus {
        let (pos, carried) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.store.used()),
            Err(status) => return status,
        };
        let Some(structure) = self.structures.get_mut(structure_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&structure.pos, ADJACENT_RANGE) {
            return ActionStatus::NotInRange;
        }
        let Some(store) = structure.store.as_mut() else {
            return ActionStatus::InvalidTarget;
        };
        if carried == 0 {
            return ActionStatus::NotEnoughResources;
        }
        if store.is_full() {
            return ActionStatus::Full;
        }
        let moved = carried.min(store.free());
        store.energy = store.energy.saturating_add(moved);
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_sub(moved);
        }
        ActionStatus::Ok
    }

    fn try_build(&mut self, name: &str, site_id: &ObjectId) -> ActionStatus {
        let (pos, work, carried) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.parts(BodyPart::Work), c.store.used()),
            Err(status) => return status,
        };
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let Some(site) = self.sites.get_mut(site_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&site.pos, WORK_RANGE) {
            return ActionStatus::NotInRange;
        }
        if carried == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let spent = work
            .saturating_mul(BUILD_POWER)
            .min(carried)
            .min(site.remaining());
        site.progress = site.progress.saturating_add(spent);
        let finished = (site.remaining() == 0).then(|| site.clone());
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_sub(spent);
        }
        if let Some(site) = finished {
            self.sites.remove(site_id);
            self.complete_site(&site);
        }
        ActionStatus::Ok
    }

    fn try_repair(&mut self, name: &str, structure_id: &ObjectId) -> ActionStatus {
        let (pos, work, carried) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.parts(BodyPart::Work), c.store.used()),
            Err(status) => return status,
        };
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let Some(structure) = self.structures.get_mut(structure_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&structure.pos, WORK_RANGE) {
            return ActionStatus::NotInRange;
        }
        if structure.hits >= structure.hits_max {
            return ActionStatus::InvalidTarget;
        }
        if carried == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let spent = work.min(carried);
        let restored = spent
            .saturating_mul(REPAIR_POWER)
            .min(structure.hits_max.saturating_sub(structure.hits));
        structure.hits = structure.hits.saturating_add(restored);
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_sub(spent);
        }
        ActionStatus::Ok
    }

    fn try_upgrade(&mut self, name: &str, room: &RoomName) -> ActionStatus {
        let (pos, work, carried) = match self.actor(name) {
            Ok(c) => (c.pos.clone(), c.parts(BodyPart::Work), c.store.used()),
            Err(status) => return status,
        };
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let Some(controller) = self
            .rooms
            .get_mut(room)
            .and_then(|r| r.controller.as_mut())
            .filter(|c| c.my)
        else {
            return ActionStatus::InvalidTarget;
        };
        if !pos.in_range_to(&controller.pos, WORK_RANGE) {
            return ActionStatus::NotInRange;
        }
        if carried == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let spent = work.min(carried);
        controller.progress = controller.progress.saturating_add(spent);
        let index = usize::from(controller.level.saturating_sub(1));
        if let Some(&needed) = CONTROLLER_LEVELS.get(index)
            && controller.progress >= needed
        {
            controller.progress = controller.progress.saturating_sub(needed);
            controller.level = controller.level.saturating_add(1);
            debug!(room = %room, level = controller.level, "Controller leveled up");
        }
        if let Some(creep) = self.creeps.get_mut(name) {
            creep.store.energy = creep.store.energy.saturating_sub(spent);
        }
        ActionStatus::Ok
    }

    fn try_spawn(
        &mut self,
        spawn_name: &str,
        parts: &[BodyPart],
        name: &str,
        memory: &CreepMemory,
    ) -> ActionStatus {
        let Some(spawn) = self.spawns.get(spawn_name) else {
            return ActionStatus::NotFound;
        };
        if !spawn.is_idle() {
            return ActionStatus::Busy;
        }
        if parts.is_empty() {
            return ActionStatus::NoBodyPart;
        }
        if self.creeps.contains_key(name) || self.pending.iter().any(|c| c.name == name) {
            return ActionStatus::NameExists;
        }
        let room = spawn.pos.room.clone();
        let pos = spawn.pos.clone();
        let cost = BodyPart::body_cost(parts);
        if self.room_energy(&room) < cost {
            return ActionStatus::NotEnoughResources;
        }

        // Drain spawns first, then extensions, in id order.
        let mut owed = cost;
        for kind in [StructureKind::Spawn, StructureKind::Extension] {
            for structure in self
                .structures
                .values_mut()
                .filter(|s| s.pos.room == room && s.kind == kind)
            {
                if let Some(store) = structure.store.as_mut() {
                    let taken = owed.min(store.energy);
                    store.energy = store.energy.saturating_sub(taken);
                    owed = owed.saturating_sub(taken);
                }
            }
        }

        let mut creep = Self::creep_with(name, parts, pos);
        creep.spawning = true;
        let part_count = u32::try_from(parts.len()).unwrap_or(u32::MAX);
        self.spawn_timers.insert(
            name.to_owned(),
            part_count.saturating_mul(SPAWN_TIME_PER_PART),
        );
        self.memories.insert(name.to_owned(), *memory);
        self.pending.push(creep);
        if let Some(spawn) = self.spawns.get_mut(spawn_name) {
            spawn.spawning = Some(name.to_owned());
        }
        ActionStatus::Ok
    }
}

impl Host for SimWorld {
    fn time(&self) -> u64 {
        self.time
    }

    fn room(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    fn owned_rooms(&self) -> Vec<RoomName> {
        self.rooms
            .values()
            .filter(|r| r.is_owned())
            .map(|r| r.name.clone())
            .collect()
    }

    fn creep(&self, name: &str) -> Option<&Creep> {
        self.creeps.get(name)
    }

    fn structure(&self, id: &ObjectId) -> Option<&Structure> {
        self.structures.get(id)
    }

    fn resource_node(&self, id: &ObjectId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    fn dropped_resource(&self, id: &ObjectId) -> Option<&DroppedResource> {
        self.dropped.get(id)
    }

    fn construction_site(&self, id: &ObjectId) -> Option<&ConstructionSite> {
        self.sites.get(id)
    }

    fn structures_in(&self, room: &RoomName) -> Vec<&Structure> {
        self.structures
            .values()
            .filter(|s| s.pos.room == *room)
            .collect()
    }

    fn resource_nodes_in(&self, room: &RoomName) -> Vec<&ResourceNode> {
        self.nodes.values().filter(|n| n.pos.room == *room).collect()
    }

    fn dropped_resources_in(&self, room: &RoomName) -> Vec<&DroppedResource> {
        self.dropped
            .values()
            .filter(|p| p.pos.room == *room)
            .collect()
    }

    fn construction_sites(&self) -> Vec<&ConstructionSite> {
        self.sites.values().collect()
    }

    fn spawns_in(&self, room: &RoomName) -> Vec<&Spawn> {
        self.spawns
            .values()
            .filter(|s| s.pos.room == *room)
            .collect()
    }

    fn raw_memory(&self) -> &str {
        &self.memory
    }

    fn set_raw_memory(&mut self, blob: String) {
        self.memory = blob;
    }

    fn move_to(&mut self, creep: &str, target: &Position) -> ActionStatus {
        let status = match self.actor(creep) {
            Err(status) => status,
            Ok(_) if self.moved.contains(creep) => ActionStatus::Tired,
            Ok(c) if c.parts(BodyPart::Move) == 0 => ActionStatus::NoBodyPart,
            Ok(c) => {
                let next = c.pos.step_toward(target);
                if let Some(c) = self.creeps.get_mut(creep) {
                    c.pos = next;
                }
                self.moved.insert(creep.to_owned());
                ActionStatus::Ok
            }
        };
        self.record(creep, ActionKind::Move, target, status)
    }

    fn harvest(&mut self, creep: &str, node: &ObjectId) -> ActionStatus {
        let status = self.try_harvest(creep, node);
        self.record(creep, ActionKind::Harvest, node, status)
    }

    fn pickup(&mut self, creep: &str, pile: &ObjectId) -> ActionStatus {
        let status = self.try_pickup(creep, pile);
        self.record(creep, ActionKind::Pickup, pile, status)
    }

    fn withdraw(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus {
        let status = self.try_withdraw(creep, structure);
        self.record(creep, ActionKind::Withdraw, structure, status)
    }

    fn transfer(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus {
        let status = self.try_transfer(creep, structure);
        self.record(creep, ActionKind::Transfer, structure, status)
    }

    fn build(&mut self, creep: &str, site: &ObjectId) -> ActionStatus {
        let status = self.try_build(creep, site);
        self.record(creep, ActionKind::Build, site, status)
    }

    fn repair(&mut self, creep: &str, structure: &ObjectId) -> ActionStatus {
        let status = self.try_repair(creep, structure);
        self.record(creep, ActionKind::Repair, structure, status)
    }

    fn upgrade_controller(&mut self, creep: &str, room: &RoomName) -> ActionStatus {
        let status = self.try_upgrade(creep, room);
        self.record(creep, ActionKind::Upgrade, room, status)
    }

    fn spawn_creep(
        &mut self,
        spawn: &str,
        parts: &[BodyPart],
        name: &str,
        memory: &CreepMemory,
    ) -> ActionStatus {
        let status = self.try_spawn(spawn, parts, name, memory);
        self.record(spawn, ActionKind::Spawn, name, status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::Role;

    use super::*;

    fn room() -> RoomName {
        RoomName::from("W1N1")
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new("W1N1", x, y)
    }

    fn make_world() -> SimWorld {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", 2, (25, 25)).unwrap();
        world
    }

    fn memory() -> CreepMemory {
        CreepMemory { role: Role::Miner }
    }

    #[test]
    fn requested_unit_appears_next_tick_still_spawning() {
        let mut world = make_world();
        world.add_spawn("Spawn1", pos(10, 10), 300).unwrap();

        let status = world.spawn_creep("Spawn1", &[BodyPart::Work, BodyPart::Move], "a", &memory());
        assert_eq!(status, ActionStatus::Ok);
        assert!(world.creep("a").is_none());
        assert_eq!(world.room_energy(&room()), 150);

        world.advance();
        let creep = world.creep("a").unwrap();
        assert!(creep.spawning);
        assert_eq!(world.spawns_in(&room())[0].spawning.as_deref(), Some("a"));

        for _ in 0..6 {
            world.advance();
        }
        assert!(!world.creep("a").unwrap().spawning);
        assert!(world.spawns_in(&room())[0].is_idle());
    }

    #[test]
    fn spawn_rejects_busy_poor_and_duplicate() {
        let mut world = make_world();
        world.add_spawn("Spawn1", pos(10, 10), 100).unwrap();

        let poor = world.spawn_creep("Spawn1", &[BodyPart::Work, BodyPart::Move], "a", &memory());
        assert_eq!(poor, ActionStatus::NotEnoughResources);

        let ok = world.spawn_creep("Spawn1", &[BodyPart::Move], "a", &memory());
        assert_eq!(ok, ActionStatus::Ok);
        let busy = world.spawn_creep("Spawn1", &[BodyPart::Move], "b", &memory());
        assert_eq!(busy, ActionStatus::Busy);
        assert_eq!(world.creep_memory("a"), Some(&memory()));
    }

    #[test]
    fn harvest_overflow_fills_container() {
        let mut world = make_world();
        let source = world.add_node(NodeKind::Source, pos(20, 20), 3_000).unwrap();
        let container = world.add_built(StructureKind::Container, pos(21, 20)).unwrap();
        world
            .add_creep(SimWorld::creep_with(
                "m",
                &[BodyPart::Work, BodyPart::Work, BodyPart::Move],
                pos(21, 20),
            ))
            .unwrap();

        assert_eq!(world.harvest("m", &source), ActionStatus::Ok);
        assert_eq!(world.structure(&container).unwrap().stored_energy(), 4);
        assert_eq!(world.resource_node(&source).unwrap().amount, 2_996);
    }

    #[test]
    fn harvest_out_of_range() {
        let mut world = make_world();
        let source = world.add_node(NodeKind::Source, pos(20, 20), 3_000).unwrap();
        world
            .add_creep(SimWorld::creep_with("m", &[BodyPart::Work, BodyPart::Move], pos(5, 5)))
            .unwrap();
        assert_eq!(world.harvest("m", &source), ActionStatus::NotInRange);
        assert_eq!(world.move_to("m", &pos(20, 20)), ActionStatus::Ok);
        assert_eq!(world.creep("m").unwrap().pos, pos(6, 6));
        assert_eq!(world.move_to("m", &pos(20, 20)), ActionStatus::Tired);
    }

    #[test]
    fn pickup_and_transfer_move_energy() {
        let mut world = make_world();
        let pile = world.add_dropped(ResourceKind::Energy, pos(10, 11), 80).unwrap();
        let ext = world.add_built(StructureKind::Extension, pos(11, 11)).unwrap();
        world
            .add_creep(SimWorld::creep_with(
                "d",
                &[BodyPart::Carry, BodyPart::Carry, BodyPart::Move],
                pos(10, 10),
            ))
            .unwrap();

        assert_eq!(world.pickup("d", &pile), ActionStatus::Ok);
        assert_eq!(world.creep("d").unwrap().store.used(), 80);
        assert!(world.dropped_resource(&pile).is_none());

        assert_eq!(world.transfer("d", &ext), ActionStatus::Ok);
        assert_eq!(world.structure(&ext).unwrap().stored_energy(), 50);
        assert_eq!(world.creep("d").unwrap().store.used(), 30);
        assert_eq!(world.transfer("d", &ext), ActionStatus::Full);
    }

    #[test]
    fn build_completes_site() {
        let mut world = make_world();
        let site = world.add_site(StructureKind::Road, pos(12, 12), 10).unwrap();
        let mut creep = SimWorld::creep_with(
            "b",
            &[BodyPart::Work, BodyPart::Work, BodyPart::Carry, BodyPart::Move],
            pos(10, 10),
        );
        creep.store.energy = 50;
        world.add_creep(creep).unwrap();

        assert_eq!(world.build("b", &site), ActionStatus::Ok);
        assert!(world.construction_site(&site).is_none());
        assert_eq!(world.creep("b").unwrap().store.used(), 40);
        assert!(
            world
                .structures_in(&room())
                .iter()
                .any(|s| s.kind == StructureKind::Road)
        );
    }

    #[test]
    fn upgrade_levels_controller() {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", 1, (25, 25)).unwrap();
        world
            .add_creep(SimWorld::creep_with("u", &[BodyPart::Work, BodyPart::Carry], pos(24, 24)))
            .unwrap();
        for refill in 0..4 {
            assert_eq!(world.room(&room()).unwrap().control_level(), 1, "refill {refill}");
            world.creep_mut("u").unwrap().store.energy = 50;
            for _ in 0..50 {
                assert_eq!(world.upgrade_controller("u", &room()), ActionStatus::Ok);
            }
        }
        assert_eq!(world.room(&room()).unwrap().control_level(), 2);
        assert_eq!(
            world.upgrade_controller("u", &room()),
            ActionStatus::NotEnoughResources
        );
    }

    #[test]
    fn creeps_expire() {
        let mut world = make_world();
        let mut creep = SimWorld::creep_with("old", &[BodyPart::Move], pos(1, 1));
        creep.ticks_to_live = 2;
        world.add_creep(creep).unwrap();
        world.advance();
        assert!(world.creep("old").is_some());
        world.advance();
        assert!(world.creep("old").is_none());
    }

    #[test]
    fn rejects_objects_in_unknown_rooms() {
        let mut world = make_world();
        let result = world.add_node(NodeKind::Source, Position::new("W9N9", 1, 1), 3_000);
        assert!(matches!(result, Err(WorldError::RoomNotFound(_))));
        let result = world.add_node(NodeKind::Source, pos(60, 1), 3_000);
        assert!(matches!(result, Err(WorldError::OutOfBounds { .. })));
    }
}
