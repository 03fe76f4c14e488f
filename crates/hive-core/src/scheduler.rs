//! The scheduler capability interface and the per-tick colony context.
//!
//! Every role scheduler implements [`Scheduler`]. The colony drives them
//! through that trait for spawn arbitration and per-tick advancement, and
//! serializes each one through its own typed `to_proto`.
//!
//! A [`ColonyContext`] is built once per colony per tick. It carries the
//! colony's rooms, control level, tick number and configuration, plus the
//! read helpers that several roles share (structures in scope,
//! construction backlog, the energy pickup point).

use hive_types::{
    ActionStatus, ConstructionSite, ObjectId, Position, ResourceKind, Role, RoomName, Structure,
};
use hive_world::Host;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HiveConfig;
use crate::error::SchedulerError;
use crate::specs::CreepSpecs;

/// Multiplier mixing the tick number into the configured seed.
const TICK_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A role scheduler: owns the role's workers and pending spawns.
pub trait Scheduler {
    /// Role this scheduler manages.
    fn role(&self) -> Role;

    /// Live workers plus pending spawns. Compared against population targets.
    fn num_workers(&self) -> usize;

    /// One-time setup when the colony is first created.
    fn initialize(
        &mut self,
        _ctx: &ColonyContext<'_>,
        _host: &dyn Host,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }

    /// Whether this role needs one more unit right now.
    ///
    /// Returns [`CreepSpecs::empty`] when no spawn is warranted.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotOwned`] when the colony's control level
    /// is 0.
    fn decide_spawn(
        &self,
        ctx: &ColonyContext<'_>,
        host: &dyn Host,
    ) -> Result<CreepSpecs, SchedulerError>;

    /// Record a spawn request the host accepted.
    fn spawning(&mut self, specs: &CreepSpecs);

    /// Reconcile pending spawns, prune dead units and advance every worker.
    /// Returns whether persisted membership changed.
    fn run(&mut self, ctx: &ColonyContext<'_>, host: &mut dyn Host) -> bool;
}

// ---------------------------------------------------------------------------
// Colony context
// ---------------------------------------------------------------------------

/// Per-tick, read-only view of one colony.
#[derive(Debug, Clone)]
pub struct ColonyContext<'a> {
    /// Primary room.
    pub room: RoomName,
    /// Auxiliary rooms.
    pub remote_rooms: Vec<RoomName>,
    /// Control level of the primary room, 0 when unowned or not visible.
    pub level: u8,
    /// Current tick.
    pub time: u64,
    /// Scheduler configuration.
    pub config: &'a HiveConfig,
}

impl<'a> ColonyContext<'a> {
    /// Build the context for a colony from live state.
    pub fn new(
        room: &RoomName,
        remote_rooms: &[RoomName],
        host: &dyn Host,
        config: &'a HiveConfig,
    ) -> Self {
        let level = host.room(room).map_or(0, hive_types::Room::control_level);
        Self {
            room: room.clone(),
            remote_rooms: remote_rooms.to_vec(),
            level,
            time: host.time(),
            config,
        }
    }

    /// Fail with [`SchedulerError::NotOwned`] at control level 0.
    pub fn ensure_owned(&self) -> Result<(), SchedulerError> {
        if self.level == 0 {
            return Err(SchedulerError::NotOwned {
                room: self.room.clone(),
            });
        }
        Ok(())
    }

    /// Primary room followed by the auxiliary rooms.
    pub fn rooms(&self) -> impl Iterator<Item = &RoomName> {
        std::iter::once(&self.room).chain(self.remote_rooms.iter())
    }

    /// Whether a room belongs to this colony.
    pub fn is_in_colony(&self, room: &RoomName) -> bool {
        self.rooms().any(|r| r == room)
    }

    /// Every structure in every visible colony room.
    pub fn structures<'h>(&self, host: &'h dyn Host) -> Vec<&'h Structure> {
        self.rooms().flat_map(|r| host.structures_in(r)).collect()
    }

    /// Construction sites located in colony rooms.
    pub fn construction_sites<'h>(&self, host: &'h dyn Host) -> Vec<&'h ConstructionSite> {
        host.construction_sites()
            .into_iter()
            .filter(|s| self.is_in_colony(&s.pos.room))
            .collect()
    }

    /// Spawn request for one unit of `role` named after this tick.
    pub fn specs_for(&self, role: Role) -> CreepSpecs {
        CreepSpecs::for_role(role, self.config.spawning.body(role), self.time)
    }

    /// Where gatherers should collect energy: the primary room's storage if
    /// one exists, else a uniformly random dropped energy pile.
    pub fn source_pickup(&self, host: &dyn Host) -> Option<Pickup> {
        if let Some(storage) = host.room(&self.room).and_then(|r| r.storage.clone()) {
            return Some(Pickup::Structure(storage));
        }
        let piles: Vec<ObjectId> = host
            .dropped_resources_in(&self.room)
            .into_iter()
            .filter(|p| p.resource == ResourceKind::Energy)
            .map(|p| p.id.clone())
            .collect();
        if piles.is_empty() {
            return None;
        }
        let mut rng = StdRng::seed_from_u64(self.config.world.seed ^ self.time.wrapping_mul(TICK_MIX));
        let index = rng.random_range(0..piles.len());
        piles.into_iter().nth(index).map(Pickup::Dropped)
    }

    /// Keep a cached pickup while it still resolves, otherwise pick anew.
    pub fn cached_pickup(&self, cache: &mut Option<Pickup>, host: &dyn Host) -> Option<Pickup> {
        if cache.as_ref().is_none_or(|p| p.position(host).is_none()) {
            *cache = self.source_pickup(host);
        }
        cache.clone()
    }
}

// ---------------------------------------------------------------------------
// Pickup
// ---------------------------------------------------------------------------

/// A place holding extractable energy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pickup {
    /// A structure to withdraw from.
    Structure(ObjectId),
    /// A dropped pile to pick up.
    Dropped(ObjectId),
}

impl Pickup {
    /// Identifier of the pickup object.
    pub const fn id(&self) -> &ObjectId {
        match self {
            Self::Structure(id) | Self::Dropped(id) => id,
        }
    }

    /// Current position, or `None` once the object is gone.
    pub fn position(&self, host: &dyn Host) -> Option<Position> {
        match self {
            Self::Structure(id) => host.structure(id).map(|s| s.pos.clone()),
            Self::Dropped(id) => host.dropped_resource(id).map(|p| p.pos.clone()),
        }
    }

    /// Collect from the pickup, stepping toward it when out of range.
    /// Returns `None` when the pickup no longer resolves.
    pub fn collect(&self, creep: &str, host: &mut dyn Host) -> Option<ActionStatus> {
        let pos = self.position(host)?;
        let status = match self {
            Self::Structure(id) => host.withdraw(creep, id),
            Self::Dropped(id) => host.pickup(creep, id),
        };
        if status == ActionStatus::NotInRange {
            host.move_to(creep, &pos);
        }
        Some(status)
    }
}
