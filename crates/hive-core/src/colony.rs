//! Colony: one primary room, its auxiliary rooms and the four role
//! schedulers that operate in them.
//!
//! Each tick a colony:
//!
//! 1. **Arbitrates spawning** -- asks every scheduler for a spawn request in
//!    [`Role::PRIORITY`] order and issues the first non-empty one against
//!    the idle spawns of the primary room.
//! 2. **Advances schedulers** -- runs every scheduler in the same order,
//!    each reconciling its pending spawns before advancing its workers.
//!
//! A level-0 primary room aborts the whole tick for this colony with
//! [`SchedulerError::NotOwned`].

use hive_types::{ColonyProto, CreepMemory, Role, RoomName, SchedulerProtos};
use hive_world::Host;
use tracing::{debug, info, warn};

use crate::config::HiveConfig;
use crate::error::SchedulerError;
use crate::roles::{BuilderScheduler, DistributorScheduler, MinerScheduler, UpgraderScheduler};
use crate::scheduler::{ColonyContext, Scheduler};

/// A spawn request the host accepted this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnIssued {
    /// Role the unit was requested for.
    pub role: Role,
    /// Generated unit name.
    pub name: String,
    /// Spawn that accepted the request.
    pub spawn: String,
}

/// Outcome of one [`Colony::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColonyTick {
    /// The spawn issued this tick, if any.
    pub spawned: Option<SpawnIssued>,
    /// Whether the persisted snapshot of this colony changed.
    pub changed: bool,
}

/// A colony and its role schedulers.
#[derive(Debug, Clone)]
pub struct Colony {
    room: RoomName,
    remote_rooms: Vec<RoomName>,
    miner: MinerScheduler,
    distributor: DistributorScheduler,
    upgrader: UpgraderScheduler,
    builder: BuilderScheduler,
}

impl Colony {
    /// A fresh colony with empty schedulers. Call [`Colony::initialize`]
    /// before the first run.
    pub fn new(room: RoomName) -> Self {
        Self {
            room,
            remote_rooms: Vec::new(),
            miner: MinerScheduler::new(),
            distributor: DistributorScheduler::new(),
            upgrader: UpgraderScheduler::new(),
            builder: BuilderScheduler::new(),
        }
    }

    /// Rebuild a colony from its snapshot against live state.
    pub fn from_proto(proto: &ColonyProto, host: &dyn Host) -> Self {
        let schedulers = &proto.schedulers;
        Self {
            room: proto.room.clone(),
            remote_rooms: proto.remote_rooms.clone(),
            miner: MinerScheduler::from_proto(&schedulers.miner_scheduler, host),
            distributor: DistributorScheduler::from_proto(&schedulers.distributor_scheduler, host),
            upgrader: UpgraderScheduler::from_proto(&schedulers.upgrader_scheduler, host),
            builder: BuilderScheduler::from_proto(&schedulers.builder_scheduler, host),
        }
    }

    /// Snapshot of this colony.
    pub fn to_proto(&self) -> ColonyProto {
        ColonyProto {
            room: self.room.clone(),
            remote_rooms: self.remote_rooms.clone(),
            schedulers: SchedulerProtos {
                miner_scheduler: self.miner.to_proto(),
                distributor_scheduler: self.distributor.to_proto(),
                upgrader_scheduler: self.upgrader.to_proto(),
                builder_scheduler: self.builder.to_proto(),
            },
        }
    }

    /// Primary room.
    pub const fn room(&self) -> &RoomName {
        &self.room
    }

    /// Auxiliary rooms.
    pub fn remote_rooms(&self) -> &[RoomName] {
        &self.remote_rooms
    }

    /// Miner scheduler.
    pub const fn miner(&self) -> &MinerScheduler {
        &self.miner
    }

    /// Distributor scheduler.
    pub const fn distributor(&self) -> &DistributorScheduler {
        &self.distributor
    }

    /// Upgrader scheduler.
    pub const fn upgrader(&self) -> &UpgraderScheduler {
        &self.upgrader
    }

    /// Builder scheduler.
    pub const fn builder(&self) -> &BuilderScheduler {
        &self.builder
    }

    /// The scheduler managing `role`.
    pub fn scheduler(&self, role: Role) -> &dyn Scheduler {
        match role {
            Role::Miner => &self.miner,
            Role::Distributor => &self.distributor,
            Role::Upgrader => &self.upgrader,
            Role::Builder => &self.builder,
        }
    }

    /// The scheduler managing `role`, mutably.
    pub fn scheduler_mut(&mut self, role: Role) -> &mut dyn Scheduler {
        match role {
            Role::Miner => &mut self.miner,
            Role::Distributor => &mut self.distributor,
            Role::Upgrader => &mut self.upgrader,
            Role::Builder => &mut self.builder,
        }
    }

    /// Live workers plus pending spawns of `role`.
    pub fn num_workers(&self, role: Role) -> usize {
        self.scheduler(role).num_workers()
    }

    /// One-time setup of every scheduler for a newly founded colony.
    pub fn initialize(&mut self, host: &dyn Host, config: &HiveConfig) -> Result<(), SchedulerError> {
        let ctx = ColonyContext::new(&self.room, &self.remote_rooms, host, config);
        for role in Role::PRIORITY {
            self.scheduler_mut(role).initialize(&ctx, host)?;
        }
        info!(room = %self.room, level = ctx.level, "Colony initialized");
        Ok(())
    }

    /// Issue the highest-priority spawn request against the first idle
    /// spawn of the primary room that accepts it.
    ///
    /// A request no spawn accepts is dropped; it is derived again next tick.
    pub fn spawn_if_needed(
        &mut self,
        ctx: &ColonyContext<'_>,
        host: &mut dyn Host,
    ) -> Result<Option<SpawnIssued>, SchedulerError> {
        let mut request = None;
        for role in Role::PRIORITY {
            let specs = self.scheduler(role).decide_spawn(ctx, &*host)?;
            if !specs.is_empty() {
                request = Some((role, specs));
                break;
            }
        }
        let Some((role, specs)) = request else {
            return Ok(None);
        };

        let idle: Vec<String> = host
            .spawns_in(&self.room)
            .into_iter()
            .filter(|s| s.is_idle())
            .map(|s| s.name.clone())
            .collect();
        let memory = specs.memory.unwrap_or(CreepMemory { role });
        for spawn in idle {
            let status = host.spawn_creep(&spawn, &specs.parts, &specs.name, &memory);
            if status.is_ok() {
                self.scheduler_mut(role).spawning(&specs);
                info!(room = %self.room, %role, creep = %specs.name, %spawn, "Spawn issued");
                return Ok(Some(SpawnIssued {
                    role,
                    name: specs.name,
                    spawn,
                }));
            }
            debug!(room = %self.room, %spawn, ?status, "Spawn rejected request");
        }
        warn!(room = %self.room, %role, creep = %specs.name, "No spawn accepted request");
        Ok(None)
    }

    /// Arbitrate spawning, then advance every scheduler.
    pub fn run(&mut self, host: &mut dyn Host, config: &HiveConfig) -> Result<ColonyTick, SchedulerError> {
        if host.room(&self.room).is_none() {
            return Err(SchedulerError::RoomNotVisible {
                room: self.room.clone(),
            });
        }
        let ctx = ColonyContext::new(&self.room, &self.remote_rooms, &*host, config);

        let spawned = self.spawn_if_needed(&ctx, host)?;
        let mut changed = spawned.is_some();
        for role in Role::PRIORITY {
            if self.scheduler_mut(role).run(&ctx, host) {
                debug!(room = %self.room, %role, "Scheduler membership changed");
                changed = true;
            }
        }
        Ok(ColonyTick { spawned, changed })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{
        IdleWork, MinerWork, NodeKind, ObjectId, Position, WorkerProto,
    };
    use hive_world::SimWorld;

    use super::*;
    use crate::specs::CreepSpecs;

    fn at(x: u8, y: u8) -> Position {
        Position::new("W1N1", x, y)
    }

    fn room() -> RoomName {
        RoomName::from("W1N1")
    }

    fn make_world(level: u8) -> SimWorld {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", level, (25, 25)).unwrap();
        world.add_spawn("Spawn1", at(20, 20), 300).unwrap();
        world.add_node(NodeKind::Source, at(10, 5), 3_000).unwrap();
        world
    }

    fn founded(world: &SimWorld, config: &HiveConfig) -> Colony {
        let mut colony = Colony::new(room());
        colony.initialize(world, config).unwrap();
        colony
    }

    #[test]
    fn distributor_wins_arbitration() {
        let config = HiveConfig::default();
        let mut world = make_world(2);
        let mut colony = founded(&world, &config);

        let tick = colony.run(&mut world, &config).unwrap();
        let spawned = tick.spawned.unwrap();
        assert_eq!(spawned.role, Role::Distributor);
        assert_eq!(spawned.name, "VBIt-0");
        assert_eq!(spawned.spawn, "Spawn1");
        assert!(tick.changed);
        assert_eq!(colony.num_workers(Role::Distributor), 1);
        assert_eq!(colony.num_workers(Role::Miner), 0);
        assert_eq!(world.creep_memory("VBIt-0").unwrap().role, Role::Distributor);
    }

    #[test]
    fn next_priority_once_distributor_pending() {
        let config = HiveConfig::default();
        let mut world = make_world(2);
        let mut colony = founded(&world, &config);
        let mut pending = CreepSpecs::for_role(
            Role::Distributor,
            config.spawning.body(Role::Distributor),
            0,
        );
        pending.name = String::from("VBIt-elsewhere");
        colony.scheduler_mut(Role::Distributor).spawning(&pending);

        let tick = colony.run(&mut world, &config).unwrap();
        assert_eq!(tick.spawned.unwrap().role, Role::Miner);
        assert_eq!(colony.num_workers(Role::Miner), 1);
    }

    #[test]
    fn busy_spawn_drops_request() {
        let config = HiveConfig::default();
        let mut world = make_world(2);
        let mut colony = founded(&world, &config);
        colony.run(&mut world, &config).unwrap();
        world.advance();

        // Spawn1 is still busy; the distributor materializes instead.
        let tick = colony.run(&mut world, &config).unwrap();
        assert!(tick.spawned.is_none());
        assert!(tick.changed);
        assert_eq!(colony.distributor().workers().len(), 1);
        assert_eq!(colony.num_workers(Role::Miner), 0);

        world.advance();
        let tick = colony.run(&mut world, &config).unwrap();
        assert!(tick.spawned.is_none());
        assert!(!tick.changed);
    }

    #[test]
    fn level_zero_aborts_tick() {
        let config = HiveConfig::default();
        let mut world = make_world(0);
        let mut colony = founded(&world, &config);
        assert!(matches!(
            colony.run(&mut world, &config),
            Err(SchedulerError::NotOwned { .. })
        ));
        assert_eq!(world.creep_count(), 0);
    }

    #[test]
    fn invisible_room_is_an_error() {
        let config = HiveConfig::default();
        let mut world = SimWorld::new();
        let mut colony = Colony::new(room());
        assert!(matches!(
            colony.run(&mut world, &config),
            Err(SchedulerError::RoomNotVisible { .. })
        ));
    }

    #[test]
    fn snapshot_drops_missing_units() {
        let mut world = make_world(3);
        world
            .add_creep(SimWorld::creep_with(
                "NMhv-1",
                &[hive_types::BodyPart::Work, hive_types::BodyPart::Move],
                at(10, 6),
            ))
            .unwrap();
        let mut proto = Colony::new(room()).to_proto();
        proto.schedulers.miner_scheduler.targets = vec![ObjectId::from("src1")];
        proto.schedulers.miner_scheduler.workers = vec![
            WorkerProto {
                name: String::from("NMhv-1"),
                work: MinerWork {
                    target_id: Some(ObjectId::from("src1")),
                },
            },
            WorkerProto {
                name: String::from("NMhv-gone"),
                work: MinerWork {
                    target_id: Some(ObjectId::from("src2")),
                },
            },
        ];
        proto.schedulers.upgrader_scheduler.workers = vec![WorkerProto {
            name: String::from("MLfJ-gone"),
            work: IdleWork {},
        }];

        let colony = Colony::from_proto(&proto, &world);
        assert_eq!(colony.miner().workers().len(), 1);
        assert!(colony.miner().workers().contains_key("NMhv-1"));
        assert_eq!(colony.num_workers(Role::Upgrader), 0);

        let again = colony.to_proto();
        assert_eq!(again.schedulers.miner_scheduler.workers.len(), 1);
        assert_eq!(again.schedulers.miner_scheduler.targets, proto.schedulers.miner_scheduler.targets);
        assert_eq!(Colony::from_proto(&again, &world).to_proto(), again);
    }
}
