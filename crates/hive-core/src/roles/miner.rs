//! Miner role.
//!
//! Each miner is bound to one source or mineral for life. No two miners of
//! the same scheduler ever hold the same target; assignment is greedy,
//! first unclaimed target in discovery order. A miner whose target has a
//! container next to it parks on the container so harvest overflow lands
//! in it.

use std::collections::{BTreeMap, BTreeSet};

use hive_types::{
    ActionStatus, Creep, MinerSchedulerProto, MinerWork, NodeKind, ObjectId, Position, Role,
    StructureKind,
};
use hive_world::{ADJACENT_RANGE, Host};
use tracing::{debug, info};

use crate::error::SchedulerError;
use crate::scheduler::{ColonyContext, Scheduler};
use crate::specs::CreepSpecs;
use crate::worker::{Worker, WorkerPool};

/// Worker for one miner.
#[derive(Debug, Clone)]
pub struct Miner {
    creep_name: String,
    work: MinerWork,
    /// Container next to the target, as of the last lookup.
    drop_container: Option<ObjectId>,
}

impl Miner {
    /// Bind a miner to a unit.
    pub const fn new(creep_name: String, work: MinerWork) -> Self {
        Self {
            creep_name,
            work,
            drop_container: None,
        }
    }

    /// Claimed target, if any.
    pub const fn target_id(&self) -> Option<&ObjectId> {
        self.work.target_id.as_ref()
    }

    /// Find a container within range 1 of the target.
    fn look_for_container(target: &Position, host: &dyn Host) -> Option<ObjectId> {
        host.structures_in(&target.room)
            .into_iter()
            .find(|s| s.kind == StructureKind::Container && s.pos.in_range_to(target, ADJACENT_RANGE))
            .map(|s| s.id.clone())
    }

    /// Cached drop container. Looked up again while none is known or the
    /// cached one has gone, so a container built later is picked up.
    fn drop_container(&mut self, target: &Position, host: &dyn Host) -> Option<ObjectId> {
        let known = self
            .drop_container
            .as_ref()
            .is_some_and(|id| host.structure(id).is_some());
        if !known {
            self.drop_container = Self::look_for_container(target, host);
        }
        self.drop_container.clone()
    }
}

impl Worker for Miner {
    type Work = MinerWork;
    type Shared = ();

    fn creep_name(&self) -> &str {
        &self.creep_name
    }

    fn work(&self) -> MinerWork {
        self.work.clone()
    }

    fn run(&mut self, _ctx: &ColonyContext<'_>, _shared: &(), host: &mut dyn Host) {
        let Some(target_id) = self.work.target_id.clone() else {
            debug!(creep = %self.creep_name, "Miner has no target, idling");
            return;
        };
        let Some(target_pos) = host.resource_node(&target_id).map(|n| n.pos.clone()) else {
            return;
        };
        let Some((creep_pos, carried)) = host
            .creep(&self.creep_name)
            .map(|c| (c.pos.clone(), c.store.used()))
        else {
            return;
        };

        let mut heading_to_container = false;
        if let Some(container_id) = self.drop_container(&target_pos, host)
            && let Some(container) = host.structure(&container_id)
        {
            let container_pos = container.pos.clone();
            let damaged = container.hits < container.hits_max;
            if creep_pos != container_pos {
                host.move_to(&self.creep_name, &container_pos);
                heading_to_container = true;
            } else if damaged && carried > 0 {
                host.repair(&self.creep_name, &container_id);
            }
        }

        let status = host.harvest(&self.creep_name, &target_id);
        if status == ActionStatus::NotInRange && !heading_to_container {
            host.move_to(&self.creep_name, &target_pos);
        }
    }
}

/// Scheduler for the miner role.
#[derive(Debug, Clone, Default)]
pub struct MinerScheduler {
    pool: WorkerPool<Miner>,
    /// Sources and minerals of the primary room, in discovery order.
    targets: Vec<ObjectId>,
}

impl MinerScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot, dropping miners whose unit has died.
    pub fn from_proto(proto: &MinerSchedulerProto, host: &dyn Host) -> Self {
        let pool = WorkerPool::restore(
            proto.workers.clone(),
            proto.spawnings.clone(),
            host,
            |p| Miner::new(p.name, p.work),
        );
        Self {
            pool,
            targets: proto.targets.clone(),
        }
    }

    /// Snapshot of this scheduler.
    pub fn to_proto(&self) -> MinerSchedulerProto {
        MinerSchedulerProto {
            workers: self.pool.to_protos(),
            targets: self.targets.clone(),
            spawnings: self.pool.spawnings().to_vec(),
        }
    }

    /// Every known target.
    pub fn targets(&self) -> &[ObjectId] {
        &self.targets
    }

    /// Live miners keyed by unit name.
    pub const fn workers(&self) -> &BTreeMap<String, Miner> {
        self.pool.workers()
    }

    /// Targets miners should work at the colony's level: sources only below
    /// the mineral level, every target from it upward.
    fn in_scope_targets(&self, ctx: &ColonyContext<'_>, host: &dyn Host) -> Vec<ObjectId> {
        let minerals = ctx.level >= ctx.config.population.mineral_level;
        self.targets
            .iter()
            .filter(|id| {
                host.resource_node(id)
                    .is_some_and(|n| minerals || n.kind == NodeKind::Source)
            })
            .cloned()
            .collect()
    }

    fn claimed(workers: &BTreeMap<String, Miner>) -> BTreeSet<&ObjectId> {
        workers.values().filter_map(Miner::target_id).collect()
    }
}

impl Scheduler for MinerScheduler {
    fn role(&self) -> Role {
        Role::Miner
    }

    fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    fn initialize(&mut self, ctx: &ColonyContext<'_>, host: &dyn Host) -> Result<(), SchedulerError> {
        if ctx.room.as_str().is_empty() {
            return Err(SchedulerError::MissingRoomName { role: Role::Miner });
        }
        if host.room(&ctx.room).is_none() {
            return Err(SchedulerError::RoomNotVisible {
                room: ctx.room.clone(),
            });
        }
        // A new colony only mines its primary room.
        self.targets = host
            .resource_nodes_in(&ctx.room)
            .into_iter()
            .filter(|n| matches!(n.kind, NodeKind::Source | NodeKind::Mineral))
            .map(|n| n.id.clone())
            .collect();
        info!(room = %ctx.room, targets = self.targets.len(), "Miner targets discovered");
        Ok(())
    }

    fn decide_spawn(
        &self,
        ctx: &ColonyContext<'_>,
        host: &dyn Host,
    ) -> Result<CreepSpecs, SchedulerError> {
        ctx.ensure_owned()?;
        let claimed = Self::claimed(self.pool.workers());
        let unclaimed = self
            .in_scope_targets(ctx, host)
            .iter()
            .filter(|id| !claimed.contains(id))
            .count();
        if unclaimed > self.pool.num_spawnings() {
            Ok(ctx.specs_for(Role::Miner))
        } else {
            Ok(CreepSpecs::empty())
        }
    }

    fn spawning(&mut self, specs: &CreepSpecs) {
        self.pool.spawning(specs);
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, host: &mut dyn Host) -> bool {
        let in_scope = self.in_scope_targets(ctx, host);
        self.pool.run(ctx, &(), host, |workers, creep: &Creep| {
            let claimed = Self::claimed(workers);
            let target_id = in_scope.iter().find(|id| !claimed.contains(id)).cloned();
            if target_id.is_none() {
                debug!(creep = %creep.name, "No unclaimed target for miner");
            }
            Miner::new(creep.name.clone(), MinerWork { target_id })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, Position, RoomName, WorkerProto};
    use hive_world::SimWorld;

    use super::*;
    use crate::config::HiveConfig;

    fn at(x: u8, y: u8) -> Position {
        Position::new("W1N1", x, y)
    }

    fn room() -> RoomName {
        RoomName::from("W1N1")
    }

    /// Two sources and a mineral.
    fn make_world(level: u8) -> (SimWorld, Vec<ObjectId>) {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", level, (25, 25)).unwrap();
        let a = world.add_node(NodeKind::Source, at(10, 10), 3_000).unwrap();
        let b = world.add_node(NodeKind::Source, at(40, 10), 3_000).unwrap();
        let m = world.add_node(NodeKind::Mineral, at(40, 40), 70_000).unwrap();
        (world, vec![a, b, m])
    }

    fn initialized(world: &SimWorld, config: &HiveConfig) -> MinerScheduler {
        let ctx = ColonyContext::new(&room(), &[], world, config);
        let mut scheduler = MinerScheduler::new();
        scheduler.initialize(&ctx, world).unwrap();
        scheduler
    }

    fn miner_body() -> [BodyPart; 3] {
        [BodyPart::Work, BodyPart::Work, BodyPart::Move]
    }

    #[test]
    fn initialize_discovers_sources_and_minerals() {
        let config = HiveConfig::default();
        let (world, ids) = make_world(4);
        let scheduler = initialized(&world, &config);
        assert_eq!(scheduler.targets(), ids.as_slice());
    }

    #[test]
    fn initialize_without_room_name_fails() {
        let config = HiveConfig::default();
        let (world, _) = make_world(4);
        let ctx = ColonyContext::new(&RoomName::from(""), &[], &world, &config);
        let result = MinerScheduler::new().initialize(&ctx, &world);
        assert_eq!(
            result,
            Err(SchedulerError::MissingRoomName { role: Role::Miner })
        );
    }

    #[test]
    fn spawns_until_every_source_is_claimed_or_pending() {
        let config = HiveConfig::default();
        let (mut world, _) = make_world(4);
        let mut scheduler = initialized(&world, &config);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);

        let first = scheduler.decide_spawn(&ctx, &world).unwrap();
        assert!(!first.is_empty());
        scheduler.spawning(&first);

        let second = scheduler.decide_spawn(&ctx, &world).unwrap();
        assert!(!second.is_empty());
        let mut second = second;
        second.name = String::from("NMhv-other");
        scheduler.spawning(&second);

        // Two sources, two pending; the mineral is out of scope below level 6.
        assert!(scheduler.decide_spawn(&ctx, &world).unwrap().is_empty());

        // Materialize both and check they split the sources.
        for name in [&first.name, &second.name] {
            world
                .add_creep(SimWorld::creep_with(name, &miner_body(), at(20, 20)))
                .unwrap();
        }
        assert!(scheduler.run(&ctx, &mut world));
        let claimed: BTreeSet<_> = scheduler
            .workers()
            .values()
            .filter_map(Miner::target_id)
            .collect();
        assert_eq!(claimed.len(), 2);
        assert!(scheduler.decide_spawn(&ctx, &world).unwrap().is_empty());
    }

    #[test]
    fn minerals_in_scope_from_mineral_level() {
        let config = HiveConfig::default();
        let (world, ids) = make_world(6);
        let source_a = ids.first().unwrap().clone();
        let source_b = ids.get(1).unwrap().clone();
        let proto = MinerSchedulerProto {
            workers: vec![
                WorkerProto {
                    name: String::from("m1"),
                    work: MinerWork {
                        target_id: Some(source_a),
                    },
                },
                WorkerProto {
                    name: String::from("m2"),
                    work: MinerWork {
                        target_id: Some(source_b),
                    },
                },
            ],
            targets: ids,
            spawnings: Vec::new(),
        };
        let mut world = world;
        for name in ["m1", "m2"] {
            world
                .add_creep(SimWorld::creep_with(name, &miner_body(), at(20, 20)))
                .unwrap();
        }
        let scheduler = MinerScheduler::from_proto(&proto, &world);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        assert!(!scheduler.decide_spawn(&ctx, &world).unwrap().is_empty());

        world.set_control_level(&room(), 5);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        assert!(scheduler.decide_spawn(&ctx, &world).unwrap().is_empty());
    }

    #[test]
    fn level_zero_is_fatal() {
        let config = HiveConfig::default();
        let (mut world, _) = make_world(4);
        let scheduler = initialized(&world, &config);
        world.set_control_level(&room(), 0);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        assert!(matches!(
            scheduler.decide_spawn(&ctx, &world),
            Err(SchedulerError::NotOwned { .. })
        ));
    }

    #[test]
    fn surplus_miner_idles_without_target() {
        let config = HiveConfig::default();
        let (mut world, ids) = make_world(4);
        let mut scheduler = initialized(&world, &config);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        for name in ["a", "b", "c"] {
            scheduler.spawning(&CreepSpecs {
                parts: miner_body().to_vec(),
                name: name.to_owned(),
                memory: None,
            });
            world
                .add_creep(SimWorld::creep_with(name, &miner_body(), at(20, 20)))
                .unwrap();
        }
        scheduler.run(&ctx, &mut world);

        let targets: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| scheduler.workers().get(*n).unwrap().target_id().cloned())
            .collect();
        assert_eq!(
            targets,
            vec![ids.first().cloned(), ids.get(1).cloned(), None]
        );

        world.advance();
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        scheduler.run(&ctx, &mut world);
        assert_eq!(world.creep("c").unwrap().pos, at(20, 20));
        assert_ne!(world.creep("a").unwrap().pos, at(20, 20));
    }

    #[test]
    fn parks_on_container_and_harvests_into_it() {
        let config = HiveConfig::default();
        let (mut world, ids) = make_world(4);
        let source = ids.first().unwrap().clone();
        let container = world
            .add_built(StructureKind::Container, at(11, 11))
            .unwrap();
        world
            .add_creep(SimWorld::creep_with("m", &miner_body(), at(11, 13)))
            .unwrap();
        let mut miner = Miner::new(
            String::from("m"),
            MinerWork {
                target_id: Some(source),
            },
        );
        let ctx = ColonyContext::new(&room(), &[], &world, &config);

        miner.run(&ctx, &(), &mut world);
        assert_eq!(world.creep("m").unwrap().pos, at(11, 12));
        // Steps onto the container and harvests from it in the same tick.
        world.advance();
        miner.run(&ctx, &(), &mut world);
        assert_eq!(world.creep("m").unwrap().pos, at(11, 11));
        assert_eq!(world.structure(&container).unwrap().stored_energy(), 4);

        world.advance();
        miner.run(&ctx, &(), &mut world);
        assert_eq!(world.creep("m").unwrap().pos, at(11, 11));
        assert_eq!(world.structure(&container).unwrap().stored_energy(), 8);
    }

    #[test]
    fn container_built_after_arrival_is_used() {
        let config = HiveConfig::default();
        let (mut world, ids) = make_world(4);
        let source = ids.first().unwrap().clone();
        world
            .add_creep(SimWorld::creep_with("m", &miner_body(), at(11, 13)))
            .unwrap();
        let mut miner = Miner::new(
            String::from("m"),
            MinerWork {
                target_id: Some(source),
            },
        );
        let ctx = ColonyContext::new(&room(), &[], &world, &config);

        // Nothing to park on yet.
        miner.run(&ctx, &(), &mut world);
        assert!(miner.drop_container.is_none());

        let container = world
            .add_built(StructureKind::Container, at(11, 11))
            .unwrap();
        for _ in 0..3 {
            world.advance();
            miner.run(&ctx, &(), &mut world);
        }
        assert_eq!(miner.drop_container.as_ref(), Some(&container));
        assert_eq!(world.creep("m").unwrap().pos, at(11, 11));
        assert!(world.structure(&container).unwrap().stored_energy() > 0);
    }
}
