//! Builder role.
//!
//! Builders gather until full, then spend until empty. Spending repairs
//! the closest damaged structure in the builder's room and, when nothing
//! needs repair, works the colony's first construction site.
//!
//! The population estimator compares the outstanding build progress plus
//! the scaled-down repair backlog against what one builder is expected to
//! absorb, capped by control level.

use std::collections::BTreeMap;

use hive_types::{ActionStatus, BuilderSchedulerProto, IdleWork, ObjectId, Position, Role};
use hive_world::{Host, repair_points};
use tracing::debug;

use crate::config::PopulationConfig;
use crate::error::SchedulerError;
use crate::scheduler::{ColonyContext, Pickup, Scheduler};
use crate::specs::CreepSpecs;
use crate::worker::{Worker, WorkerPool};

/// Builder population cap by control level.
pub const fn builder_cap(level: u8) -> u32 {
    match level {
        0..=3 => 1,
        4 | 5 => 2,
        _ => 3,
    }
}

/// Builders warranted by a backlog, capped at `cap`.
///
/// `to_repair` is divided by `repair_scale_down` before being compared on
/// the same footing as `to_build`. Any outstanding build progress warrants
/// at least one builder.
pub fn desired_builders(to_build: u64, to_repair: u64, cap: u32, population: &PopulationConfig) -> u32 {
    let scale = u64::from(population.repair_scale_down.max(1));
    let per_unit = u64::from(population.builder_work_per_unit.max(1)).saturating_mul(scale);
    let scaled = to_build.saturating_mul(scale).saturating_add(to_repair);
    let wanted = u32::try_from(scaled.div_ceil(per_unit)).unwrap_or(u32::MAX);
    let desired = wanted.min(cap);
    if to_build > 0 { desired.max(1) } else { desired }
}

/// Worker for one builder.
#[derive(Debug, Clone)]
pub struct Builder {
    creep_name: String,
    picking_up: bool,
    pickup: Option<Pickup>,
}

impl Builder {
    /// Bind a builder to a unit. It starts out gathering.
    pub const fn new(creep_name: String) -> Self {
        Self {
            creep_name,
            picking_up: true,
            pickup: None,
        }
    }

    /// Whether the builder is in its gathering phase.
    pub const fn is_picking_up(&self) -> bool {
        self.picking_up
    }

    /// Closest structure in `pos`'s room with repair points outstanding.
    fn closest_damaged(pos: &Position, level: u8, host: &dyn Host) -> Option<(ObjectId, Position)> {
        host.structures_in(&pos.room)
            .into_iter()
            .filter(|s| repair_points(s, level) > 0)
            .min_by_key(|s| pos.range_to(&s.pos))
            .map(|s| (s.id.clone(), s.pos.clone()))
    }

    fn spend(&self, ctx: &ColonyContext<'_>, pos: &Position, host: &mut dyn Host) {
        if let Some((id, target)) = Self::closest_damaged(pos, ctx.level, host) {
            if host.repair(&self.creep_name, &id) == ActionStatus::NotInRange {
                host.move_to(&self.creep_name, &target);
            }
            return;
        }

        let site = ctx
            .construction_sites(host)
            .first()
            .map(|s| (s.id.clone(), s.pos.clone()));
        if let Some((id, target)) = site {
            if host.build(&self.creep_name, &id) == ActionStatus::NotInRange {
                host.move_to(&self.creep_name, &target);
            }
            return;
        }
        debug!(creep = %self.creep_name, "Nothing to repair or build");
    }
}

impl Worker for Builder {
    type Work = IdleWork;
    type Shared = ();

    fn creep_name(&self) -> &str {
        &self.creep_name
    }

    fn work(&self) -> IdleWork {
        IdleWork {}
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, _shared: &(), host: &mut dyn Host) {
        let Some((pos, store)) = host
            .creep(&self.creep_name)
            .map(|c| (c.pos.clone(), c.store))
        else {
            return;
        };
        if self.picking_up && store.is_full() {
            self.pickup = None;
            self.picking_up = false;
        }
        if !self.picking_up && store.is_empty() {
            self.picking_up = true;
        }

        if self.picking_up {
            if let Some(pickup) = ctx.cached_pickup(&mut self.pickup, host) {
                pickup.collect(&self.creep_name, host);
            }
        } else {
            self.spend(ctx, &pos, host);
        }
    }
}

/// Scheduler for the builder role.
#[derive(Debug, Clone, Default)]
pub struct BuilderScheduler {
    pool: WorkerPool<Builder>,
}

impl BuilderScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot, dropping builders whose unit has died.
    pub fn from_proto(proto: &BuilderSchedulerProto, host: &dyn Host) -> Self {
        let pool = WorkerPool::restore(
            proto.workers.clone(),
            proto.spawnings.clone(),
            host,
            |p| Builder::new(p.name),
        );
        Self { pool }
    }

    /// Snapshot of this scheduler.
    pub fn to_proto(&self) -> BuilderSchedulerProto {
        BuilderSchedulerProto {
            workers: self.pool.to_protos(),
            spawnings: self.pool.spawnings().to_vec(),
        }
    }

    /// Live builders keyed by unit name.
    pub const fn workers(&self) -> &BTreeMap<String, Builder> {
        self.pool.workers()
    }
}

impl Scheduler for BuilderScheduler {
    fn role(&self) -> Role {
        Role::Builder
    }

    fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    fn decide_spawn(
        &self,
        ctx: &ColonyContext<'_>,
        host: &dyn Host,
    ) -> Result<CreepSpecs, SchedulerError> {
        ctx.ensure_owned()?;
        let cap = builder_cap(ctx.level);
        let num = u32::try_from(self.pool.num_workers()).unwrap_or(u32::MAX);
        if num >= cap {
            return Ok(CreepSpecs::empty());
        }

        let to_build = ctx
            .construction_sites(host)
            .iter()
            .fold(0_u64, |acc, s| acc.saturating_add(u64::from(s.remaining())));
        let to_repair = ctx
            .structures(host)
            .iter()
            .fold(0_u64, |acc, s| acc.saturating_add(u64::from(repair_points(s, ctx.level))));
        let desired = desired_builders(to_build, to_repair, cap, &ctx.config.population);
        debug!(room = %ctx.room, to_build, to_repair, desired, "Builder backlog");

        if num >= desired {
            Ok(CreepSpecs::empty())
        } else {
            Ok(ctx.specs_for(Role::Builder))
        }
    }

    fn spawning(&mut self, specs: &CreepSpecs) {
        self.pool.spawning(specs);
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, host: &mut dyn Host) -> bool {
        self.pool.run(ctx, &(), host, |_, creep| Builder::new(creep.name.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, ResourceKind, RoomName, StructureKind};
    use hive_world::SimWorld;

    use super::*;
    use crate::config::HiveConfig;

    fn at(x: u8, y: u8) -> Position {
        Position::new("W1N1", x, y)
    }

    fn room() -> RoomName {
        RoomName::from("W1N1")
    }

    fn make_world(level: u8) -> SimWorld {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", level, (25, 25)).unwrap();
        world
    }

    fn builder_body() -> [BodyPart; 5] {
        [
            BodyPart::Carry,
            BodyPart::Carry,
            BodyPart::Work,
            BodyPart::Move,
            BodyPart::Move,
        ]
    }

    #[test]
    fn caps_by_level() {
        assert_eq!(builder_cap(1), 1);
        assert_eq!(builder_cap(3), 1);
        assert_eq!(builder_cap(4), 2);
        assert_eq!(builder_cap(5), 2);
        assert_eq!(builder_cap(6), 3);
        assert_eq!(builder_cap(8), 3);
    }

    #[test]
    fn backlog_estimate() {
        let population = PopulationConfig::default();
        assert_eq!(desired_builders(5_000, 0, 3, &population), 2);
        assert_eq!(desired_builders(5_001, 0, 3, &population), 3);
        assert_eq!(desired_builders(100, 0, 3, &population), 1);
        assert_eq!(desired_builders(0, 0, 3, &population), 0);
        // 500k repair points scale down to 5000 build-equivalents.
        assert_eq!(desired_builders(0, 500_000, 3, &population), 2);
        assert_eq!(desired_builders(50_000, 0, 2, &population), 2);
        assert_eq!(desired_builders(1, 0, 0, &population), 1);
    }

    #[test]
    fn spawns_for_build_backlog() {
        let config = HiveConfig::default();
        let mut world = make_world(6);
        world.add_site(StructureKind::Extension, at(10, 10), 3_000).unwrap();
        world.add_site(StructureKind::Extension, at(12, 10), 2_000).unwrap();
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        let mut scheduler = BuilderScheduler::new();

        let first = scheduler.decide_spawn(&ctx, &world).unwrap();
        assert!(first.name.starts_with("Aerl-"));
        scheduler.spawning(&first);
        let mut second = scheduler.decide_spawn(&ctx, &world).unwrap();
        assert!(!second.is_empty());
        second.name = String::from("Aerl-other");
        scheduler.spawning(&second);
        assert!(scheduler.decide_spawn(&ctx, &world).unwrap().is_empty());
    }

    #[test]
    fn no_backlog_no_builders() {
        let config = HiveConfig::default();
        let world = make_world(4);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        assert!(
            BuilderScheduler::new()
                .decide_spawn(&ctx, &world)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn level_zero_checked_first() {
        let config = HiveConfig::default();
        let world = make_world(0);
        let ctx = ColonyContext::new(&room(), &[], &world, &config);
        assert!(matches!(
            BuilderScheduler::new().decide_spawn(&ctx, &world),
            Err(SchedulerError::NotOwned { .. })
        ));
    }

    #[test]
    fn repairs_before_building() {
        let config = HiveConfig::default();
        let mut world = make_world(2);
        let road = world
            .add_structure(StructureKind::Road, at(11, 10), 1_000, 5_000, None)
            .unwrap();
        let site = world.add_site(StructureKind::Extension, at(10, 11), 3_000).unwrap();
        let mut creep = SimWorld::creep_with("b", &builder_body(), at(10, 10));
        creep.store.energy = 100;
        world.add_creep(creep).unwrap();
        let ctx = ColonyContext::new(&room(), &[], &world, &config);

        let mut worker = Builder::new(String::from("b"));
        worker.run(&ctx, &(), &mut world);
        assert!(!worker.is_picking_up());
        assert_eq!(world.structure(&road).unwrap().hits, 1_100);
        assert_eq!(world.construction_site(&site).unwrap().progress, 0);

        world.structure_mut(&road).unwrap().hits = 5_000;
        world.advance();
        worker.run(&ctx, &(), &mut world);
        assert_eq!(world.construction_site(&site).unwrap().progress, 5);
    }

    #[test]
    fn gathers_until_full() {
        let config = HiveConfig::default();
        let mut world = make_world(2);
        world.add_dropped(ResourceKind::Energy, at(10, 11), 60).unwrap();
        world.add_dropped(ResourceKind::Energy, at(20, 20), 500).unwrap();
        world
            .add_creep(SimWorld::creep_with("b", &builder_body(), at(10, 10)))
            .unwrap();

        let mut worker = Builder::new(String::from("b"));
        for _ in 0..40 {
            let ctx = ColonyContext::new(&room(), &[], &world, &config);
            worker.run(&ctx, &(), &mut world);
            if !worker.is_picking_up() {
                break;
            }
            world.advance();
        }
        assert!(world.creep("b").unwrap().store.is_full());
    }
}
