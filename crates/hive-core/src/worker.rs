//! Workers and the per-role worker pool.
//!
//! A [`Worker`] drives one live unit through one step of its role's state
//! machine per tick. It binds to the unit by name only and resolves it
//! through the host every tick, so a unit that died between ticks is
//! simply not found.
//!
//! [`WorkerPool`] is the bookkeeping every scheduler shares: the worker
//! map, the list of pending spawn names, the reconcile/prune/advance pass
//! and the snapshot conversion.

use std::collections::{BTreeMap, BTreeSet};

use hive_types::{Creep, WorkerProto};
use hive_world::Host;
use tracing::{debug, info, warn};

use crate::scheduler::ColonyContext;
use crate::specs::CreepSpecs;

/// One live unit's per-tick behaviour.
pub trait Worker {
    /// Persisted task payload.
    type Work: Clone;

    /// Scheduler-owned data shared read-only with every worker.
    type Shared: ?Sized;

    /// Name of the bound unit.
    fn creep_name(&self) -> &str;

    /// Current task payload.
    fn work(&self) -> Self::Work;

    /// Advance one tick. Only called while the bound unit exists and has
    /// finished spawning.
    fn run(&mut self, ctx: &ColonyContext<'_>, shared: &Self::Shared, host: &mut dyn Host);
}

/// Workers of one role plus their pending spawns.
#[derive(Debug, Clone)]
pub struct WorkerPool<W> {
    workers: BTreeMap<String, W>,
    spawnings: Vec<String>,
}

impl<W> Default for WorkerPool<W> {
    fn default() -> Self {
        Self {
            workers: BTreeMap::new(),
            spawnings: Vec::new(),
        }
    }
}

impl<W: Worker> WorkerPool<W> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from a snapshot. Workers and pending spawns whose unit
    /// no longer exists are dropped.
    ///
    /// A requested unit exists from the tick after its request, so a
    /// pending name that does not resolve on a later tick lived and died
    /// before the snapshot was reloaded.
    pub fn restore<F>(
        protos: Vec<WorkerProto<W::Work>>,
        spawnings: Vec<String>,
        host: &dyn Host,
        mut build: F,
    ) -> Self
    where
        F: FnMut(WorkerProto<W::Work>) -> W,
    {
        let mut workers = BTreeMap::new();
        for proto in protos {
            if host.creep(&proto.name).is_none() {
                debug!(creep = %proto.name, "Dropping snapshot entry for missing creep");
                continue;
            }
            workers.insert(proto.name.clone(), build(proto));
        }
        let spawnings = spawnings
            .into_iter()
            .filter(|name| {
                if host.creep(name).is_none() {
                    debug!(creep = %name, "Dropping pending spawn with no unit");
                    return false;
                }
                !workers.contains_key(name)
            })
            .collect();
        Self { workers, spawnings }
    }

    /// Live workers plus pending spawns.
    pub fn num_workers(&self) -> usize {
        self.workers.len().saturating_add(self.spawnings.len())
    }

    /// Number of pending spawns.
    pub fn num_spawnings(&self) -> usize {
        self.spawnings.len()
    }

    /// Pending spawn names, oldest first.
    pub fn spawnings(&self) -> &[String] {
        &self.spawnings
    }

    /// Live workers keyed by unit name.
    pub const fn workers(&self) -> &BTreeMap<String, W> {
        &self.workers
    }

    /// Record an accepted spawn request.
    pub fn spawning(&mut self, specs: &CreepSpecs) {
        if specs.is_empty() || self.workers.contains_key(&specs.name) {
            return;
        }
        if !self.spawnings.contains(&specs.name) {
            self.spawnings.push(specs.name.clone());
        }
    }

    /// Reconcile, prune and advance. Returns whether membership changed.
    ///
    /// Pending spawns whose unit now exists become workers through
    /// `assign`, which sees every worker assigned so far. Those new workers
    /// first run next tick. Workers whose unit is gone are dropped.
    pub fn run<F>(
        &mut self,
        ctx: &ColonyContext<'_>,
        shared: &W::Shared,
        host: &mut dyn Host,
        mut assign: F,
    ) -> bool
    where
        F: FnMut(&BTreeMap<String, W>, &Creep) -> W,
    {
        let spawnings_before = self.spawnings.len();
        let workers_before = self.workers.len();

        let mut fresh = BTreeSet::new();
        let mut still_pending = Vec::with_capacity(self.spawnings.len());
        for name in std::mem::take(&mut self.spawnings) {
            match host.creep(&name) {
                Some(creep) => {
                    let worker = assign(&self.workers, creep);
                    info!(creep = %name, room = %ctx.room, "Worker assigned");
                    self.workers.insert(name.clone(), worker);
                    fresh.insert(name);
                }
                None => still_pending.push(name),
            }
        }
        self.spawnings = still_pending;

        self.workers.retain(|name, _| {
            let alive = host.creep(name).is_some();
            if !alive {
                warn!(creep = %name, room = %ctx.room, "Creep gone, dropping worker");
            }
            alive
        });

        for (name, worker) in &mut self.workers {
            if fresh.contains(name) {
                continue;
            }
            if host.creep(name).is_some_and(|c| c.spawning) {
                continue;
            }
            worker.run(ctx, shared, host);
        }

        self.spawnings.len() != spawnings_before || self.workers.len() != workers_before
    }

    /// Snapshot of every worker, in name order.
    pub fn to_protos(&self) -> Vec<WorkerProto<W::Work>> {
        self.workers
            .values()
            .map(|w| WorkerProto {
                name: w.creep_name().to_owned(),
                work: w.work(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, CreepMemory, IdleWork, Position, RoomName, Role};
    use hive_world::SimWorld;

    use super::*;
    use crate::config::HiveConfig;

    #[derive(Debug)]
    struct Counter {
        name: String,
        runs: u32,
    }

    impl Worker for Counter {
        type Work = IdleWork;
        type Shared = ();

        fn creep_name(&self) -> &str {
            &self.name
        }

        fn work(&self) -> IdleWork {
            IdleWork {}
        }

        fn run(&mut self, _ctx: &ColonyContext<'_>, _shared: &(), _host: &mut dyn Host) {
            self.runs = self.runs.saturating_add(1);
        }
    }

    fn counter(_: &BTreeMap<String, Counter>, creep: &Creep) -> Counter {
        Counter {
            name: creep.name.clone(),
            runs: 0,
        }
    }

    fn make_world() -> SimWorld {
        let mut world = SimWorld::new();
        world.add_owned_room("W1N1", 2, (25, 25)).unwrap();
        world
            .add_spawn("Spawn1", Position::new("W1N1", 10, 10), 300)
            .unwrap();
        world
    }

    fn specs(name: &str) -> CreepSpecs {
        CreepSpecs {
            parts: vec![BodyPart::Move],
            name: name.to_owned(),
            memory: Some(CreepMemory { role: Role::Upgrader }),
        }
    }

    #[test]
    fn pending_spawn_becomes_worker_and_runs_next_tick() {
        let config = HiveConfig::default();
        let mut world = make_world();
        let mut pool: WorkerPool<Counter> = WorkerPool::new();

        world.spawn_creep("Spawn1", &[BodyPart::Move], "a", &CreepMemory { role: Role::Upgrader });
        pool.spawning(&specs("a"));
        assert_eq!(pool.num_workers(), 1);

        let room = RoomName::from("W1N1");
        let ctx = ColonyContext::new(&room, &[], &world, &config);
        assert!(!pool.run(&ctx, &(), &mut world, counter));
        assert_eq!(pool.num_spawnings(), 1);

        world.advance();
        let ctx = ColonyContext::new(&room, &[], &world, &config);
        assert!(pool.run(&ctx, &(), &mut world, counter));
        assert_eq!(pool.num_spawnings(), 0);
        assert_eq!(pool.workers().len(), 1);
        assert_eq!(pool.num_workers(), 1);
        assert_eq!(pool.workers().get("a").unwrap().runs, 0);

        // Let it finish spawning.
        for _ in 0..3 {
            world.advance();
        }
        let ctx = ColonyContext::new(&room, &[], &world, &config);
        assert!(!pool.run(&ctx, &(), &mut world, counter));
        assert_eq!(pool.workers().get("a").unwrap().runs, 1);
    }

    #[test]
    fn dead_worker_is_pruned() {
        let config = HiveConfig::default();
        let mut world = make_world();
        world
            .add_creep(SimWorld::creep_with("a", &[BodyPart::Move], Position::new("W1N1", 1, 1)))
            .unwrap();
        let mut pool = WorkerPool::restore(
            vec![WorkerProto {
                name: String::from("a"),
                work: IdleWork {},
            }],
            Vec::new(),
            &world,
            |p| Counter { name: p.name, runs: 0 },
        );
        assert_eq!(pool.num_workers(), 1);

        world.kill_creep("a");
        let room = RoomName::from("W1N1");
        let ctx = ColonyContext::new(&room, &[], &world, &config);
        assert!(pool.run(&ctx, &(), &mut world, counter));
        assert_eq!(pool.num_workers(), 0);
    }

    #[test]
    fn restore_drops_dangling_entries() {
        let world = make_world();
        let pool: WorkerPool<Counter> = WorkerPool::restore(
            vec![WorkerProto {
                name: String::from("ghost"),
                work: IdleWork {},
            }],
            vec![String::from("pending")],
            &world,
            |p| Counter { name: p.name, runs: 0 },
        );
        assert!(pool.workers().is_empty());
        assert!(pool.spawnings().is_empty());
        assert_eq!(pool.num_workers(), 0);
        assert!(pool.to_protos().is_empty());
    }

    #[test]
    fn restore_keeps_pending_spawn_with_live_unit() {
        let config = HiveConfig::default();
        let mut world = make_world();
        world.spawn_creep("Spawn1", &[BodyPart::Move], "a", &CreepMemory { role: Role::Upgrader });
        world.advance();

        let mut pool: WorkerPool<Counter> = WorkerPool::restore(
            Vec::new(),
            vec![String::from("a"), String::from("died-earlier")],
            &world,
            |p| Counter { name: p.name, runs: 0 },
        );
        assert_eq!(pool.spawnings(), ["a"]);
        assert_eq!(pool.num_workers(), 1);

        let room = RoomName::from("W1N1");
        let ctx = ColonyContext::new(&room, &[], &world, &config);
        assert!(pool.run(&ctx, &(), &mut world, counter));
        assert!(pool.workers().contains_key("a"));
        assert_eq!(pool.num_workers(), 1);
    }

    #[test]
    fn duplicate_spawning_ignored() {
        let mut pool: WorkerPool<Counter> = WorkerPool::new();
        pool.spawning(&specs("a"));
        pool.spawning(&specs("a"));
        pool.spawning(&CreepSpecs::empty());
        assert_eq!(pool.num_workers(), 1);
    }
}
