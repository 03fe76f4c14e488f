//! Upgrader role.
//!
//! Upgraders gather until full and then spend everything on the primary
//! room's controller. Population follows the configured
//! [`UpgraderPolicy`](crate::config::UpgraderPolicy).

use std::collections::BTreeMap;

use hive_types::{ActionStatus, IdleWork, Role, UpgraderSchedulerProto};
use hive_world::Host;

use crate::error::SchedulerError;
use crate::scheduler::{ColonyContext, Pickup, Scheduler};
use crate::specs::CreepSpecs;
use crate::worker::{Worker, WorkerPool};

/// Worker for one upgrader.
#[derive(Debug, Clone)]
pub struct Upgrader {
    creep_name: String,
    picking_up: bool,
    pickup: Option<Pickup>,
}

impl Upgrader {
    /// Bind an upgrader to a unit. It starts out gathering.
    pub const fn new(creep_name: String) -> Self {
        Self {
            creep_name,
            picking_up: true,
            pickup: None,
        }
    }

    /// Whether the upgrader is in its gathering phase.
    pub const fn is_picking_up(&self) -> bool {
        self.picking_up
    }
}

impl Worker for Upgrader {
    type Work = IdleWork;
    type Shared = ();

    fn creep_name(&self) -> &str {
        &self.creep_name
    }

    fn work(&self) -> IdleWork {
        IdleWork {}
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, _shared: &(), host: &mut dyn Host) {
        let Some(store) = host.creep(&self.creep_name).map(|c| c.store) else {
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
            return;
        }

        let Some(controller) = host
            .room(&ctx.room)
            .and_then(|r| r.controller.as_ref())
            .map(|c| c.pos.clone())
        else {
            return;
        };
        if host.upgrade_controller(&self.creep_name, &ctx.room) == ActionStatus::NotInRange {
            host.move_to(&self.creep_name, &controller);
        }
    }
}

/// Scheduler for the upgrader role.
#[derive(Debug, Clone, Default)]
pub struct UpgraderScheduler {
    pool: WorkerPool<Upgrader>,
}

impl UpgraderScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot, dropping upgraders whose unit has died.
    pub fn from_proto(proto: &UpgraderSchedulerProto, host: &dyn Host) -> Self {
        let pool = WorkerPool::restore(
            proto.workers.clone(),
            proto.spawnings.clone(),
            host,
            |p| Upgrader::new(p.name),
        );
        Self { pool }
    }

    /// Snapshot of this scheduler.
    pub fn to_proto(&self) -> UpgraderSchedulerProto {
        UpgraderSchedulerProto {
            workers: self.pool.to_protos(),
            spawnings: self.pool.spawnings().to_vec(),
        }
    }

    /// Live upgraders keyed by unit name.
    pub const fn workers(&self) -> &BTreeMap<String, Upgrader> {
        self.pool.workers()
    }
}

impl Scheduler for UpgraderScheduler {
    fn role(&self) -> Role {
        Role::Upgrader
    }

    fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    fn decide_spawn(
        &self,
        ctx: &ColonyContext<'_>,
        _host: &dyn Host,
    ) -> Result<CreepSpecs, SchedulerError> {
        ctx.ensure_owned()?;
        let cap = ctx.config.population.upgrader.cap(ctx.level);
        let cap = usize::try_from(cap).unwrap_or(usize::MAX);
        if self.pool.num_workers() < cap {
            Ok(ctx.specs_for(Role::Upgrader))
        } else {
            Ok(CreepSpecs::empty())
        }
    }

    fn spawning(&mut self, specs: &CreepSpecs) {
        self.pool.spawning(specs);
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, host: &mut dyn Host) -> bool {
        self.pool.run(ctx, &(), host, |_, creep| Upgrader::new(creep.name.clone()))
    }
}
