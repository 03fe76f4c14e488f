//! Distributor role.
//!
//! Distributors move energy from the colony's pickup point into the
//! structures that consume it: spawns, extensions, towers and terminals.
//! Each one alternates between gathering and delivering:
//!
//! - gathering until carried energy reaches the pickup threshold;
//! - delivering to the closest unfilled target until empty, or until no
//!   unfilled target remains.
//!
//! The pickup and the next delivery target are cached per worker and
//! recomputed when they stop resolving. Both caches are dropped on every
//! phase change and never persisted.

use std::collections::BTreeMap;

use hive_types::{ActionStatus, DistributorSchedulerProto, IdleWork, ObjectId, Position, Role};
use hive_world::{ADJACENT_RANGE, Host};
use tracing::debug;

use crate::error::SchedulerError;
use crate::scheduler::{ColonyContext, Pickup, Scheduler};
use crate::specs::CreepSpecs;
use crate::worker::{Worker, WorkerPool};

/// Worker for one distributor.
#[derive(Debug, Clone)]
pub struct Distributor {
    creep_name: String,
    picking_up: bool,
    pickup: Option<Pickup>,
    next: Option<ObjectId>,
}

impl Distributor {
    /// Bind a distributor to a unit. It starts out gathering.
    pub const fn new(creep_name: String) -> Self {
        Self {
            creep_name,
            picking_up: true,
            pickup: None,
            next: None,
        }
    }

    /// Whether the distributor is in its gathering phase.
    pub const fn is_picking_up(&self) -> bool {
        self.picking_up
    }

    fn reset(&mut self) {
        self.pickup = None;
        self.next = None;
    }

    fn switch_to(&mut self, picking_up: bool) {
        self.reset();
        self.picking_up = picking_up;
    }

    fn carried(&self, host: &dyn Host) -> Option<(Position, u32)> {
        host.creep(&self.creep_name)
            .map(|c| (c.pos.clone(), c.store.used()))
    }

    /// Closest target with free capacity, excluding `skip`.
    fn closest_unfilled(
        from: &Position,
        targets: &[ObjectId],
        skip: Option<&ObjectId>,
        host: &dyn Host,
    ) -> Option<ObjectId> {
        targets
            .iter()
            .filter(|id| Some(*id) != skip)
            .filter_map(|id| host.structure(id))
            .filter(|s| s.free_capacity() > 0)
            .min_by_key(|s| from.range_to(&s.pos))
            .map(|s| s.id.clone())
    }

    /// Cached next target while it still needs energy, else the closest.
    fn next_target(&mut self, from: &Position, targets: &[ObjectId], host: &dyn Host) -> Option<ObjectId> {
        let still_valid = self
            .next
            .as_ref()
            .and_then(|id| host.structure(id))
            .is_some_and(|s| s.free_capacity() > 0);
        if !still_valid {
            self.next = Self::closest_unfilled(from, targets, None, host);
        }
        self.next.clone()
    }

    /// One delivery step. Returns `false` when there is nothing to deliver
    /// to, in which case the caller falls back to gathering.
    fn deliver(&mut self, ctx: &ColonyContext<'_>, targets: &[ObjectId], host: &mut dyn Host) -> bool {
        let Some((pos, carried)) = self.carried(host) else {
            return true;
        };
        let Some(target_id) = self.next_target(&pos, targets, host) else {
            return false;
        };
        let Some((target_pos, needed)) = host
            .structure(&target_id)
            .map(|s| (s.pos.clone(), s.free_capacity()))
        else {
            return false;
        };

        if !pos.in_range_to(&target_pos, ADJACENT_RANGE) {
            host.move_to(&self.creep_name, &target_pos);
            return true;
        }

        let status = host.transfer(&self.creep_name, &target_id);
        if status != ActionStatus::Ok {
            // Recompute next tick.
            self.next = None;
            return true;
        }

        self.reset();
        let remaining = carried.saturating_sub(needed);
        let next = Self::closest_unfilled(&pos, targets, Some(&target_id), host);
        match next {
            Some(next_id) if remaining > 0 => {
                if let Some(next_pos) = host.structure(&next_id).map(|s| s.pos.clone()) {
                    host.move_to(&self.creep_name, &next_pos);
                }
                self.next = Some(next_id);
            }
            _ => {
                self.picking_up = true;
                if let Some(pickup) = ctx.cached_pickup(&mut self.pickup, host)
                    && let Some(pickup_pos) = pickup.position(host)
                {
                    host.move_to(&self.creep_name, &pickup_pos);
                }
            }
        }
        true
    }

    /// One gathering step.
    fn gather(&mut self, ctx: &ColonyContext<'_>, targets: &[ObjectId], host: &mut dyn Host) {
        let Some(pickup) = ctx.cached_pickup(&mut self.pickup, host) else {
            debug!(creep = %self.creep_name, "No pickup available, idling");
            return;
        };
        let Some((pos, _)) = self.carried(host) else {
            return;
        };
        let Some(pickup_pos) = pickup.position(host) else {
            return;
        };
        if !pos.in_range_to(&pickup_pos, ADJACENT_RANGE) {
            host.move_to(&self.creep_name, &pickup_pos);
            return;
        }

        let status = pickup.collect(&self.creep_name, host);
        debug!(creep = %self.creep_name, status = ?status, "Distributor collected");
        self.pickup = None;

        let threshold = ctx.config.distributor.pickup_threshold;
        let Some((pos, carried)) = self.carried(host) else {
            return;
        };
        if carried >= threshold {
            self.switch_to(false);
            if let Some(next_id) = self.next_target(&pos, targets, host)
                && let Some(next_pos) = host.structure(&next_id).map(|s| s.pos.clone())
            {
                host.move_to(&self.creep_name, &next_pos);
            }
        }
    }
}

impl Worker for Distributor {
    type Work = IdleWork;
    type Shared = [ObjectId];

    fn creep_name(&self) -> &str {
        &self.creep_name
    }

    fn work(&self) -> IdleWork {
        IdleWork {}
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, targets: &[ObjectId], host: &mut dyn Host) {
        let Some((_, carried)) = self.carried(host) else {
            return;
        };
        let threshold = ctx.config.distributor.pickup_threshold;
        if self.picking_up && carried >= threshold {
            self.switch_to(false);
        } else if !self.picking_up && carried == 0 {
            self.switch_to(true);
        }

        if !self.picking_up {
            if self.deliver(ctx, targets, host) {
                return;
            }
            self.switch_to(true);
        }
        self.gather(ctx, targets, host);
    }
}

/// Scheduler for the distributor role.
#[derive(Debug, Clone, Default)]
pub struct DistributorScheduler {
    pool: WorkerPool<Distributor>,
    /// Fill targets in the primary room, shared with every distributor.
    targets: Vec<ObjectId>,
    refreshed_at: Option<u64>,
}

impl DistributorScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot, dropping distributors whose unit has died.
    /// Fill targets are resolved on the next run.
    pub fn from_proto(proto: &DistributorSchedulerProto, host: &dyn Host) -> Self {
        let pool = WorkerPool::restore(
            proto.workers.clone(),
            proto.spawnings.clone(),
            host,
            |p| Distributor::new(p.name),
        );
        Self {
            pool,
            targets: Vec::new(),
            refreshed_at: None,
        }
    }

    /// Snapshot of this scheduler.
    pub fn to_proto(&self) -> DistributorSchedulerProto {
        DistributorSchedulerProto {
            workers: self.pool.to_protos(),
            spawnings: self.pool.spawnings().to_vec(),
        }
    }

    /// Current fill targets.
    pub fn targets(&self) -> &[ObjectId] {
        &self.targets
    }

    /// Live distributors keyed by unit name.
    pub const fn workers(&self) -> &BTreeMap<String, Distributor> {
        self.pool.workers()
    }

    fn refresh_targets(&mut self, ctx: &ColonyContext<'_>, host: &dyn Host) {
        let interval = ctx.config.distributor.target_refresh_interval;
        let due = self
            .refreshed_at
            .is_none_or(|at| ctx.time.saturating_sub(at) >= interval);
        if !due {
            return;
        }
        self.targets = host
            .structures_in(&ctx.room)
            .into_iter()
            .filter(|s| s.kind.is_fill_target())
            .map(|s| s.id.clone())
            .collect();
        self.refreshed_at = Some(ctx.time);
        debug!(room = %ctx.room, targets = self.targets.len(), "Distributor targets refreshed");
    }
}

impl Scheduler for DistributorScheduler {
    fn role(&self) -> Role {
        Role::Distributor
    }

    fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    fn initialize(&mut self, ctx: &ColonyContext<'_>, host: &dyn Host) -> Result<(), SchedulerError> {
        self.refresh_targets(ctx, host);
        Ok(())
    }

    fn decide_spawn(
        &self,
        ctx: &ColonyContext<'_>,
        _host: &dyn Host,
    ) -> Result<CreepSpecs, SchedulerError> {
        ctx.ensure_owned()?;
        let target = usize::try_from(ctx.config.population.distributor_target).unwrap_or(usize::MAX);
        if self.pool.num_workers() < target {
            Ok(ctx.specs_for(Role::Distributor))
        } else {
            Ok(CreepSpecs::empty())
        }
    }

    fn spawning(&mut self, specs: &CreepSpecs) {
        self.pool.spawning(specs);
    }

    fn run(&mut self, ctx: &ColonyContext<'_>, host: &mut dyn Host) -> bool {
        self.refresh_targets(ctx, host);
        self.pool.run(ctx, &self.targets, host, |_, creep| {
            Distributor::new(creep.name.clone())
        })
    }
}
