//! Colony orchestration and role scheduling for the Hive colony scheduler.
//!
//! This crate decides, once per host tick, which role needs a new unit,
//! requests it from an idle spawn, binds freshly spawned units to a role
//! worker and drives every worker through one step of its state machine.
//! All state that must survive a tick lives in the host's memory blob.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `hive-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Scheduler, store and tick-level error types.
//! - [`specs`] -- [`CreepSpecs`] spawn requests.
//! - [`scheduler`] -- [`Scheduler`] trait and the per-tick [`ColonyContext`].
//! - [`worker`] -- [`Worker`] trait and the shared [`WorkerPool`].
//! - [`roles`] -- Miner, distributor, upgrader and builder.
//! - [`colony`] -- Spawn arbitration and per-tick colony advancement.
//! - [`store`] -- The parsed memory blob.
//! - [`hive`] -- The tick entry point.
//!
//! [`CreepSpecs`]: specs::CreepSpecs
//! [`Scheduler`]: scheduler::Scheduler
//! [`ColonyContext`]: scheduler::ColonyContext
//! [`Worker`]: worker::Worker
//! [`WorkerPool`]: worker::WorkerPool

pub mod colony;
pub mod config;
pub mod error;
pub mod hive;
pub mod roles;
pub mod scheduler;
pub mod specs;
pub mod store;
pub mod worker;

pub use colony::{Colony, ColonyTick, SpawnIssued};
pub use config::{ConfigError, HiveConfig};
pub use error::{HiveError, SchedulerError, StoreError};
pub use hive::{Hive, TickSummary};
pub use scheduler::{ColonyContext, Pickup, Scheduler};
pub use specs::CreepSpecs;
pub use store::StateStore;
pub use worker::{Worker, WorkerPool};
