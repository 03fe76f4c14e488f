//! The per-tick entry point.
//!
//! A [`Hive`] owns every [`Colony`] of the controlling party. The host
//! calls [`Hive::tick`] exactly once per tick; it runs synchronously and
//! never carries work past the tick boundary.
//!
//! Each tick runs through these phases:
//!
//! 1. **Load** -- parse the [`StateStore`] from the host's memory blob.
//! 2. **Restore** -- on a cold start only, rebuild every colony from its
//!    snapshot. A warm hive keeps its colonies between ticks so worker
//!    phases and cached targets survive.
//! 3. **Teardown** -- drop colonies whose primary room is no longer visible
//!    and owned.
//! 4. **Bootstrap** -- found a colony for every newly owned room, initialize
//!    it and persist it before any arbitration runs.
//! 5. **Run** -- run every colony in room-name order. A failing colony is
//!    logged and skipped; the others still run.
//! 6. **Persist** -- write the store back once, only if anything changed.

use std::collections::{BTreeMap, BTreeSet};

use hive_types::RoomName;
use hive_world::Host;
use tracing::{debug, error, info};

use crate::colony::{Colony, SpawnIssued};
use crate::config::HiveConfig;
use crate::error::HiveError;
use crate::store::StateStore;

/// What happened during one [`Hive::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Host tick this summary belongs to.
    pub tick: u64,
    /// Colonies that completed their run.
    pub colonies_run: usize,
    /// Spawns issued, in colony order.
    pub spawns: Vec<SpawnIssued>,
    /// Colonies that failed to initialize or run.
    pub failures: usize,
    /// Whether the memory blob was written at the end of the tick.
    pub memory_written: bool,
    /// Rooms that got a fresh colony this tick.
    pub bootstrapped: Vec<RoomName>,
    /// Rooms whose colony was dropped this tick.
    pub torn_down: Vec<RoomName>,
}

/// Every colony of the controlling party, kept alive across ticks.
#[derive(Debug, Clone)]
pub struct Hive {
    config: HiveConfig,
    colonies: BTreeMap<RoomName, Colony>,
    warm: bool,
}

impl Hive {
    /// A cold hive. The first tick restores colonies from the host's blob.
    pub const fn new(config: HiveConfig) -> Self {
        Self {
            config,
            colonies: BTreeMap::new(),
            warm: false,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &HiveConfig {
        &self.config
    }

    /// Live colonies keyed by primary room.
    pub const fn colonies(&self) -> &BTreeMap<RoomName, Colony> {
        &self.colonies
    }

    /// One colony by primary room.
    pub fn colony(&self, room: &RoomName) -> Option<&Colony> {
        self.colonies.get(room)
    }

    /// Forget every runtime colony. The next tick restores from the blob.
    pub fn reset(&mut self) {
        self.colonies.clear();
        self.warm = false;
    }

    /// Run one tick against the host.
    ///
    /// # Errors
    ///
    /// Returns [`HiveError::Store`] when the memory blob cannot be parsed
    /// or written. Colony failures are logged and counted in the summary.
    pub fn tick(&mut self, host: &mut dyn Host) -> Result<TickSummary, HiveError> {
        let mut summary = TickSummary {
            tick: host.time(),
            ..TickSummary::default()
        };
        let mut store = StateStore::load(host.raw_memory())?;
        let mut dirty = false;

        if !self.warm {
            self.colonies = store
                .colonies()
                .values()
                .map(|proto| (proto.room.clone(), Colony::from_proto(proto, &*host)))
                .collect();
            self.warm = true;
            info!(colonies = self.colonies.len(), "Colonies restored from memory");
        }

        // Teardown
        let owned: BTreeSet<RoomName> = host.owned_rooms().into_iter().collect();
        let stale: BTreeSet<RoomName> = self
            .colonies
            .keys()
            .chain(store.colonies().keys())
            .filter(|room| !owned.contains(*room))
            .cloned()
            .collect();
        for room in stale {
            self.colonies.remove(&room);
            store.remove(&room);
            info!(room = %room, "Colony torn down");
            summary.torn_down.push(room);
            dirty = true;
        }

        // Bootstrap
        for room in &owned {
            if self.colonies.contains_key(room) {
                continue;
            }
            let mut colony = Colony::new(room.clone());
            if let Err(e) = colony.initialize(&*host, &self.config) {
                error!(room = %room, error = %e, "Colony initialization failed");
                summary.failures = summary.failures.saturating_add(1);
                continue;
            }
            store.upsert(colony.to_proto());
            host.set_raw_memory(store.to_json()?);
            summary.memory_written = true;
            info!(room = %room, "Colony founded");
            self.colonies.insert(room.clone(), colony);
            summary.bootstrapped.push(room.clone());
        }

        // Run
        for (room, colony) in &mut self.colonies {
            match colony.run(host, &self.config) {
                Ok(outcome) => {
                    summary.colonies_run = summary.colonies_run.saturating_add(1);
                    if let Some(spawn) = outcome.spawned {
                        summary.spawns.push(spawn);
                    }
                    if outcome.changed || store.colony(room).is_none() {
                        store.upsert(colony.to_proto());
                        dirty = true;
                    }
                }
                Err(e) => {
                    error!(room = %room, error = %e, "Colony tick failed");
                    summary.failures = summary.failures.saturating_add(1);
                }
            }
        }

        // Persist
        if dirty {
            host.set_raw_memory(store.to_json()?);
            summary.memory_written = true;
        }
        debug!(
            tick = summary.tick,
            colonies = summary.colonies_run,
            spawns = summary.spawns.len(),
            failures = summary.failures,
            written = summary.memory_written,
            "Tick complete"
        );
        Ok(summary)
    }
}
