//! The host tick loop.
//!
//! Paces [`Hive::tick`] with a `tokio` interval, advancing the simulated
//! world after every tick. A tick that returns an error is logged and the
//! loop carries on, the way a game host's error boundary would.

use std::time::Duration;

use hive_core::{Hive, TickSummary};
use hive_world::{Host, SimWorld};
use tracing::{error, info};

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Ticks driven.
    pub ticks: u64,
    /// Spawns issued across every colony.
    pub spawns: usize,
    /// Colony failures plus failed ticks.
    pub failures: usize,
    /// Summary of the last successful tick.
    pub last: Option<TickSummary>,
}

/// Drive `max_ticks` ticks, one every `interval`.
pub async fn run(hive: &mut Hive, world: &mut SimWorld, max_ticks: u64, interval: Duration) -> RunResult {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    let mut result = RunResult::default();

    while result.ticks < max_ticks {
        ticker.tick().await;
        match hive.tick(world) {
            Ok(summary) => {
                result.spawns = result.spawns.saturating_add(summary.spawns.len());
                result.failures = result.failures.saturating_add(summary.failures);
                for spawn in &summary.spawns {
                    info!(
                        tick = summary.tick,
                        role = %spawn.role,
                        creep = %spawn.name,
                        spawn = %spawn.spawn,
                        "Spawned"
                    );
                }
                result.last = Some(summary);
            }
            Err(e) => {
                error!(tick = world.time(), error = %e, "Tick failed");
                result.failures = result.failures.saturating_add(1);
            }
        }
        world.advance();
        result.ticks = result.ticks.saturating_add(1);
    }

    info!(
        ticks = result.ticks,
        spawns = result.spawns,
        failures = result.failures,
        creeps = world.creep_count(),
        "Run finished"
    );
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_core::HiveConfig;
    use hive_world::create_starting_world;

    use super::*;

    #[tokio::test]
    async fn drives_the_starting_world() {
        let mut world = create_starting_world().unwrap();
        let mut hive = Hive::new(HiveConfig::default());
        let result = run(&mut hive, &mut world, 30, Duration::from_millis(1)).await;
        assert_eq!(result.ticks, 30);
        assert_eq!(world.time(), 30);
        assert_eq!(result.failures, 0);
        assert!(result.spawns >= 1);
        assert_eq!(result.last.unwrap().tick, 29);
    }

    #[tokio::test]
    async fn corrupt_memory_does_not_stop_the_loop() {
        let mut world = create_starting_world().unwrap();
        world.set_raw_memory(String::from("{broken"));
        let mut hive = Hive::new(HiveConfig::default());
        let result = run(&mut hive, &mut world, 3, Duration::from_millis(1)).await;
        assert_eq!(result.ticks, 3);
        assert_eq!(result.failures, 3);
        assert!(result.last.is_none());
    }
}
