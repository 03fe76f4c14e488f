//! Simulation host for the Hive colony scheduler.
//!
//! Stands in for the game host: it owns an in-memory world, calls
//! [`Hive::tick`] once per simulated tick and advances the world in
//! between.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hive-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the starting world
//! 4. Run the tick loop for `world.max_ticks` ticks
//!
//! [`Hive::tick`]: hive_core::Hive::tick

mod driver;
mod error;

use std::path::Path;
use std::time::Duration;

use hive_core::{Hive, HiveConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the configuration or the starting world cannot be
/// loaded. Tick failures are logged and do not end the run.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "hive-engine starting"
    );

    // 3. Create the starting world.
    let mut world = hive_world::create_starting_world()?;

    // 4. Run.
    let max_ticks = config.world.max_ticks;
    let interval = Duration::from_millis(config.world.tick_interval_ms);
    let mut hive = Hive::new(config);
    let result = driver::run(&mut hive, &mut world, max_ticks, interval).await;

    info!(
        total_ticks = result.ticks,
        spawns = result.spawns,
        failures = result.failures,
        colonies = hive.colonies().len(),
        "hive-engine shutdown complete"
    );
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &HiveConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration from `hive-config.yaml` in the working directory,
/// falling back to defaults when the file is absent.
fn load_config() -> Result<HiveConfig, EngineError> {
    let config_path = Path::new("hive-config.yaml");
    if config_path.exists() {
        Ok(HiveConfig::from_file(config_path)?)
    } else {
        Ok(HiveConfig::default())
    }
}
