//! The four role schedulers and their workers.
//!
//! - [`distributor`] -- Fills spawns, extensions, towers and terminals
//! - [`miner`] -- Harvests sources and minerals, one miner per target
//! - [`upgrader`] -- Feeds the room controller
//! - [`builder`] -- Repairs structures and works construction sites

pub mod builder;
pub mod distributor;
pub mod miner;
pub mod upgrader;

pub use builder::{Builder, BuilderScheduler, builder_cap, desired_builders};
pub use distributor::{Distributor, DistributorScheduler};
pub use miner::{Miner, MinerScheduler};
pub use upgrader::{Upgrader, UpgraderScheduler};
