//! Configuration loading and typed config structures for the Hive scheduler.
//!
//! The canonical configuration lives in `hive-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields the stock early-game colony behaviour.

use std::path::Path;

use hive_types::{BodyPart, Role};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HiveConfig {
    /// Simulation settings (seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Per-role loadouts and name prefixes.
    #[serde(default)]
    pub spawning: SpawningConfig,

    /// Population targets and thresholds.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Distributor tuning.
    #[serde(default)]
    pub distributor: DistributorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HiveConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Simulation-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Seed for every random choice the scheduler makes. Mixed with the
    /// tick number so each tick draws from its own stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between simulated ticks in the engine binary.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of ticks the engine binary runs before exiting.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Loadout and name prefix for one role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BodyConfig {
    /// Prefix of generated unit names, followed by `-{tick}`.
    pub prefix: String,

    /// Ordered body parts.
    pub parts: Vec<BodyPart>,
}

impl BodyConfig {
    fn new(prefix: &str, parts: &[BodyPart]) -> Self {
        Self {
            prefix: prefix.to_owned(),
            parts: parts.to_vec(),
        }
    }
}

/// Per-role spawn loadouts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawningConfig {
    /// Miner loadout.
    #[serde(default = "default_miner_body")]
    pub miner: BodyConfig,

    /// Distributor loadout.
    #[serde(default = "default_distributor_body")]
    pub distributor: BodyConfig,

    /// Upgrader loadout.
    #[serde(default = "default_upgrader_body")]
    pub upgrader: BodyConfig,

    /// Builder loadout.
    #[serde(default = "default_builder_body")]
    pub builder: BodyConfig,
}

impl SpawningConfig {
    /// Loadout for a role.
    pub const fn body(&self, role: Role) -> &BodyConfig {
        match role {
            Role::Miner => &self.miner,
            Role::Distributor => &self.distributor,
            Role::Upgrader => &self.upgrader,
            Role::Builder => &self.builder,
        }
    }
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            miner: default_miner_body(),
            distributor: default_distributor_body(),
            upgrader: default_upgrader_body(),
            builder: default_builder_body(),
        }
    }
}

/// How many upgraders a colony keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UpgraderPolicy {
    /// A fixed population regardless of control level.
    Flat {
        /// Population cap.
        cap: u32,
    },
    /// One upgrader per control level, up to `max`.
    ScaledByLevel {
        /// Upper bound on the population.
        max: u32,
    },
}

impl UpgraderPolicy {
    /// Population cap at a control level.
    pub fn cap(self, level: u8) -> u32 {
        match self {
            Self::Flat { cap } => cap,
            Self::ScaledByLevel { max } => u32::from(level).min(max),
        }
    }
}

impl Default for UpgraderPolicy {
    fn default() -> Self {
        Self::Flat { cap: 3 }
    }
}

/// Population targets and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Distributors kept at every control level.
    #[serde(default = "default_distributor_target")]
    pub distributor_target: u32,

    /// Control level from which miners also work minerals.
    #[serde(default = "default_mineral_level")]
    pub mineral_level: u8,

    /// Outstanding build progress one builder is expected to absorb.
    #[serde(default = "default_builder_work_per_unit")]
    pub builder_work_per_unit: u32,

    /// Divisor putting repair points on the same footing as build progress.
    #[serde(default = "default_repair_scale_down")]
    pub repair_scale_down: u32,

    /// Upgrader population policy.
    #[serde(default)]
    pub upgrader: UpgraderPolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            distributor_target: default_distributor_target(),
            mineral_level: default_mineral_level(),
            builder_work_per_unit: default_builder_work_per_unit(),
            repair_scale_down: default_repair_scale_down(),
            upgrader: UpgraderPolicy::default(),
        }
    }
}

/// Distributor tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DistributorConfig {
    /// Carried energy at which a distributor stops gathering.
    #[serde(default = "default_pickup_threshold")]
    pub pickup_threshold: u32,

    /// Ticks between re-resolving the fill-target list.
    #[serde(default = "default_target_refresh_interval")]
    pub target_refresh_interval: u64,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            pickup_threshold: default_pickup_threshold(),
            target_refresh_interval: default_target_refresh_interval(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    1_500
}

fn default_miner_body() -> BodyConfig {
    BodyConfig::new("NMhv", &[BodyPart::Work, BodyPart::Work, BodyPart::Move])
}

fn default_distributor_body() -> BodyConfig {
    BodyConfig::new("VBIt", &[BodyPart::Carry, BodyPart::Carry, BodyPart::Move])
}

fn default_upgrader_body() -> BodyConfig {
    BodyConfig::new("MLfJ", &[BodyPart::Work, BodyPart::Carry, BodyPart::Move])
}

fn default_builder_body() -> BodyConfig {
    BodyConfig::new(
        "Aerl",
        &[
            BodyPart::Carry,
            BodyPart::Carry,
            BodyPart::Work,
            BodyPart::Move,
            BodyPart::Move,
        ],
    )
}

const fn default_distributor_target() -> u32 {
    1
}

const fn default_mineral_level() -> u8 {
    6
}

const fn default_builder_work_per_unit() -> u32 {
    2_500
}

const fn default_repair_scale_down() -> u32 {
    100
}

const fn default_pickup_threshold() -> u32 {
    50
}

const fn default_target_refresh_interval() -> u64 {
    100
}

fn default_log_level() -> String {
    String::from("info")
}
