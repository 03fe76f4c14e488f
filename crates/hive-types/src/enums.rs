//! Enumeration types shared by the scheduler core and the host boundary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// A worker role. Each role has its own scheduler and worker state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Moves energy from the pickup point into spawns, extensions and towers.
    Distributor,
    /// Sits on a source or mineral and harvests it.
    Miner,
    /// Feeds the room controller.
    Upgrader,
    /// Repairs damaged structures and works construction sites.
    Builder,
}

impl Role {
    /// Spawn arbitration order, highest priority first. Schedulers also
    /// advance in this order.
    pub const PRIORITY: [Self; 4] = [Self::Distributor, Self::Miner, Self::Upgrader, Self::Builder];

    /// Lowercase role name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distributor => "distributor",
            Self::Miner => "miner",
            Self::Upgrader => "upgrader",
            Self::Builder => "builder",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Body parts
// ---------------------------------------------------------------------------

/// A capability part in a unit's loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BodyPart {
    /// Harvest, build, repair and upgrade power.
    Work,
    /// 50 units of carry capacity.
    Carry,
    /// Reduces fatigue.
    Move,
}

impl BodyPart {
    /// Energy cost of spawning this part.
    pub const fn cost(self) -> u32 {
        match self {
            Self::Work => 100,
            Self::Carry | Self::Move => 50,
        }
    }

    /// Total energy cost of a loadout.
    pub fn body_cost(parts: &[Self]) -> u32 {
        parts
            .iter()
            .fold(0_u32, |acc, part| acc.saturating_add(part.cost()))
    }
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// Kind of a built structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Unit spawning facility.
    Spawn,
    /// Extra spawn energy capacity.
    Extension,
    /// Transit path; decays quickly.
    Road,
    /// Defensive perimeter wall.
    Wall,
    /// Defensive perimeter rampart.
    Rampart,
    /// Small energy buffer, usually next to a source.
    Container,
    /// Bulk energy storage, one per room.
    Storage,
    /// Defensive turret.
    Tower,
    /// Inter-room transfer terminal.
    Terminal,
    /// Enables mineral harvesting.
    Extractor,
    /// Hostile-origin structure; never repaired.
    InvaderCore,
}

impl StructureKind {
    /// Whether this kind is a delivery target for distributors.
    pub const fn is_fill_target(self) -> bool {
        matches!(self, Self::Spawn | Self::Extension | Self::Tower | Self::Terminal)
    }

    /// Whether this kind contributes to a room's spawn energy.
    pub const fn holds_spawn_energy(self) -> bool {
        matches!(self, Self::Spawn | Self::Extension)
    }
}

/// Kind of a harvestable resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Energy source.
    Source,
    /// Rare mineral deposit.
    Mineral,
    /// Highway deposit.
    Deposit,
}

/// Type of a resource lying on the ground or held in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Energy.
    Energy,
    /// Any harvested mineral.
    Mineral,
}

// ---------------------------------------------------------------------------
// Action results
// ---------------------------------------------------------------------------

/// Status code returned by a host action primitive.
///
/// The core only special-cases [`ActionStatus::NotInRange`], which turns into
/// a move toward the target. Every other failure is retried implicitly on
/// the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The action was accepted.
    Ok,
    /// The target is further away than the action allows.
    NotInRange,
    /// The unit (or spawn) is still busy spawning.
    Busy,
    /// The actor lacks the energy or resource needed.
    NotEnoughResources,
    /// The receiving store is full.
    Full,
    /// The target does not exist or is of the wrong kind.
    InvalidTarget,
    /// The acting unit or facility does not exist.
    NotFound,
    /// A unit with the requested name already exists.
    NameExists,
    /// The actor lacks the body part the action needs.
    NoBodyPart,
    /// The unit already moved this tick.
    Tired,
}

impl ActionStatus {
    /// Whether the action was accepted.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_fixed() {
        assert_eq!(
            Role::PRIORITY,
            [Role::Distributor, Role::Miner, Role::Upgrader, Role::Builder]
        );
    }

    #[test]
    fn body_cost_sums_parts() {
        assert_eq!(BodyPart::body_cost(&[BodyPart::Work, BodyPart::Work, BodyPart::Move]), 250);
        assert_eq!(BodyPart::body_cost(&[]), 0);
    }

    #[test]
    fn fill_targets() {
        assert!(StructureKind::Extension.is_fill_target());
        assert!(StructureKind::Terminal.is_fill_target());
        assert!(!StructureKind::Storage.is_fill_target());
        assert!(!StructureKind::Road.is_fill_target());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::Distributor).ok();
        assert_eq!(json.as_deref(), Some("\"distributor\""));
    }
}
