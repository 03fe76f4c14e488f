//! Repair-points policy.
//!
//! A structure's repair points are how many hit points a builder should
//! restore before the structure counts as healthy. The ceiling depends on
//! the structure kind and, for the defensive perimeter, the room's control
//! level:
//!
//! - walls and ramparts: a per-level ceiling (nothing below level 3)
//! - roads: half of maximum hit points
//! - invader cores: never repaired
//! - everything else: maximum hit points
//!
//! Negative deficits floor at zero.

use hive_types::{Structure, StructureKind};

/// Rampart hit-point ceiling by control level.
pub const RAMPART_HITS_BY_LEVEL: [u32; 9] = [
    0, 0, 0, 50_000, 50_000, 50_000, 50_000, 50_000, 50_000,
];

/// Wall hit-point ceiling by control level.
pub const WALL_HITS_BY_LEVEL: [u32; 9] = [
    0, 0, 0, 50_000, 50_000, 50_000, 50_000, 50_000, 50_000,
];

/// Look up a per-level ceiling, clamping levels above the table.
fn ceiling(table: &[u32; 9], level: u8) -> u32 {
    table
        .get(usize::from(level))
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

/// Hit points the structure should regain, given the room's control level.
pub fn repair_points(structure: &Structure, level: u8) -> u32 {
    let target = match structure.kind {
        StructureKind::Rampart => ceiling(&RAMPART_HITS_BY_LEVEL, level),
        StructureKind::Wall => ceiling(&WALL_HITS_BY_LEVEL, level),
        StructureKind::Road => structure.hits_max.checked_div(2).unwrap_or(0),
        StructureKind::InvaderCore => return 0,
        _ => structure.hits_max,
    };
    target.saturating_sub(structure.hits)
}

/// Whether a builder should consider repairing the structure.
pub fn needs_repair(structure: &Structure, level: u8) -> bool {
    repair_points(structure, level) > 0
}
