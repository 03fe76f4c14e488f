//! Persisted snapshot shapes.
//!
//! The host keeps one key-value blob that round-trips exactly between
//! ticks. Under it the core stores a mapping from primary room name to a
//! [`ColonyProto`], which nests one snapshot per role scheduler, which in
//! turn lists every tracked worker as `{ name, work }`.
//!
//! Field names are camel-cased so the blob reads naturally from a
//! JavaScript host; the `ts-rs` derives emit matching `TypeScript`
//! declarations.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Role;
use crate::ids::{ObjectId, RoomName};

/// A worker as persisted: the unit it is bound to plus its work payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WorkerProto<W> {
    /// Name of the bound unit.
    pub name: String,
    /// Role-specific task state.
    pub work: W,
}

/// Work payload for roles that keep no persistent task state.
///
/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IdleWork {}

/// Work payload of a miner: the node it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MinerWork {
    /// Claimed source, mineral or deposit. Absent when nothing was free at
    /// assignment time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub target_id: Option<ObjectId>,
}

/// Snapshot of a scheduler whose only state is its worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SchedulerProto<W> {
    /// Tracked workers.
    pub workers: Vec<WorkerProto<W>>,
    /// Names of units requested but not yet materialized.
    #[serde(default)]
    pub spawnings: Vec<String>,
}

/// Snapshot of the distributor scheduler.
pub type DistributorSchedulerProto = SchedulerProto<IdleWork>;

/// Snapshot of the upgrader scheduler.
pub type UpgraderSchedulerProto = SchedulerProto<IdleWork>;

/// Snapshot of the builder scheduler.
pub type BuilderSchedulerProto = SchedulerProto<IdleWork>;

/// Snapshot of the miner scheduler, including its shared target set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MinerSchedulerProto {
    /// Tracked workers.
    pub workers: Vec<WorkerProto<MinerWork>>,
    /// Harvestable nodes discovered when the colony was founded.
    pub targets: Vec<ObjectId>,
    /// Names of units requested but not yet materialized.
    #[serde(default)]
    pub spawnings: Vec<String>,
}

/// One snapshot per role scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SchedulerProtos {
    /// Miner scheduler.
    pub miner_scheduler: MinerSchedulerProto,
    /// Distributor scheduler.
    pub distributor_scheduler: SchedulerProto<IdleWork>,
    /// Upgrader scheduler.
    pub upgrader_scheduler: SchedulerProto<IdleWork>,
    /// Builder scheduler.
    pub builder_scheduler: SchedulerProto<IdleWork>,
}

/// Snapshot of a colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ColonyProto {
    /// Primary room.
    pub room: RoomName,
    /// Auxiliary rooms the colony also operates in.
    pub remote_rooms: Vec<RoomName>,
    /// Per-role scheduler snapshots.
    pub schedulers: SchedulerProtos,
}

/// Memory attached to a unit when its spawn is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreepMemory {
    /// Role the unit was requested for.
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn miner_work_layout() {
        let proto = WorkerProto {
            name: String::from("NMhv-12"),
            work: MinerWork {
                target_id: Some(ObjectId::from("src1")),
            },
        };
        let json = serde_json::to_string(&proto).unwrap();
        assert_eq!(json, r#"{"name":"NMhv-12","work":{"targetId":"src1"}}"#);
    }

    #[test]
    fn idle_work_is_empty_object() {
        let proto = WorkerProto {
            name: String::from("VBIt-3"),
            work: IdleWork {},
        };
        let json = serde_json::to_string(&proto).unwrap();
        assert_eq!(json, r#"{"name":"VBIt-3","work":{}}"#);
    }

    #[test]
    fn empty_spawnings_are_written_out() {
        let proto = SchedulerProto::<IdleWork>::default();
        let json = serde_json::to_string(&proto).unwrap();
        assert_eq!(json, r#"{"workers":[],"spawnings":[]}"#);

        let miner = serde_json::to_value(MinerSchedulerProto::default()).unwrap();
        assert!(miner["spawnings"].is_array());

        // Blobs written before the field existed still load.
        let back: SchedulerProto<IdleWork> = serde_json::from_str(r#"{"workers":[]}"#).unwrap();
        assert!(back.spawnings.is_empty());
    }

    #[test]
    fn colony_layout_uses_camel_case() {
        let proto = ColonyProto {
            room: RoomName::from("W1N1"),
            remote_rooms: vec![RoomName::from("W2N1")],
            schedulers: SchedulerProtos::default(),
        };
        let value = serde_json::to_value(&proto).unwrap();
        assert_eq!(value["room"], "W1N1");
        assert_eq!(value["remoteRooms"][0], "W2N1");
        assert!(value["schedulers"]["minerScheduler"]["targets"].is_array());
        assert!(value["schedulers"]["builderScheduler"]["workers"].is_array());
    }
}
