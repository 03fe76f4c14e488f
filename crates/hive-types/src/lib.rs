//! Shared type definitions for the Hive colony scheduler.
//!
//! This crate is the single source of truth for the types that cross the
//! host boundary. Snapshot types flow to `TypeScript` via `ts-rs` so the
//! host can type its persisted memory blob.
//!
//! # Modules
//!
//! - [`ids`] -- String-backed identifiers for game objects and rooms
//! - [`enums`] -- Roles, body parts, structure kinds and action status codes
//! - [`structs`] -- Read-only views of live host objects
//! - [`snapshot`] -- Persisted colony, scheduler and worker shapes

pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionStatus, BodyPart, NodeKind, ResourceKind, Role, StructureKind};
pub use ids::{ObjectId, RoomName};
pub use snapshot::{
    BuilderSchedulerProto, ColonyProto, CreepMemory, DistributorSchedulerProto, IdleWork,
    MinerSchedulerProto, MinerWork, SchedulerProto, SchedulerProtos, UpgraderSchedulerProto,
    WorkerProto,
};
pub use structs::{
    ConstructionSite, Controller, Creep, DroppedResource, Position, ROOM_SIZE, ResourceNode,
    Room, Spawn, Store, Structure,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the snapshot types.

    #[test]
    fn export_bindings() {
        // Writes to the `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::ObjectId::export_all();
        let _ = crate::ids::RoomName::export_all();

        // Enums
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::BodyPart::export_all();

        // Snapshot
        let _ = crate::snapshot::IdleWork::export_all();
        let _ = crate::snapshot::MinerWork::export_all();
        let _ = crate::snapshot::WorkerProto::<crate::snapshot::MinerWork>::export_all();
        let _ = crate::snapshot::SchedulerProto::<crate::snapshot::IdleWork>::export_all();
        let _ = crate::snapshot::MinerSchedulerProto::export_all();
        let _ = crate::snapshot::SchedulerProtos::export_all();
        let _ = crate::snapshot::ColonyProto::export_all();
        let _ = crate::snapshot::CreepMemory::export_all();
    }
}
