//! The persisted state store.
//!
//! The host hands the core one opaque blob at the start of a tick and
//! takes it back at the end. [`StateStore`] is its parsed form: colony
//! snapshots keyed by primary room, plus any other top-level keys the host
//! keeps in the same blob, which are carried through untouched.

use std::collections::BTreeMap;

use hive_types::{ColonyProto, RoomName};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Parsed persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore {
    /// Colony snapshots keyed by primary room.
    #[serde(default)]
    colonies: BTreeMap<RoomName, ColonyProto>,
    /// Top-level keys owned by someone else.
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

impl StateStore {
    /// Parse a blob. An empty or whitespace-only blob is an empty store.
    pub fn load(blob: &str) -> Result<Self, StoreError> {
        if blob.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(blob).map_err(|source| StoreError::Parse { source })
    }

    /// Encode for the host.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|source| StoreError::Serialize { source })
    }

    /// Snapshot of one colony.
    pub fn colony(&self, room: &RoomName) -> Option<&ColonyProto> {
        self.colonies.get(room)
    }

    /// Every colony snapshot in room-name order.
    pub const fn colonies(&self) -> &BTreeMap<RoomName, ColonyProto> {
        &self.colonies
    }

    /// Insert or replace a colony snapshot.
    pub fn upsert(&mut self, proto: ColonyProto) {
        self.colonies.insert(proto.room.clone(), proto);
    }

    /// Forget a colony.
    pub fn remove(&mut self, room: &RoomName) -> Option<ColonyProto> {
        self.colonies.remove(room)
    }
}
