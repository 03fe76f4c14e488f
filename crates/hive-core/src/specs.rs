//! Spawn requests.

use hive_types::{BodyPart, CreepMemory, Role};

use crate::config::BodyConfig;

/// A requested unit: loadout, generated name and initial memory.
///
/// [`CreepSpecs::empty`] is the canonical "no spawn requested" value and
/// [`CreepSpecs::is_empty`] the canonical test for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreepSpecs {
    /// Ordered body parts.
    pub parts: Vec<BodyPart>,
    /// Generated unit name, `{prefix}-{tick}`.
    pub name: String,
    /// Memory handed to the host with the request. `None` only when empty.
    pub memory: Option<CreepMemory>,
}

impl CreepSpecs {
    /// The "no spawn requested" value.
    pub const fn empty() -> Self {
        Self {
            parts: Vec::new(),
            name: String::new(),
            memory: None,
        }
    }

    /// A request for one unit of `role` using its configured loadout.
    pub fn for_role(role: Role, body: &BodyConfig, time: u64) -> Self {
        Self {
            parts: body.parts.clone(),
            name: format!("{}-{time}", body.prefix),
            memory: Some(CreepMemory { role }),
        }
    }

    /// Whether this is the empty value.
    pub const fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawningConfig;

    #[test]
    fn empty_is_empty() {
        assert!(CreepSpecs::empty().is_empty());
        assert_eq!(CreepSpecs::empty(), CreepSpecs::empty());
    }

    #[test]
    fn role_request_carries_prefix_and_tick() {
        let spawning = SpawningConfig::default();
        let specs = CreepSpecs::for_role(Role::Miner, spawning.body(Role::Miner), 1234);
        assert!(!specs.is_empty());
        assert_eq!(specs.name, "NMhv-1234");
        assert_eq!(specs.parts, vec![BodyPart::Work, BodyPart::Work, BodyPart::Move]);
        assert_eq!(specs.memory, Some(CreepMemory { role: Role::Miner }));
    }
}
