//! Static village layouts served through [`VillageOracle`].
use std::collections::HashMap;
use std::path::Path;

use battle_core::{LayoutError, VillageLayout};

use crate::types::VillageId;

/// Source of defender snapshots.
///
/// Implementations must hand out immutable copies: a running battle never sees
/// later edits to the village.
pub trait VillageOracle: Send + Sync {
    fn village(&self, id: VillageId) -> Option<VillageLayout>;
}

/// VillageOracle implementation with static layout data
#[derive(Clone, Debug, Default)]
pub struct StaticVillageOracle {
    villages: HashMap<VillageId, VillageLayout>,
}

impl StaticVillageOracle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_village(mut self, id: VillageId, layout: VillageLayout) -> Self {
        self.insert(id, layout);
        self
    }

    pub fn insert(&mut self, id: VillageId, layout: VillageLayout) {
        self.villages.insert(id, layout);
    }

    /// Registers the layout stored as JSON at `path`.
    pub fn load_json(&mut self, id: VillageId, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|err| LayoutError::Malformed(format!("{}: {err}", path.as_ref().display())))?;
        self.insert(id, VillageLayout::from_json(&json)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.villages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.villages.is_empty()
    }
}

impl VillageOracle for StaticVillageOracle {
    fn village(&self, id: VillageId) -> Option<VillageLayout> {
        self.villages.get(&id).cloned()
    }
}
