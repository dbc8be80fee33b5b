//! Defender village snapshots.
//!
//! A [`VillageLayout`] is the persisted form of a base: building kinds and
//! placements, with optional per-building overrides of the catalog footprint
//! and health. Validation happens in [`crate::state::BattleState::new`].

use crate::catalog::BuildingKind;
#[cfg(feature = "serde")]
use crate::error::LayoutError;
use crate::state::{Building, BuildingId, Cell};

/// One building entry in a village snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingSpec {
    pub id: u32,
    pub kind: BuildingKind,
    pub x: i32,
    pub y: i32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub width: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub height: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub health: Option<u32>,
}

impl BuildingSpec {
    pub fn new(id: u32, kind: BuildingKind, x: i32, y: i32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            width: None,
            height: None,
            health: None,
        }
    }
}

impl From<&BuildingSpec> for Building {
    fn from(spec: &BuildingSpec) -> Self {
        let (width, height) = spec.kind.footprint();
        let mut building = Building::new(BuildingId(spec.id), spec.kind, Cell::new(spec.x, spec.y))
            .with_size(spec.width.unwrap_or(width), spec.height.unwrap_or(height));
        if let Some(health) = spec.health {
            building = building.with_health(health);
        }
        building
    }
}

/// Immutable snapshot of a defender base.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VillageLayout {
    pub buildings: Vec<BuildingSpec>,
}

impl VillageLayout {
    pub fn new(buildings: Vec<BuildingSpec>) -> Self {
        Self { buildings }
    }

    /// Materializes the battle-time buildings.
    pub fn to_buildings(&self) -> Vec<Building> {
        self.buildings.iter().map(Building::from).collect()
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(json).map_err(|err| LayoutError::Malformed(err.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, LayoutError> {
        serde_json::to_string_pretty(self).map_err(|err| LayoutError::Malformed(err.to_string()))
    }
}
