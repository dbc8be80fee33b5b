//! Battle state: the session-owned arena of buildings and troops.
//!
//! [`BattleState`] is owned by exactly one session and handed to
//! [`crate::engine::BattleEngine`] by exclusive reference each tick. Nothing
//! else keeps references into it across ticks.

mod building;
mod common;
mod troop;

pub use building::Building;
pub use common::{BuildingId, Cell, Point, TroopId};
pub(crate) use common::sample_segment;
pub use troop::{TargetInfo, Troop};

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::TroopKind;
use crate::config::BattleConfig;
use crate::error::LayoutError;
use crate::scoring::BattleResult;

/// Lifecycle of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleStatus {
    /// Accepting deployments; defenses hold fire.
    Preparing,
    /// Ticking; defenses fire and destruction is tracked.
    Active,
    /// Terminal.
    Ended,
}

/// Remaining deployable troops per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Army {
    remaining: BTreeMap<TroopKind, u32>,
}

impl Army {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, kind: TroopKind, count: u32) -> Self {
        self.add(kind, count);
        self
    }

    pub fn add(&mut self, kind: TroopKind, count: u32) {
        *self.remaining.entry(kind).or_insert(0) += count;
    }

    pub fn remaining(&self, kind: TroopKind) -> u32 {
        self.remaining.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_remaining(&self) -> u32 {
        self.remaining.values().sum()
    }

    /// The deployment window closes once every declared troop is on the field.
    pub fn is_exhausted(&self) -> bool {
        self.total_remaining() == 0
    }

    /// Takes one troop of `kind` out of the roster. Returns `false` if none are left.
    pub(crate) fn take(&mut self, kind: TroopKind) -> bool {
        match self.remaining.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TroopKind, u32)> + '_ {
        self.remaining.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl FromIterator<(TroopKind, u32)> for Army {
    fn from_iter<I: IntoIterator<Item = (TroopKind, u32)>>(iter: I) -> Self {
        let mut army = Army::new();
        for (kind, count) in iter {
            army.add(kind, count);
        }
        army
    }
}

/// Complete mutable state of one battle.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub status: BattleStatus,
    pub config: BattleConfig,
    /// Buildings in ascending id order.
    pub buildings: Vec<Building>,
    /// Live troops in ascending id order.
    pub troops: Vec<Troop>,
    pub army: Army,
    pub next_troop_id: u32,
    pub tick: u64,
    /// Simulated milliseconds since the battle became active.
    pub elapsed_ms: u64,
    pub result: Option<BattleResult>,
}

impl BattleState {
    /// Seeds a battle from a defender snapshot and the attacker's roster.
    pub fn new(
        mut buildings: Vec<Building>,
        army: Army,
        config: BattleConfig,
    ) -> Result<Self, LayoutError> {
        let mut seen = BTreeSet::new();
        for building in &buildings {
            if !seen.insert(building.id) {
                return Err(LayoutError::DuplicateId { id: building.id });
            }
            if building.width == 0 || building.height == 0 {
                return Err(LayoutError::EmptyFootprint { id: building.id });
            }
            if building.max_health == 0 || building.health == 0 {
                return Err(LayoutError::ZeroHealth { id: building.id });
            }
            let far_x = building.position.x + building.width as i32 - 1;
            let far_y = building.position.y + building.height as i32 - 1;
            if !BattleConfig::in_bounds(building.position.x, building.position.y)
                || !BattleConfig::in_bounds(far_x, far_y)
            {
                return Err(LayoutError::OutOfBounds { id: building.id });
            }
        }
        buildings.sort_by_key(|building| building.id);

        Ok(Self {
            status: BattleStatus::Preparing,
            config,
            buildings,
            troops: Vec::new(),
            army,
            next_troop_id: 0,
            tick: 0,
            elapsed_ms: 0,
            result: None,
        })
    }

    pub fn is_ended(&self) -> bool {
        self.status == BattleStatus::Ended
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.building_index(id).map(|index| &self.buildings[index])
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.building_index(id).map(|index| &mut self.buildings[index])
    }

    pub(crate) fn building_index(&self, id: BuildingId) -> Option<usize> {
        self.buildings
            .binary_search_by_key(&id, |building| building.id)
            .ok()
    }

    pub fn troop(&self, id: TroopId) -> Option<&Troop> {
        self.troops.iter().find(|troop| troop.id == id)
    }

    /// Non-wall buildings still standing.
    pub fn remaining_targets(&self) -> usize {
        self.buildings
            .iter()
            .filter(|building| !building.is_wall() && building.is_active())
            .count()
    }

    pub fn living_troops(&self) -> usize {
        self.troops.iter().filter(|troop| troop.is_alive()).count()
    }

    /// Active wall covering `cell`, if any.
    pub fn wall_at(&self, cell: Cell) -> Option<&Building> {
        self.buildings
            .iter()
            .find(|building| building.is_active_wall() && building.covers_cell(cell))
    }
}
