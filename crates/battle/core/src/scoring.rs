//! Final battle accounting: destruction percentage, stars and loot.
//!
//! Scoring policy:
//! - destruction % = destroyed non-wall buildings / non-wall buildings × 100,
//!   floored (100 when the layout has no non-wall building)
//! - one star at the configured threshold (50 %), one for destroying a town
//!   hall, one for 100 %
//! - loot = each building's capacity scaled by the fraction of health lost

use crate::catalog::{BuildingKind, Loot};
use crate::config::BattleConfig;
use crate::state::Building;

/// Why a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    /// Every non-wall building is destroyed.
    AllDestroyed,
    /// No living troops and nothing left to deploy.
    OutOfTroops,
    /// Duration cap reached.
    TimeUp,
    /// Attacker ended the battle.
    Surrendered,
    /// Attacker disconnected and never came back.
    Abandoned,
    /// Internal invariant violation.
    Failed,
}

/// Payload of `BATTLE_END` and the record handed to persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BattleResult {
    pub destruction_percentage: u8,
    pub stars: u8,
    pub loot_gold: u64,
    pub loot_elixir: u64,
    pub duration_ms: u64,
    pub outcome: BattleOutcome,
    /// Present when `outcome` is [`BattleOutcome::Failed`].
    pub error: Option<String>,
}

impl BattleResult {
    pub fn compute(
        buildings: &[Building],
        config: &BattleConfig,
        duration_ms: u64,
        outcome: BattleOutcome,
        error: Option<String>,
    ) -> Self {
        let destruction_percentage = destruction_percentage(buildings);
        let loot = loot(buildings);
        Self {
            destruction_percentage,
            stars: stars(destruction_percentage, town_hall_destroyed(buildings), config),
            loot_gold: loot.gold,
            loot_elixir: loot.elixir,
            duration_ms,
            outcome,
            error,
        }
    }
}

pub fn destruction_percentage(buildings: &[Building]) -> u8 {
    let (total, destroyed) = buildings
        .iter()
        .filter(|building| !building.is_wall())
        .fold((0u32, 0u32), |(total, destroyed), building| {
            (total + 1, destroyed + u32::from(building.is_destroyed()))
        });
    if total == 0 {
        return 100;
    }
    (destroyed * 100 / total) as u8
}

pub fn town_hall_destroyed(buildings: &[Building]) -> bool {
    buildings
        .iter()
        .any(|building| building.kind == BuildingKind::TownHall && building.is_destroyed())
}

pub fn stars(destruction_percentage: u8, town_hall_destroyed: bool, config: &BattleConfig) -> u8 {
    u8::from(destruction_percentage >= config.one_star_percentage)
        + u8::from(town_hall_destroyed)
        + u8::from(destruction_percentage >= 100)
}

pub fn loot(buildings: &[Building]) -> Loot {
    buildings
        .iter()
        .map(|building| {
            let capacity = building.loot_capacity();
            if capacity.is_empty() || building.max_health == 0 {
                return Loot::NONE;
            }
            let lost = u64::from(building.max_health - building.health.min(building.max_health));
            let max = u64::from(building.max_health);
            Loot::new(capacity.gold * lost / max, capacity.elixir * lost / max)
        })
        .fold(Loot::NONE, |total, loot| total + loot)
}
