//! Simulation events.
//!
//! [`BattleEvent`] is a closed sum type with one concretely typed payload per
//! kind. The engine returns events in resolution order; the runtime stamps them
//! with a sequence number and timestamp before publishing.

use crate::catalog::{ProjectileKind, TroopKind};
use crate::scoring::BattleResult;
use crate::state::{BuildingId, Cell, Point, TroopId};

/// Ranged attack descriptor for clients that animate shots.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TroopSpawn {
    pub troop_id: TroopId,
    pub troop_type: TroopKind,
    pub position: Point,
    pub health: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TroopMove {
    pub troop_id: TroopId,
    pub to: Point,
}

/// A defensive building hit a troop.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TroopAttack {
    pub troop_id: TroopId,
    pub remaining_health: u32,
    pub source: BuildingId,
    pub projectile: Option<Projectile>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TroopDeath {
    pub troop_id: TroopId,
    pub position: Point,
}

/// A troop hit a building.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BuildingAttack {
    pub building_id: BuildingId,
    pub remaining_health: u32,
    pub attacker: TroopId,
    pub projectile: Option<Projectile>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BuildingDestroyed {
    pub building_id: BuildingId,
    pub position: Cell,
}

/// Everything observable that happens during a battle.
#[derive(Clone, Debug, PartialEq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleEvent {
    TroopSpawn(TroopSpawn),
    TroopMove(TroopMove),
    TroopAttack(TroopAttack),
    TroopDeath(TroopDeath),
    BuildingAttack(BuildingAttack),
    BuildingDestroyed(BuildingDestroyed),
    BattleEnd(BattleResult),
}

impl BattleEvent {
    /// Wire name, e.g. `TROOP_SPAWN`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn is_battle_end(&self) -> bool {
        matches!(self, Self::BattleEnd(_))
    }
}
