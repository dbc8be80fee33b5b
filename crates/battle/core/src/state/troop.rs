use crate::catalog::{Archetype, TroopKind, TroopStats};

use super::{BuildingId, Point, TroopId};

/// Target decision produced by the selector and cached on the troop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetInfo {
    /// Building the troop ultimately wants to destroy.
    pub target: BuildingId,
    /// A wall stands between the troop and its target and must go first.
    pub needs_to_destroy_wall: bool,
    pub wall_to_destroy: Option<BuildingId>,
    /// Target is in range and visible; damaged directly without breaching.
    pub can_attack_over_wall: bool,
}

impl TargetInfo {
    /// Plain target with no breach requirement.
    pub const fn direct(target: BuildingId) -> Self {
        Self {
            target,
            needs_to_destroy_wall: false,
            wall_to_destroy: None,
            can_attack_over_wall: false,
        }
    }

    pub const fn over_wall(target: BuildingId) -> Self {
        Self {
            can_attack_over_wall: true,
            ..Self::direct(target)
        }
    }

    pub const fn breach(target: BuildingId, wall: BuildingId) -> Self {
        Self {
            target,
            needs_to_destroy_wall: true,
            wall_to_destroy: Some(wall),
            can_attack_over_wall: false,
        }
    }

    /// Building the troop is currently walking to / hitting.
    pub fn objective(&self) -> BuildingId {
        match (self.needs_to_destroy_wall, self.wall_to_destroy) {
            (true, Some(wall)) => wall,
            _ => self.target,
        }
    }
}

/// A deployed attacker unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Troop {
    pub id: TroopId,
    pub kind: TroopKind,
    pub position: Point,
    pub health: u32,
    pub max_health: u32,
    pub stats: TroopStats,
    /// Milliseconds accumulated since the last attack. Starts charged.
    pub cooldown_ms: u32,
    pub target: Option<TargetInfo>,
}

impl Troop {
    /// Creates a troop with the catalog stats for `kind`.
    pub fn new(id: TroopId, kind: TroopKind, position: Point) -> Self {
        Self::with_stats(id, kind, position, kind.stats())
    }

    pub fn with_stats(id: TroopId, kind: TroopKind, position: Point, stats: TroopStats) -> Self {
        Self {
            id,
            kind,
            position,
            health: stats.health,
            max_health: stats.health,
            stats,
            cooldown_ms: stats.attack_interval_ms(),
            target: None,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: f32) -> Self {
        self.stats.range = range;
        self
    }

    pub fn archetype(&self) -> Archetype {
        self.kind.archetype()
    }

    pub fn damage(&self) -> u32 {
        self.stats.damage
    }

    pub fn range(&self) -> f32 {
        self.stats.range
    }

    pub fn move_speed(&self) -> f32 {
        self.stats.move_speed
    }

    pub fn attack_speed(&self) -> f32 {
        self.stats.attack_speed
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_ready_to_attack(&self) -> bool {
        self.cooldown_ms >= self.stats.attack_interval_ms()
    }

    /// Applies damage, clamping at zero. Returns `true` if this hit killed the troop.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_alive = self.is_alive();
        self.health = self.health.saturating_sub(damage);
        was_alive && !self.is_alive()
    }
}
