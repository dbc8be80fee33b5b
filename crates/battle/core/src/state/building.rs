use crate::catalog::{BuildingCategory, BuildingKind, DefenseProfile, Loot};

use super::{BuildingId, Cell, Point};

/// A defender structure placed on the grid.
///
/// Identity, footprint and kind never change during a battle; only health (and
/// the defense cooldown) do. A building is destroyed exactly when its health
/// reaches zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    /// Top-left tile of the footprint.
    pub position: Cell,
    pub width: u32,
    pub height: u32,
    pub health: u32,
    pub max_health: u32,
    /// Milliseconds accumulated since the last defensive shot.
    pub cooldown_ms: u32,
}

impl Building {
    /// Creates a building with the catalog footprint and health for `kind`.
    pub fn new(id: BuildingId, kind: BuildingKind, position: Cell) -> Self {
        let (width, height) = kind.footprint();
        let health = kind.base_health();
        Self {
            id,
            kind,
            position,
            width,
            height,
            health,
            max_health: health,
            cooldown_ms: kind
                .defense()
                .map(|profile| profile.attack_interval_ms())
                .unwrap_or(0),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    pub fn category(&self) -> BuildingCategory {
        self.kind.category()
    }

    pub fn is_wall(&self) -> bool {
        self.kind.is_wall()
    }

    pub fn is_defense(&self) -> bool {
        self.category() == BuildingCategory::Defense
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    pub fn is_active(&self) -> bool {
        !self.is_destroyed()
    }

    /// Active wall: the only kind of building that obstructs movement and sight.
    pub fn is_active_wall(&self) -> bool {
        self.is_wall() && self.is_active()
    }

    pub fn defense(&self) -> Option<DefenseProfile> {
        self.kind.defense()
    }

    pub fn loot_capacity(&self) -> Loot {
        self.kind.loot()
    }

    /// Geometric center (position plus half extents).
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x as f32 + self.width as f32 / 2.0,
            self.position.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Half-open bounding box test: `[x, x + width) × [y, y + height)`.
    pub fn contains(&self, point: Point) -> bool {
        let left = self.position.x as f32;
        let top = self.position.y as f32;
        point.x >= left
            && point.x < left + self.width as f32
            && point.y >= top
            && point.y < top + self.height as f32
    }

    /// Distance from `point` to the nearest point of the footprint, zero inside it.
    pub fn distance_to(&self, point: Point) -> f32 {
        let left = self.position.x as f32;
        let top = self.position.y as f32;
        let nearest = Point::new(
            point.x.clamp(left, left + self.width as f32),
            point.y.clamp(top, top + self.height as f32),
        );
        point.distance(nearest)
    }

    pub fn covers_cell(&self, cell: Cell) -> bool {
        cell.x >= self.position.x
            && cell.x < self.position.x + self.width as i32
            && cell.y >= self.position.y
            && cell.y < self.position.y + self.height as i32
    }

    /// Iterates every tile covered by the footprint.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let origin = self.position;
        (0..self.height as i32).flat_map(move |dy| {
            (0..self.width as i32).map(move |dx| Cell::new(origin.x + dx, origin.y + dy))
        })
    }

    /// Applies damage, clamping at zero. Returns `true` if this hit destroyed the building.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_active = self.is_active();
        self.health = self.health.saturating_sub(damage);
        was_active && self.is_destroyed()
    }
}
