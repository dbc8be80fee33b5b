//! Static unit and building definitions.
//!
//! Every [`BuildingKind`] and [`TroopKind`] carries catalog defaults (footprint,
//! health, fire profile, loot, movement). Layouts may override footprint and
//! health per building; troop stats can be replaced wholesale for scenarios.

/// Coarse building grouping used by targeting and scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BuildingCategory {
    Wall,
    Core,
    Defense,
    Resource,
    Army,
}

/// Defender building types.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BuildingKind {
    Wall,
    TownHall,
    Cannon,
    ArcherTower,
    Mortar,
    GoldMine,
    ElixirCollector,
    GoldStorage,
    ElixirStorage,
    ArmyCamp,
    Barracks,
}

impl BuildingKind {
    pub const fn category(self) -> BuildingCategory {
        match self {
            Self::Wall => BuildingCategory::Wall,
            Self::TownHall => BuildingCategory::Core,
            Self::Cannon | Self::ArcherTower | Self::Mortar => BuildingCategory::Defense,
            Self::GoldMine | Self::ElixirCollector | Self::GoldStorage | Self::ElixirStorage => {
                BuildingCategory::Resource
            }
            Self::ArmyCamp | Self::Barracks => BuildingCategory::Army,
        }
    }

    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Default footprint in tiles (width, height).
    pub const fn footprint(self) -> (u32, u32) {
        match self {
            Self::Wall => (1, 1),
            Self::TownHall | Self::ArmyCamp => (4, 4),
            _ => (3, 3),
        }
    }

    pub const fn base_health(self) -> u32 {
        match self {
            Self::Wall => 300,
            Self::TownHall => 1500,
            Self::Cannon => 420,
            Self::ArcherTower => 380,
            Self::Mortar => 400,
            Self::GoldMine | Self::ElixirCollector => 400,
            Self::GoldStorage | Self::ElixirStorage => 600,
            Self::ArmyCamp | Self::Barracks => 250,
        }
    }

    /// Fire profile for defensive buildings, `None` for everything else.
    pub const fn defense(self) -> Option<DefenseProfile> {
        match self {
            Self::Cannon => Some(DefenseProfile {
                range: 9.0,
                min_range: 0.0,
                damage: 8,
                attack_speed: 1.25,
                projectile: ProjectileKind::Cannonball,
            }),
            Self::ArcherTower => Some(DefenseProfile {
                range: 10.0,
                min_range: 0.0,
                damage: 6,
                attack_speed: 1.0,
                projectile: ProjectileKind::Arrow,
            }),
            Self::Mortar => Some(DefenseProfile {
                range: 11.0,
                min_range: 4.0,
                damage: 20,
                attack_speed: 0.2,
                projectile: ProjectileKind::Shell,
            }),
            _ => None,
        }
    }

    /// Resources held by the building and lootable by the attacker.
    pub const fn loot(self) -> Loot {
        match self {
            Self::TownHall => Loot::new(1000, 1000),
            Self::GoldMine => Loot::new(500, 0),
            Self::ElixirCollector => Loot::new(0, 500),
            Self::GoldStorage => Loot::new(2000, 0),
            Self::ElixirStorage => Loot::new(0, 2000),
            _ => Loot::NONE,
        }
    }
}

/// Visual/projectile descriptor attached to ranged attack events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ProjectileKind {
    Arrow,
    Cannonball,
    Shell,
}

/// How a defensive building fires at troops.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseProfile {
    /// Maximum reach measured from the building center.
    pub range: f32,
    /// Troops closer than this are ignored (mortar blind spot).
    pub min_range: f32,
    pub damage: u32,
    /// Shots per second.
    pub attack_speed: f32,
    pub projectile: ProjectileKind,
}

impl DefenseProfile {
    pub fn attack_interval_ms(&self) -> u32 {
        interval_ms(self.attack_speed)
    }

    pub fn covers(&self, distance: f32) -> bool {
        distance >= self.min_range && distance <= self.range
    }
}

/// Gold and elixir amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loot {
    pub gold: u64,
    pub elixir: u64,
}

impl Loot {
    pub const NONE: Self = Self { gold: 0, elixir: 0 };

    pub const fn new(gold: u64, elixir: u64) -> Self {
        Self { gold, elixir }
    }

    pub const fn is_empty(&self) -> bool {
        self.gold == 0 && self.elixir == 0
    }
}

impl std::ops::Add for Loot {
    type Output = Loot;

    fn add(self, rhs: Loot) -> Loot {
        Loot::new(self.gold + rhs.gold, self.elixir + rhs.elixir)
    }
}

/// Behavioral class of a troop; decides its target-selection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Archetype {
    /// Nearest non-wall building, breaching walls on the way.
    GenericMelee,
    /// Shoots over walls when the target is in range and visible.
    Ranged,
    /// Goes for defenses first.
    DefenseSeeking,
    /// Goes for walls first.
    WallFocused,
}

/// Attacker troop types.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TroopKind {
    Barbarian,
    Archer,
    Giant,
    WallBreaker,
}

impl TroopKind {
    pub const fn archetype(self) -> Archetype {
        match self {
            Self::Barbarian => Archetype::GenericMelee,
            Self::Archer => Archetype::Ranged,
            Self::Giant => Archetype::DefenseSeeking,
            Self::WallBreaker => Archetype::WallFocused,
        }
    }

    /// Ranged troops report what they shoot; melee troops have nothing to draw.
    pub const fn projectile(self) -> Option<ProjectileKind> {
        match self {
            Self::Archer => Some(ProjectileKind::Arrow),
            _ => None,
        }
    }

    pub const fn stats(self) -> TroopStats {
        match self {
            Self::Barbarian => TroopStats {
                health: 45,
                damage: 8,
                range: 1.0,
                move_speed: 2.0,
                attack_speed: 1.0,
                wall_damage_multiplier: 1,
                self_destructs: false,
            },
            Self::Archer => TroopStats {
                health: 20,
                damage: 7,
                range: 3.5,
                move_speed: 2.0,
                attack_speed: 1.0,
                wall_damage_multiplier: 1,
                self_destructs: false,
            },
            Self::Giant => TroopStats {
                health: 300,
                damage: 11,
                range: 1.0,
                move_speed: 1.5,
                attack_speed: 0.5,
                wall_damage_multiplier: 1,
                self_destructs: false,
            },
            Self::WallBreaker => TroopStats {
                health: 20,
                damage: 6,
                range: 1.0,
                move_speed: 3.0,
                attack_speed: 1.0,
                wall_damage_multiplier: 40,
                self_destructs: true,
            },
        }
    }
}

/// Combat and movement numbers for a troop.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TroopStats {
    pub health: u32,
    pub damage: u32,
    /// Reach measured to the target building's center, or to a wall's nearest edge.
    pub range: f32,
    /// Tiles per second.
    pub move_speed: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Damage multiplier applied when hitting walls.
    pub wall_damage_multiplier: u32,
    /// Troop dies after its first attack.
    pub self_destructs: bool,
}

impl TroopStats {
    pub fn attack_interval_ms(&self) -> u32 {
        interval_ms(self.attack_speed)
    }

    pub fn damage_against(&self, kind: BuildingKind) -> u32 {
        if kind.is_wall() {
            self.damage.saturating_mul(self.wall_damage_multiplier.max(1))
        } else {
            self.damage
        }
    }
}

fn interval_ms(attacks_per_second: f32) -> u32 {
    if attacks_per_second <= 0.0 {
        return u32::MAX;
    }
    (1000.0 / attacks_per_second).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn archetypes_follow_troop_roles() {
        assert_eq!(TroopKind::Archer.archetype(), Archetype::Ranged);
        assert_eq!(TroopKind::Giant.archetype(), Archetype::DefenseSeeking);
        assert_eq!(TroopKind::WallBreaker.archetype(), Archetype::WallFocused);
        assert_eq!(TroopKind::Barbarian.archetype(), Archetype::GenericMelee);
    }

    #[test]
    fn only_defense_category_fires() {
        for kind in <BuildingKind as strum::IntoEnumIterator>::iter() {
            assert_eq!(
                kind.defense().is_some(),
                kind.category() == BuildingCategory::Defense,
                "{kind}"
            );
        }
    }

    #[test]
    fn wall_breaker_multiplies_wall_damage_only() {
        let stats = TroopKind::WallBreaker.stats();
        assert_eq!(stats.damage_against(BuildingKind::Wall), 240);
        assert_eq!(stats.damage_against(BuildingKind::Cannon), 6);
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!(TroopKind::from_str("wall_breaker").unwrap(), TroopKind::WallBreaker);
        assert_eq!(BuildingKind::from_str("TOWN_HALL").unwrap(), BuildingKind::TownHall);
    }

    #[test]
    fn attack_interval_is_inverse_of_speed() {
        assert_eq!(TroopKind::Giant.stats().attack_interval_ms(), 2000);
        assert_eq!(BuildingKind::Cannon.defense().unwrap().attack_interval_ms(), 800);
    }
}
