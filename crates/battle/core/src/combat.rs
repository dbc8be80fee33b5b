//! Per-tick combat resolution: target upkeep, movement, troop attacks and
//! defensive fire.
//!
//! Each function resolves one actor against the shared building list and
//! reports what happened. Event assembly and phase ordering live in
//! [`crate::engine`].

use crate::error::EngineError;
use crate::events::{BuildingAttack, Projectile, TroopAttack};
use crate::grid::Grid;
use crate::pathfinding::find_path_with_wall_info;
use crate::state::{Building, BuildingId, Point, TargetInfo, Troop};
use crate::targeting::select_target;

/// Upper bound on wall-to-wall redirects in one movement step (nested walls).
const MAX_BREACH_HOPS: usize = 4;

/// Result of a troop hitting its objective.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TroopStrike {
    pub attack: BuildingAttack,
    /// This hit brought the building to zero health.
    pub destroyed: bool,
}

/// Result of a defense firing at a troop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenseShot {
    pub attack: TroopAttack,
    /// This hit killed the troop.
    pub killed: bool,
}

/// Re-targets if needed and walks `troop` toward its objective.
///
/// Returns the new position when the troop moved. An empty or fully blocked
/// route leaves the troop idle for this tick.
pub fn advance_troop(
    troop: &mut Troop,
    buildings: &[Building],
    step_secs: f32,
) -> Result<Option<Point>, EngineError> {
    if !troop.is_alive() {
        return Ok(None);
    }
    if !target_is_valid(troop, buildings)? {
        troop.target = select_target(troop, buildings);
    }
    let Some(info) = troop.target else {
        return Ok(None);
    };
    if in_range(troop, lookup(troop, info.objective(), buildings)?) {
        return Ok(None);
    }

    let route = plan_route(troop, buildings)?;
    let Some(info) = troop.target else {
        return Ok(None);
    };
    let objective = lookup(troop, info.objective(), buildings)?;
    if route.is_empty() || in_range(troop, objective) {
        return Ok(None);
    }

    Ok(walk(troop, &route, objective, buildings, step_secs))
}

/// Advances a cooldown by one step and fires when charged and in range.
///
/// Clears the troop's target once the objective is gone so the next tick
/// selects a fresh one.
pub fn troop_attack(troop: &mut Troop, buildings: &mut [Building], step_ms: u32) -> Option<TroopStrike> {
    if !troop.is_alive() {
        return None;
    }
    troop.cooldown_ms = troop.cooldown_ms.saturating_add(step_ms);

    let info = troop.target?;
    let index = buildings
        .binary_search_by_key(&info.objective(), |building| building.id)
        .ok()?;
    let building = &mut buildings[index];
    if !building.is_active() {
        troop.target = None;
        return None;
    }
    if !troop.is_ready_to_attack() || !in_range(troop, building) {
        return None;
    }

    let destroyed = building.take_damage(troop.stats.damage_against(building.kind));
    troop.cooldown_ms = 0;
    if troop.stats.self_destructs {
        troop.health = 0;
    }
    if destroyed {
        troop.target = None;
    }

    let projectile = troop.kind.projectile().map(|kind| Projectile {
        kind,
        from: troop.position,
        to: building.center(),
    });

    Some(TroopStrike {
        attack: BuildingAttack {
            building_id: building.id,
            remaining_health: building.health,
            attacker: troop.id,
            projectile,
        },
        destroyed,
    })
}

/// Fires `defense` at the nearest living troop inside its coverage ring.
///
/// Ties go to the lowest troop id. Destroyed buildings and non-defenses never fire.
pub fn defense_fire(defense: &mut Building, troops: &mut [Troop], step_ms: u32) -> Option<DefenseShot> {
    let profile = defense.defense()?;
    if !defense.is_active() {
        return None;
    }
    defense.cooldown_ms = defense.cooldown_ms.saturating_add(step_ms);
    if defense.cooldown_ms < profile.attack_interval_ms() {
        return None;
    }

    let origin = defense.center();
    let troop = troops
        .iter_mut()
        .filter(|troop| troop.is_alive() && profile.covers(origin.distance(troop.position)))
        .min_by(|a, b| {
            origin
                .distance(a.position)
                .total_cmp(&origin.distance(b.position))
                .then(a.id.cmp(&b.id))
        })?;

    let killed = troop.take_damage(profile.damage);
    defense.cooldown_ms = 0;

    Some(DefenseShot {
        attack: TroopAttack {
            troop_id: troop.id,
            remaining_health: troop.health,
            source: defense.id,
            projectile: Some(Projectile {
                kind: profile.projectile,
                from: origin,
                to: troop.position,
            }),
        },
        killed,
    })
}

fn target_is_valid(troop: &Troop, buildings: &[Building]) -> Result<bool, EngineError> {
    let Some(info) = troop.target else {
        return Ok(false);
    };
    if !lookup(troop, info.target, buildings)?.is_active() {
        return Ok(false);
    }
    match info.wall_to_destroy {
        Some(wall) if info.needs_to_destroy_wall => Ok(lookup(troop, wall, buildings)?.is_active()),
        _ => Ok(true),
    }
}

/// Route to the current objective, rewriting the target to breach a wall
/// when the way is fully blocked.
fn plan_route(troop: &mut Troop, buildings: &[Building]) -> Result<Vec<Point>, EngineError> {
    for _ in 0..MAX_BREACH_HOPS {
        let Some(info) = troop.target else {
            return Ok(Vec::new());
        };
        let objective = lookup(troop, info.objective(), buildings)?;
        let route = find_path_with_wall_info(troop.position, objective, buildings);
        if !route.has_wall_blockage {
            return Ok(route.path);
        }
        let Some(wall) = route.blocking_wall else {
            return Ok(Vec::new());
        };
        troop.target = Some(TargetInfo::breach(info.target, wall));
        if in_range(troop, lookup(troop, wall, buildings)?) {
            return Ok(Vec::new());
        }
    }
    Ok(Vec::new())
}

/// Spends this tick's movement budget along `route`.
///
/// Stops as soon as the objective is in range, and never enters a tile held
/// by an active wall.
fn walk(
    troop: &mut Troop,
    route: &[Point],
    objective: &Building,
    buildings: &[Building],
    step_secs: f32,
) -> Option<Point> {
    let grid = Grid::build(buildings, None);
    let start = troop.position;
    let mut budget = troop.move_speed() * step_secs;

    for waypoint in route {
        if budget <= 0.0 || in_range(troop, objective) {
            break;
        }
        let next = troop.position.step_toward(*waypoint, budget);
        if !grid.is_walkable(next.cell()) {
            break;
        }
        budget -= troop.position.distance(next);
        troop.position = next;
    }

    (troop.position != start).then_some(troop.position)
}

/// Walls are reached at their nearest edge so a long wall can be struck from the
/// tile in front of it. Every other building is reached at its center.
fn in_range(troop: &Troop, objective: &Building) -> bool {
    let distance = if objective.is_wall() {
        objective.distance_to(troop.position)
    } else {
        troop.position.distance(objective.center())
    };
    distance <= troop.range()
}

fn lookup<'a>(troop: &Troop, id: BuildingId, buildings: &'a [Building]) -> Result<&'a Building, EngineError> {
    buildings
        .binary_search_by_key(&id, |building| building.id)
        .map(|index| &buildings[index])
        .map_err(|_| EngineError::UnknownBuilding {
            troop: troop.id,
            building: id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuildingKind, ProjectileKind, TroopKind};
    use crate::state::{Cell, TroopId};

    fn building(id: u32, kind: BuildingKind, x: i32, y: i32) -> Building {
        Building::new(BuildingId(id), kind, Cell::new(x, y))
    }

    fn troop(id: u32, kind: TroopKind, x: f32, y: f32) -> Troop {
        Troop::new(TroopId(id), kind, Point::new(x, y))
    }

    #[test]
    fn barbarian_walks_toward_its_target() {
        let buildings = vec![building(1, BuildingKind::Barracks, 20, 4)];
        let mut barbarian = troop(0, TroopKind::Barbarian, 5.5, 5.5);

        let moved = advance_troop(&mut barbarian, &buildings, 0.1).unwrap();

        assert_eq!(barbarian.target, Some(TargetInfo::direct(BuildingId(1))));
        let position = moved.unwrap();
        assert!((position.distance(Point::new(5.5, 5.5)) - 0.2).abs() < 1e-4);
        assert!(position.x > 5.5);
    }

    #[test]
    fn troop_in_range_holds_position() {
        let buildings = vec![building(1, BuildingKind::GoldMine, 10, 5)];
        let mut archer = troop(0, TroopKind::Archer, 8.5, 6.5);

        assert_eq!(advance_troop(&mut archer, &buildings, 0.1).unwrap(), None);
        assert_eq!(archer.position, Point::new(8.5, 6.5));
    }

    #[test]
    fn fully_blocked_route_retargets_the_blocking_wall() {
        let mut buildings = vec![building(1, BuildingKind::Barracks, 20, 4).with_size(1, 1)];
        let mut id = 100;
        for y in 0..40 {
            buildings.push(building(id, BuildingKind::Wall, 10, y));
            id += 1;
        }
        let mut barbarian = troop(0, TroopKind::Barbarian, 5.5, 4.5);
        barbarian.target = Some(TargetInfo::direct(BuildingId(1)));

        advance_troop(&mut barbarian, &buildings, 0.1).unwrap();

        let info = barbarian.target.unwrap();
        assert_eq!(info.target, BuildingId(1));
        assert!(info.needs_to_destroy_wall);
        assert_eq!(info.wall_to_destroy, Some(BuildingId(104)));
        assert!(barbarian.position.x < 10.0);
    }

    #[test]
    fn barbarian_strikes_a_wide_wall_from_the_tile_in_front() {
        let mut buildings = vec![building(1, BuildingKind::Barracks, 20, 4)];
        for y in 0..40 {
            buildings.push(building(100 + y, BuildingKind::Wall, 10, y as i32).with_size(3, 1));
        }
        let mut barbarian = troop(0, TroopKind::Barbarian, 5.5, 5.5);
        barbarian.target = Some(TargetInfo::direct(BuildingId(1)));

        let mut strikes = 0;
        for _ in 0..100 {
            advance_troop(&mut barbarian, &buildings, 0.1).unwrap();
            if troop_attack(&mut barbarian, &mut buildings, 100).is_some() {
                strikes += 1;
            }
        }

        assert_eq!(barbarian.target.unwrap().wall_to_destroy, Some(BuildingId(105)));
        assert!(barbarian.position.x < 10.0);
        assert!(strikes > 0);
        let wall = &buildings[6];
        assert_eq!(wall.id, BuildingId(105));
        assert_eq!(wall.health, wall.max_health - strikes * 8);
    }

    #[test]
    fn movement_never_enters_wall_tiles() {
        let mut buildings = vec![building(1, BuildingKind::Barracks, 20, 4).with_size(1, 1)];
        for y in 0..40 {
            buildings.push(building(100 + y, BuildingKind::Wall, 10, y as i32));
        }
        let mut giant = troop(0, TroopKind::Giant, 8.5, 4.5);

        for _ in 0..50 {
            advance_troop(&mut giant, &buildings, 0.1).unwrap();
            assert_ne!(giant.position.cell().x, 10);
        }
    }

    #[test]
    fn unknown_target_is_reported() {
        let buildings = vec![building(1, BuildingKind::Barracks, 20, 4)];
        let mut barbarian = troop(3, TroopKind::Barbarian, 5.5, 5.5);
        barbarian.target = Some(TargetInfo::direct(BuildingId(42)));

        let err = advance_troop(&mut barbarian, &buildings, 0.1).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownBuilding {
                troop: TroopId(3),
                building: BuildingId(42)
            }
        );
    }

    #[test]
    fn troop_attack_respects_cooldown() {
        let mut buildings = vec![building(1, BuildingKind::Barracks, 5, 5)];
        let mut barbarian = troop(0, TroopKind::Barbarian, 6.5, 6.0);
        barbarian.target = Some(TargetInfo::direct(BuildingId(1)));

        let strike = troop_attack(&mut barbarian, &mut buildings, 100).unwrap();
        assert_eq!(strike.attack.remaining_health, 242);
        assert!(!strike.destroyed);
        assert_eq!(strike.attack.projectile, None);

        for _ in 0..9 {
            assert!(troop_attack(&mut barbarian, &mut buildings, 100).is_none());
        }
        assert!(troop_attack(&mut barbarian, &mut buildings, 100).is_some());
    }

    #[test]
    fn archer_attacks_carry_an_arrow() {
        let mut buildings = vec![building(1, BuildingKind::GoldMine, 10, 5)];
        let mut archer = troop(0, TroopKind::Archer, 8.5, 6.5);
        archer.target = Some(TargetInfo::over_wall(BuildingId(1)));

        let strike = troop_attack(&mut archer, &mut buildings, 100).unwrap();
        let projectile = strike.attack.projectile.unwrap();
        assert_eq!(projectile.kind, ProjectileKind::Arrow);
        assert_eq!(projectile.to, buildings[0].center());
    }

    #[test]
    fn wall_breaker_flattens_a_wall_and_dies() {
        let mut buildings = vec![building(1, BuildingKind::Wall, 5, 5).with_health(200)];
        let mut breaker = troop(0, TroopKind::WallBreaker, 4.5, 5.5);
        breaker.target = Some(TargetInfo::direct(BuildingId(1)));

        let strike = troop_attack(&mut breaker, &mut buildings, 100).unwrap();

        assert!(strike.destroyed);
        assert!(buildings[0].is_destroyed());
        assert!(!breaker.is_alive());
        assert_eq!(breaker.target, None);
    }

    #[test]
    fn attack_on_destroyed_objective_clears_target() {
        let mut buildings = vec![building(1, BuildingKind::Barracks, 5, 5)];
        buildings[0].take_damage(u32::MAX);
        let mut barbarian = troop(0, TroopKind::Barbarian, 6.5, 6.0);
        barbarian.target = Some(TargetInfo::direct(BuildingId(1)));

        assert!(troop_attack(&mut barbarian, &mut buildings, 100).is_none());
        assert_eq!(barbarian.target, None);
    }

    #[test]
    fn defense_fires_at_nearest_troop_with_lowest_id_on_ties() {
        // Cannon center (11.5, 11.5).
        let mut cannon = building(1, BuildingKind::Cannon, 10, 10);
        let mut troops = vec![
            troop(0, TroopKind::Barbarian, 15.5, 11.5),
            troop(1, TroopKind::Barbarian, 7.5, 11.5),
            troop(2, TroopKind::Barbarian, 11.5, 7.5),
        ];

        let shot = defense_fire(&mut cannon, &mut troops, 100).unwrap();

        assert_eq!(shot.attack.troop_id, TroopId(0));
        assert_eq!(shot.attack.remaining_health, 37);
        assert_eq!(shot.attack.source, BuildingId(1));
        assert_eq!(shot.attack.projectile.unwrap().kind, ProjectileKind::Cannonball);
        assert!(defense_fire(&mut cannon, &mut troops, 100).is_none());
    }

    #[test]
    fn mortar_ignores_troops_inside_its_blind_spot() {
        let mut mortar = building(1, BuildingKind::Mortar, 10, 10);
        let mut troops = vec![troop(0, TroopKind::Giant, 12.5, 11.5)];
        assert!(defense_fire(&mut mortar, &mut troops, 100).is_none());

        troops[0].position = Point::new(19.5, 11.5);
        assert!(defense_fire(&mut mortar, &mut troops, 100).is_some());
    }

    #[test]
    fn destroyed_defense_holds_fire() {
        let mut cannon = building(1, BuildingKind::Cannon, 10, 10);
        cannon.take_damage(u32::MAX);
        let mut troops = vec![troop(0, TroopKind::Barbarian, 12.5, 11.5)];
        assert!(defense_fire(&mut cannon, &mut troops, 100).is_none());
        assert_eq!(troops[0].health, 45);
    }
}
