//! Per-archetype target selection.
//!
//! "Nearest" always means the Euclidean distance from the troop to the
//! building center. Exact ties go to the lowest building id so the outcome
//! never depends on container order.

use crate::catalog::Archetype;
use crate::pathfinding::{find_walls_in_path, has_line_of_sight};
use crate::state::{Building, Point, TargetInfo, Troop};

/// Picks the next objective for `troop`, or `None` when nothing is left to hit.
pub fn select_target(troop: &Troop, buildings: &[Building]) -> Option<TargetInfo> {
    match troop.archetype() {
        Archetype::WallFocused => select_wall_focused(troop, buildings),
        Archetype::Ranged => select_ranged(troop, buildings),
        Archetype::DefenseSeeking => select_defense_seeking(troop, buildings),
        Archetype::GenericMelee => select_generic_melee(troop, buildings),
    }
}

fn select_wall_focused(troop: &Troop, buildings: &[Building]) -> Option<TargetInfo> {
    nearest(troop.position, active_walls(buildings))
        .or_else(|| nearest(troop.position, buildings.iter().filter(|b| b.is_active())))
        .map(|building| TargetInfo::direct(building.id))
}

fn select_ranged(troop: &Troop, buildings: &[Building]) -> Option<TargetInfo> {
    let Some(target) = nearest(troop.position, active_non_walls(buildings)) else {
        return nearest(troop.position, active_walls(buildings))
            .map(|wall| TargetInfo::direct(wall.id));
    };

    let in_range = troop.position.distance(target.center()) <= troop.range();
    if in_range && has_line_of_sight(troop.position, target.center(), buildings) {
        return Some(TargetInfo::over_wall(target.id));
    }

    Some(redirect_through_walls(troop, target, buildings))
}

fn select_defense_seeking(troop: &Troop, buildings: &[Building]) -> Option<TargetInfo> {
    let target = nearest(
        troop.position,
        active_non_walls(buildings).filter(|b| b.is_defense()),
    )
    .or_else(|| nearest(troop.position, active_non_walls(buildings)));

    match target {
        Some(target) => Some(redirect_through_walls(troop, target, buildings)),
        None => nearest(troop.position, active_walls(buildings)).map(|w| TargetInfo::direct(w.id)),
    }
}

fn select_generic_melee(troop: &Troop, buildings: &[Building]) -> Option<TargetInfo> {
    match nearest(troop.position, active_non_walls(buildings)) {
        Some(target) => Some(redirect_through_walls(troop, target, buildings)),
        None => nearest(troop.position, active_walls(buildings)).map(|w| TargetInfo::direct(w.id)),
    }
}

/// Redirects to the nearest wall crossing the straight line to `target`, if any.
fn redirect_through_walls(troop: &Troop, target: &Building, buildings: &[Building]) -> TargetInfo {
    let walls = find_walls_in_path(troop.position, target.center(), buildings);
    match nearest(troop.position, walls.into_iter()) {
        Some(wall) => TargetInfo::breach(target.id, wall.id),
        None => TargetInfo::direct(target.id),
    }
}

fn active_walls(buildings: &[Building]) -> impl Iterator<Item = &Building> {
    buildings.iter().filter(|b| b.is_active_wall())
}

fn active_non_walls(buildings: &[Building]) -> impl Iterator<Item = &Building> {
    buildings.iter().filter(|b| b.is_active() && !b.is_wall())
}

fn nearest<'a>(from: Point, candidates: impl Iterator<Item = &'a Building>) -> Option<&'a Building> {
    candidates.min_by(|a, b| {
        from.distance(a.center())
            .total_cmp(&from.distance(b.center()))
            .then(a.id.cmp(&b.id))
    })
}
