//! A* pathfinding and wall-aware route queries.
//!
//! All queries are pure functions of the building list. Node bookkeeping is
//! allocated per call and dropped on return; nothing is memoized across ticks.

use crate::grid::Grid;
use crate::state::{Building, BuildingId, Cell, Point, sample_segment};

/// Samples per unit distance used by line-of-sight checks.
const LOS_SAMPLES_PER_UNIT: f32 = 2.0;
/// Samples per unit distance used by straight-line wall probing.
const ROUTE_SAMPLES_PER_UNIT: f32 = 1.0;

/// A* bookkeeping for a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridNode {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    /// Cost from the start.
    pub g: u32,
    /// Manhattan estimate to the goal.
    pub h: u32,
    pub f: u32,
    pub parent: Option<usize>,
}

/// Route to a building, annotated with wall blockage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathResult {
    /// Waypoints in walking order, excluding the starting position.
    pub path: Vec<Point>,
    /// Walls fully block the route and one has to be destroyed.
    pub has_wall_blockage: bool,
    pub blocking_wall: Option<BuildingId>,
}

impl PathResult {
    fn clear(path: Vec<Point>) -> Self {
        Self {
            path,
            has_wall_blockage: false,
            blocking_wall: None,
        }
    }

    fn blocked(wall: &Building) -> Self {
        Self {
            path: vec![wall.center()],
            has_wall_blockage: true,
            blocking_wall: Some(wall.id),
        }
    }
}

/// Shortest 4-directional path from `start` to `goal`.
///
/// Unit step cost and a Manhattan heuristic. Ties go to the first node with
/// the lowest `f` in open-set insertion order. The returned cells exclude
/// `start` and end at `goal`, so an unobstructed path holds exactly
/// `|dx| + |dy|` cells. Empty when the goal is unreachable, when either end is
/// blocked or outside the grid, and when `start == goal`.
pub fn find_path(start: Cell, goal: Cell, grid: &Grid) -> Vec<Cell> {
    if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }
    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };

    let mut nodes: Vec<GridNode> = (0..(grid.width() * grid.height()) as usize)
        .map(|index| {
            let cell = grid.cell_at(index);
            GridNode {
                x: cell.x,
                y: cell.y,
                walkable: grid.is_walkable(cell),
                g: u32::MAX,
                h: cell.manhattan(goal),
                f: u32::MAX,
                parent: None,
            }
        })
        .collect();
    let mut closed = vec![false; nodes.len()];
    let mut in_open = vec![false; nodes.len()];
    let mut open: Vec<usize> = Vec::new();

    nodes[start_index].g = 0;
    nodes[start_index].f = nodes[start_index].h;
    open.push(start_index);
    in_open[start_index] = true;

    while !open.is_empty() {
        let mut best = 0;
        for (position, &index) in open.iter().enumerate().skip(1) {
            if nodes[index].f < nodes[open[best]].f {
                best = position;
            }
        }
        let current = open.remove(best);
        in_open[current] = false;

        if current == goal_index {
            return reconstruct(&nodes, current, start_index);
        }
        closed[current] = true;

        let current_cell = Cell::new(nodes[current].x, nodes[current].y);
        let tentative = nodes[current].g + 1;
        for neighbour in grid.neighbours(current_cell) {
            let Some(next) = grid.index(neighbour) else {
                continue;
            };
            if closed[next] || !nodes[next].walkable {
                continue;
            }
            if !in_open[next] {
                open.push(next);
                in_open[next] = true;
            } else if tentative >= nodes[next].g {
                continue;
            }
            let node = &mut nodes[next];
            node.parent = Some(current);
            node.g = tentative;
            node.f = tentative + node.h;
        }
    }

    Vec::new()
}

fn reconstruct(nodes: &[GridNode], goal_index: usize, start_index: usize) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal_index;
    while current != start_index {
        let node = &nodes[current];
        path.push(Cell::new(node.x, node.y));
        match node.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Route from `from` to `target`, falling back to wall-breach hints.
///
/// 1. A* with every active wall as an obstacle (the target itself is ignored
///    when it is a wall). Success yields tile-center waypoints.
/// 2. Otherwise the first active wall crossing the straight line becomes a
///    single waypoint at its center, with the blockage flag set.
/// 3. If no wall crosses the straight line, the raw line samples are returned
///    without the flag. This is a degraded route, not a guarantee.
///
/// Already standing in the goal tile yields the target center as the only waypoint.
pub fn find_path_with_wall_info(from: Point, target: &Building, buildings: &[Building]) -> PathResult {
    let ignored = target.is_wall().then_some(target.id);
    let grid = Grid::build(buildings, ignored);
    let goal = target.center();
    let start_cell = from.cell();
    let goal_cell = goal.cell();

    if start_cell == goal_cell {
        return PathResult::clear(vec![goal]);
    }

    let cells = find_path(start_cell, goal_cell, &grid);
    if !cells.is_empty() {
        return PathResult::clear(cells.into_iter().map(Cell::center).collect());
    }

    if let Some(wall) = find_walls_in_path(from, goal, buildings)
        .into_iter()
        .find(|wall| wall.id != target.id)
    {
        return PathResult::blocked(wall);
    }

    PathResult::clear(sample_segment(from, goal, ROUTE_SAMPLES_PER_UNIT).skip(1).collect())
}

/// Whether the segment `from → to` avoids every active wall.
///
/// The segment is sampled twice per unit of distance (rounded up). Only walls
/// obstruct sight.
pub fn has_line_of_sight(from: Point, to: Point, buildings: &[Building]) -> bool {
    !sample_segment(from, to, LOS_SAMPLES_PER_UNIT).any(|sample| {
        buildings
            .iter()
            .any(|building| building.is_active_wall() && building.contains(sample))
    })
}

/// Active walls crossed by the unit-sampled segment, in discovery order, each once.
pub fn find_walls_in_path<'a>(from: Point, to: Point, buildings: &'a [Building]) -> Vec<&'a Building> {
    let mut walls: Vec<&Building> = Vec::new();
    for sample in sample_segment(from, to, ROUTE_SAMPLES_PER_UNIT) {
        for wall in buildings
            .iter()
            .filter(|building| building.is_active_wall() && building.contains(sample))
        {
            if !walls.iter().any(|seen| seen.id == wall.id) {
                walls.push(wall);
            }
        }
    }
    walls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingKind;
    use crate::config::BattleConfig;

    fn wall(id: u32, x: i32, y: i32) -> Building {
        Building::new(BuildingId(id), BuildingKind::Wall, Cell::new(x, y))
    }

    /// Walls at columns 10..=12 over the whole grid height.
    fn barrier() -> Vec<Building> {
        let mut id = 0;
        let mut walls = Vec::new();
        for y in 0..BattleConfig::GRID_HEIGHT {
            for x in 10..=12 {
                id += 1;
                walls.push(wall(id, x, y));
            }
        }
        walls
    }

    fn assert_contiguous(start: Cell, path: &[Cell]) {
        let mut previous = start;
        for cell in path {
            assert_eq!(previous.manhattan(*cell), 1, "{previous} -> {cell}");
            previous = *cell;
        }
    }

    #[test]
    fn open_grid_paths_are_manhattan_optimal() {
        let grid = Grid::open();
        let pairs = [
            (Cell::new(0, 0), Cell::new(79, 39)),
            (Cell::new(40, 20), Cell::new(3, 7)),
            (Cell::new(5, 5), Cell::new(5, 30)),
            (Cell::new(12, 0), Cell::new(0, 0)),
        ];
        for (start, goal) in pairs {
            let path = find_path(start, goal, &grid);
            assert_eq!(path.len() as u32, start.manhattan(goal));
            assert_eq!(path.last(), Some(&goal));
            assert_contiguous(start, &path);
        }
    }

    #[test]
    fn same_cell_yields_empty_path() {
        assert!(find_path(Cell::new(3, 3), Cell::new(3, 3), &Grid::open()).is_empty());
    }

    #[test]
    fn detours_around_partial_walls() {
        let buildings = vec![wall(1, 10, 5), wall(2, 11, 5), wall(3, 12, 5)];
        let grid = Grid::build(&buildings, None);
        let path = find_path(Cell::new(5, 5), Cell::new(20, 5), &grid);

        assert_eq!(path.len(), 17);
        assert_contiguous(Cell::new(5, 5), &path);
        assert!(path.iter().all(|cell| grid.is_walkable(*cell)));
    }

    #[test]
    fn fully_separated_goal_is_unreachable() {
        let buildings = barrier();
        let grid = Grid::build(&buildings, None);
        assert!(find_path(Cell::new(5, 5), Cell::new(20, 5), &grid).is_empty());
    }

    #[test]
    fn wall_info_points_at_the_blocking_wall() {
        let mut buildings = barrier();
        let target = Building::new(BuildingId(1_000), BuildingKind::GoldMine, Cell::new(20, 5))
            .with_size(1, 1);
        buildings.push(target.clone());

        let result = find_path_with_wall_info(Point::new(5.5, 5.5), &target, &buildings);

        assert!(result.has_wall_blockage);
        let blocking = buildings
            .iter()
            .find(|b| Some(b.id) == result.blocking_wall)
            .unwrap();
        assert_eq!(blocking.position, Cell::new(10, 5));
        assert_eq!(result.path, vec![blocking.center()]);
    }

    #[test]
    fn wide_wall_blockage_points_at_its_center() {
        let mut buildings = vec![
            Building::new(BuildingId(1), BuildingKind::GoldMine, Cell::new(20, 5)).with_size(1, 1),
        ];
        for y in 0..BattleConfig::GRID_HEIGHT {
            buildings.push(wall(100 + y as u32, 10, y).with_size(3, 1));
        }
        let target = buildings[0].clone();

        let result = find_path_with_wall_info(Point::new(5.5, 5.5), &target, &buildings);

        assert!(result.has_wall_blockage);
        assert_eq!(result.blocking_wall, Some(BuildingId(105)));
        assert_eq!(result.path, vec![Point::new(11.5, 5.5)]);
    }

    #[test]
    fn wall_info_returns_full_path_when_reachable() {
        let buildings = vec![wall(1, 10, 5)];
        let target = Building::new(BuildingId(9), BuildingKind::Cannon, Cell::new(20, 4));
        let result = find_path_with_wall_info(Point::new(5.5, 5.5), &target, &buildings);

        assert!(!result.has_wall_blockage);
        assert_eq!(result.blocking_wall, None);
        assert_eq!(result.path.last(), Some(&target.center().cell().center()));
    }

    #[test]
    fn wall_targets_are_reachable_through_themselves() {
        let buildings = barrier();
        let target = buildings
            .iter()
            .find(|b| b.position == Cell::new(10, 5))
            .unwrap()
            .clone();
        let result = find_path_with_wall_info(Point::new(5.5, 5.5), &target, &buildings);

        assert!(!result.has_wall_blockage);
        assert_eq!(result.path.len(), 5);
        assert_eq!(result.path.last(), Some(&target.center()));
    }

    #[test]
    fn line_of_sight_is_blocked_by_active_walls_only() {
        let from = Point::new(5.5, 5.5);
        let to = Point::new(15.5, 5.5);
        let mut buildings = vec![
            Building::new(BuildingId(1), BuildingKind::Cannon, Cell::new(8, 4)),
            wall(2, 10, 5),
        ];
        assert!(!has_line_of_sight(from, to, &buildings));

        buildings[1].take_damage(u32::MAX);
        assert!(has_line_of_sight(from, to, &buildings));
    }

    #[test]
    fn midpoint_wall_blocks_both_directions() {
        let a = Point::new(2.5, 8.5);
        let b = Point::new(18.5, 8.5);
        let buildings = vec![wall(1, 10, 8)];
        assert_eq!(
            has_line_of_sight(a, b, &buildings),
            has_line_of_sight(b, a, &buildings)
        );
        assert!(!has_line_of_sight(a, b, &buildings));
    }

    #[test]
    fn walls_in_path_are_ordered_and_unique() {
        let buildings = vec![
            wall(3, 14, 5),
            Building::new(BuildingId(1), BuildingKind::Wall, Cell::new(10, 5)).with_size(2, 1),
            wall(2, 30, 30),
        ];
        let walls = find_walls_in_path(Point::new(5.5, 5.5), Point::new(20.5, 5.5), &buildings);
        let ids: Vec<_> = walls.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![BuildingId(1), BuildingId(3)]);
    }
}
