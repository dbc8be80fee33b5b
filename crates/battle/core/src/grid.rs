//! Walkability grid derived from the building list.
//!
//! Only active walls obstruct movement. Every other building, destroyed or
//! not, is walkable. Grids are rebuilt for every pathfinding call because wall
//! state changes from tick to tick.

use crate::config::BattleConfig;
use crate::state::{Building, BuildingId, Cell};

/// Dense walkability map over the fixed 80 × 40 battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
}

impl Grid {
    /// Fully walkable grid.
    pub fn open() -> Self {
        let width = BattleConfig::GRID_WIDTH;
        let height = BattleConfig::GRID_HEIGHT;
        Self {
            width,
            height,
            walkable: vec![true; (width * height) as usize],
        }
    }

    /// Marks tiles covered by active walls as blocked, skipping `ignored`.
    ///
    /// `ignored` answers "what if this wall were gone", and lets a troop path
    /// up to the wall it is about to breach.
    pub fn build(buildings: &[Building], ignored: Option<BuildingId>) -> Self {
        let mut grid = Self::open();
        for wall in buildings
            .iter()
            .filter(|building| building.is_active_wall() && Some(building.id) != ignored)
        {
            for cell in wall.cells() {
                if let Some(index) = grid.index(cell) {
                    grid.walkable[index] = false;
                }
            }
        }
        grid
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|index| self.walkable[index])
    }

    pub(crate) fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Cell {
        let index = index as i32;
        Cell::new(index % self.width, index / self.width)
    }

    /// In-bounds 4-neighbours in fixed order: up, right, down, left.
    pub(crate) fn neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        const OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        OFFSETS
            .iter()
            .map(move |(dx, dy)| Cell::new(cell.x + dx, cell.y + dy))
            .filter(move |next| self.in_bounds(*next))
    }
}
