//! Occupancy store for placed cubes.
//!
//! The grid is a plain set of cells. Bounds are enforced by the session
//! before cells reach the store.

use std::collections::HashSet;

use shared::Cell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelGrid {
    cells: HashSet<Cell>,
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Insert a cell. Returns `false` if it was already occupied.
    pub fn add(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    /// Remove a cell. Returns `false` if it was not occupied.
    pub fn remove(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    pub fn all(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl FromIterator<Cell> for VoxelGrid {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
