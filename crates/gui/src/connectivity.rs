//! Part detection: 6-connected components and their exposed faces.

use std::collections::{HashSet, VecDeque};

use shared::{Cell, Face};

use crate::grid::VoxelGrid;

/// All occupied cells reachable from `seed` through shared faces.
///
/// Returns an empty set if `seed` itself is unoccupied.
pub fn find_part(grid: &VoxelGrid, seed: Cell) -> HashSet<Cell> {
    let mut part = HashSet::new();
    if !grid.contains(seed) {
        return part;
    }

    let mut frontier = VecDeque::from([seed]);
    part.insert(seed);

    while let Some(cell) = frontier.pop_front() {
        for next in cell.neighbors() {
            if grid.contains(next) && part.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    tracing::debug!(seed = %seed, cells = part.len(), "flood fill");
    part
}

/// Every `(cell, face)` of `part` whose neighbor across that face is not in `part`.
pub fn find_boundary_faces(part: &HashSet<Cell>) -> Vec<(Cell, Face)> {
    part.iter()
        .flat_map(|&cell| Face::ALL.into_iter().map(move |face| (cell, face)))
        .filter(|&(cell, face)| !part.contains(&cell.neighbor(face)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: &[(i32, i32, i32)]) -> VoxelGrid {
        cells.iter().map(|&(x, y, z)| Cell::new(x, y, z)).collect()
    }

    #[test]
    fn test_l_shape_is_one_part() {
        let g = grid(&[(0, 0, 0), (1, 0, 0), (1, 1, 0), (5, 5, 5)]);
        let expected: HashSet<Cell> = [Cell::new(0, 0, 0), Cell::new(1, 0, 0), Cell::new(1, 1, 0)]
            .into_iter()
            .collect();
        for seed in &expected {
            assert_eq!(find_part(&g, *seed), expected);
        }
        let lone = find_part(&g, Cell::new(5, 5, 5));
        assert_eq!(lone, [Cell::new(5, 5, 5)].into_iter().collect());
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let g = grid(&[(0, 0, 0), (1, 1, 0), (1, 1, 1)]);
        assert_eq!(find_part(&g, Cell::new(0, 0, 0)).len(), 1);
        assert_eq!(find_part(&g, Cell::new(1, 1, 1)).len(), 2);
    }

    #[test]
    fn test_unoccupied_seed_is_empty() {
        let g = grid(&[(0, 0, 0)]);
        assert!(find_part(&g, Cell::new(3, 3, 3)).is_empty());
    }

    #[test]
    fn test_single_cube_has_six_faces() {
        let part: HashSet<Cell> = [Cell::new(2, 2, 2)].into_iter().collect();
        let faces = find_boundary_faces(&part);
        assert_eq!(faces.len(), 6);
        let labels: HashSet<Face> = faces.iter().map(|&(_, f)| f).collect();
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn test_adjacent_pair_has_ten_faces() {
        let part: HashSet<Cell> = [Cell::new(0, 0, 0), Cell::new(1, 0, 0)].into_iter().collect();
        let faces: HashSet<(Cell, Face)> = find_boundary_faces(&part).into_iter().collect();
        assert_eq!(faces.len(), 10);
        assert!(!faces.contains(&(Cell::new(0, 0, 0), Face::Right)));
        assert!(!faces.contains(&(Cell::new(1, 0, 0), Face::Left)));
    }

    #[test]
    fn test_other_part_counts_as_boundary() {
        // Only the part itself is passed in, so a touching cube from elsewhere still exposes the face
        let part: HashSet<Cell> = [Cell::new(0, 0, 0)].into_iter().collect();
        let faces = find_boundary_faces(&part);
        assert!(faces.contains(&(Cell::new(0, 0, 0), Face::Top)));
    }

    #[test]
    fn test_solid_block_flood_fill() {
        let g: VoxelGrid = (0..4)
            .flat_map(|x| (0..4).flat_map(move |y| (0..4).map(move |z| Cell::new(x, y, z))))
            .collect();
        let part = find_part(&g, Cell::new(2, 1, 3));
        assert_eq!(part.len(), 64);
        // 6 sides of 4x4
        assert_eq!(find_boundary_faces(&part).len(), 96);
    }
}
