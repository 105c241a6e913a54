//! Factory functions for test grids and logs.

use shared::{Cell, LogEvent};

use crate::project_log::ProjectLog;

/// Three cubes in an L on the ground
pub fn l_shape() -> Vec<Cell> {
    vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0), Cell::new(1, 1, 0)]
}

/// A straight run of `len` cubes along X starting at `start`
pub fn bar(start: Cell, len: i32) -> Vec<Cell> {
    (0..len).map(|i| Cell::new(start.x + i, start.y, start.z)).collect()
}

/// Solid box of `nx * ny * nz` cubes at the origin
pub fn block(nx: i32, ny: i32, nz: i32) -> Vec<Cell> {
    (0..nx)
        .flat_map(|x| (0..ny).flat_map(move |y| (0..nz).map(move |z| Cell::new(x, y, z))))
        .collect()
}

/// Placement log for `cells`, in order
pub fn place_log(cells: &[Cell]) -> ProjectLog {
    cells
        .iter()
        .filter_map(|c| c.to_user())
        .map(LogEvent::place)
        .collect()
}
