//! Interaction controller: the single owner of grid, hover, mode and log.

pub mod settings;

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{Cell, Face, GridExtent, LogEvent};

pub use settings::{AppSettings, CameraSettings};

use crate::connectivity::{find_boundary_faces, find_part};
use crate::error::{ExportError, LineRejection, LogLoadError, SaveError};
use crate::export::{mesh_for_part, ExportMesh};
use crate::grid::VoxelGrid;
use crate::project_log::{self, LoadedLog, LogLimits, ProjectLog};
use crate::viewport::camera::OrbitCamera;
use crate::viewport::picking::{resolve_hover, Hover, Ray};

/// What a primary click does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Placing,
    Erasing,
    Exporting,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Placing => "Place",
            Mode::Erasing => "Erase",
            Mode::Exporting => "Export",
        }
    }
}

/// Mesh for one connected part, ready to be packaged
#[derive(Debug, Clone)]
pub struct PartExport {
    pub seed: Cell,
    pub cells: usize,
    pub mesh: ExportMesh,
}

/// Result of a primary click
#[derive(Debug)]
pub enum ClickOutcome {
    Placed(Cell),
    Erased(Cell),
    /// The hovered part was meshed; the caller picks a destination
    Export(PartExport),
    ExportFailed(ExportError),
    /// Nothing under the pointer, out of bounds, or already in that state
    Ignored,
}

/// Editing session state
pub struct Session {
    grid: VoxelGrid,
    extent: GridExtent,
    mode: Mode,
    hover: Hover,
    /// Boundary faces of the hovered part in export mode
    part_highlight: Vec<(Cell, Face)>,
    log: ProjectLog,
    pub camera: OrbitCamera,
    /// Bumped on every grid change
    version: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GridExtent::default())
    }
}

impl Session {
    pub fn new(extent: GridExtent) -> Self {
        Self {
            grid: VoxelGrid::new(),
            extent,
            mode: Mode::default(),
            hover: Hover::None,
            part_highlight: Vec::new(),
            log: ProjectLog::new(),
            camera: OrbitCamera::default(),
            version: 0,
        }
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    pub fn part_highlight(&self) -> &[(Cell, Face)] {
        &self.part_highlight
    }

    pub fn log(&self) -> &ProjectLog {
        &self.log
    }

    pub fn log_text(&self) -> String {
        self.log.to_text()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    // ── Mode and hover ────────────────────────────────────────

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::info!(?mode, "mode changed");
        }
        self.mode = mode;
        self.refresh_highlight();
    }

    pub fn clear_hover(&mut self) {
        self.hover = Hover::None;
        self.part_highlight.clear();
    }

    /// Recompute hover from a pointer ray. `None` clears it.
    pub fn update_hover(&mut self, ray: Option<&Ray>) {
        self.hover = match ray {
            Some(ray) => resolve_hover(
                ray,
                self.grid.iter(),
                &self.extent,
                self.mode == Mode::Placing,
            ),
            None => Hover::None,
        };
        self.refresh_highlight();
    }

    /// In export mode, highlight every exposed face of the hovered part
    fn refresh_highlight(&mut self) {
        self.part_highlight.clear();
        if self.mode != Mode::Exporting {
            return;
        }
        if let Some(cell) = self.hover.cell() {
            let part = find_part(&self.grid, cell);
            self.part_highlight = find_boundary_faces(&part);
            tracing::debug!(cells = part.len(), faces = self.part_highlight.len(), "part highlight");
        }
    }

    // ── Editing ───────────────────────────────────────────────

    /// Apply a primary click at the current hover state.
    pub fn click(&mut self) -> ClickOutcome {
        match (self.mode, self.hover) {
            (Mode::Placing, Hover::Face { cell, face }) => {
                let target = cell.neighbor(face);
                self.placed(target)
            }
            (Mode::Placing, Hover::Ground { x, y }) => self.placed(Cell::new(x, y, 0)),
            (Mode::Erasing, Hover::Face { cell, .. }) => {
                if self.erase(cell) {
                    ClickOutcome::Erased(cell)
                } else {
                    ClickOutcome::Ignored
                }
            }
            (Mode::Exporting, Hover::Face { cell, .. }) => match self.export_part(cell) {
                Ok(export) => ClickOutcome::Export(export),
                Err(e) => ClickOutcome::ExportFailed(e),
            },
            _ => ClickOutcome::Ignored,
        }
    }

    fn placed(&mut self, cell: Cell) -> ClickOutcome {
        if self.place(cell) {
            ClickOutcome::Placed(cell)
        } else {
            ClickOutcome::Ignored
        }
    }

    /// Add a cube if it is inside the grid and free. Returns whether it was added.
    pub fn place(&mut self, cell: Cell) -> bool {
        if !self.extent.contains(cell) {
            return false;
        }
        let Some(user) = cell.to_user() else {
            return false;
        };
        if !self.grid.add(cell) {
            return false;
        }
        self.log.push(LogEvent::place(user));
        self.version += 1;
        tracing::info!(cell = %cell, "placed cube");
        true
    }

    /// Remove a cube. Clears hover on success.
    pub fn erase(&mut self, cell: Cell) -> bool {
        let Some(user) = cell.to_user() else {
            return false;
        };
        if !self.grid.remove(cell) {
            return false;
        }
        self.log.push(LogEvent::erase(user));
        self.version += 1;
        self.clear_hover();
        tracing::info!(cell = %cell, "erased cube");
        true
    }

    /// Mesh the part containing `seed`
    pub fn export_part(&self, seed: Cell) -> Result<PartExport, ExportError> {
        let (part, mesh) = mesh_for_part(&self.grid, seed)?;
        tracing::info!(seed = %seed, cells = part.len(), "prepared part for export");
        Ok(PartExport {
            seed,
            cells: part.len(),
            mesh,
        })
    }

    /// Remove every cube and forget the log
    pub fn clear(&mut self) {
        self.grid.clear();
        self.log.clear();
        self.clear_hover();
        self.version += 1;
    }

    // ── Persistence ───────────────────────────────────────────

    /// Replace grid and log with a replayed log text.
    ///
    /// On error nothing changes. Returns the skipped lines.
    pub fn load_log_text(
        &mut self,
        text: &str,
        limits: &LogLimits,
    ) -> Result<Vec<(usize, LineRejection)>, LogLoadError> {
        let loaded = project_log::load_log_text(text, &self.extent, limits)?;
        Ok(self.commit(loaded))
    }

    pub fn load_log_file(
        &mut self,
        path: &Path,
        limits: &LogLimits,
    ) -> Result<Vec<(usize, LineRejection)>, LogLoadError> {
        let loaded = project_log::load_log_file(path, &self.extent, limits)?;
        Ok(self.commit(loaded))
    }

    fn commit(&mut self, loaded: LoadedLog) -> Vec<(usize, LineRejection)> {
        self.grid = loaded.grid;
        self.log = loaded.events;
        self.clear_hover();
        self.version += 1;
        loaded.rejections
    }

    pub fn save_log_file(&self, path: &Path) -> Result<(), SaveError> {
        project_log::save_log_file(path, &self.log)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn down_at(x: f64, y: f64) -> Ray {
        Ray::new(DVec3::new(x, y, 50.0), DVec3::NEG_Z).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let s = Session::default();
        assert_eq!(s.mode(), Mode::Placing);
        assert_eq!(s.hover(), Hover::None);
        assert!(s.grid().is_empty());
        assert!(s.log().is_empty());
    }

    #[test]
    fn test_place_on_ground_then_stack() {
        let mut s = Session::default();
        s.update_hover(Some(&down_at(2.5, 3.5)));
        assert_eq!(s.hover(), Hover::Ground { x: 2, y: 3 });
        assert!(matches!(s.click(), ClickOutcome::Placed(c) if c == Cell::new(2, 3, 0)));

        s.update_hover(Some(&down_at(2.5, 3.5)));
        assert_eq!(
            s.hover(),
            Hover::Face {
                cell: Cell::new(2, 3, 0),
                face: Face::Top
            }
        );
        assert!(matches!(s.click(), ClickOutcome::Placed(c) if c == Cell::new(2, 3, 1)));
        assert_eq!(s.log_text(), "1:P(3,4,1)\n2:P(3,4,2)");
    }

    #[test]
    fn test_place_out_of_bounds_is_noop() {
        let mut s = Session::new(GridExtent::cube(2));
        assert!(s.place(Cell::new(1, 1, 1)));
        s.update_hover(Some(&down_at(1.5, 1.5)));
        assert!(matches!(s.click(), ClickOutcome::Ignored));
        assert!(!s.place(Cell::new(-1, 0, 0)));
        assert_eq!(s.grid().len(), 1);
        assert_eq!(s.log().len(), 1);
    }

    #[test]
    fn test_duplicate_place_not_logged() {
        let mut s = Session::default();
        assert!(s.place(Cell::new(0, 0, 0)));
        assert!(!s.place(Cell::new(0, 0, 0)));
        assert_eq!(s.log().len(), 1);
    }

    #[test]
    fn test_erase_clears_hover() {
        let mut s = Session::default();
        s.place(Cell::new(4, 4, 0));
        s.set_mode(Mode::Erasing);
        s.update_hover(Some(&down_at(4.5, 4.5)));
        assert!(matches!(s.click(), ClickOutcome::Erased(_)));
        assert_eq!(s.hover(), Hover::None);
        assert!(s.grid().is_empty());
        assert_eq!(s.log_text(), "1:P(5,5,1)\n2:E(5,5,1)");
    }

    #[test]
    fn test_erase_on_ground_is_ignored() {
        let mut s = Session::default();
        s.set_mode(Mode::Erasing);
        s.update_hover(Some(&down_at(4.5, 4.5)));
        assert_eq!(s.hover(), Hover::Ground { x: 4, y: 4 });
        assert!(matches!(s.click(), ClickOutcome::Ignored));
        assert!(s.log().is_empty());
    }

    #[test]
    fn test_export_mode_highlights_part() {
        let mut s = Session::default();
        s.place(Cell::new(0, 0, 0));
        s.place(Cell::new(1, 0, 0));
        s.place(Cell::new(8, 8, 0));
        s.set_mode(Mode::Exporting);
        s.update_hover(Some(&down_at(0.5, 0.5)));
        assert_eq!(s.part_highlight().len(), 10);

        match s.click() {
            ClickOutcome::Export(export) => {
                assert_eq!(export.cells, 2);
                assert_eq!(export.mesh.vertex_count(), 16);
            }
            other => panic!("expected export, got {other:?}"),
        }
        // Export does not touch the grid or log
        assert_eq!(s.grid().len(), 3);
        assert_eq!(s.log().len(), 3);
    }

    #[test]
    fn test_mode_switch_clears_highlight() {
        let mut s = Session::default();
        s.place(Cell::new(0, 0, 0));
        s.set_mode(Mode::Exporting);
        s.update_hover(Some(&down_at(0.5, 0.5)));
        assert_eq!(s.part_highlight().len(), 6);
        s.set_mode(Mode::Placing);
        assert!(s.part_highlight().is_empty());
    }

    #[test]
    fn test_load_replaces_state() {
        let mut s = Session::default();
        s.place(Cell::new(9, 9, 9));
        let rejected = s
            .load_log_text("1:P(1,1,1)\n2:P(99,1,1)", &LogLimits::default())
            .unwrap();
        assert_eq!(rejected, vec![(2, LineRejection::OutsideGrid)]);
        assert_eq!(s.grid().len(), 1);
        assert!(s.grid().contains(Cell::new(0, 0, 0)));
        assert_eq!(s.log_text(), "1:P(1,1,1)");
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let mut s = Session::default();
        s.place(Cell::new(9, 9, 9));
        let limits = LogLimits {
            max_lines: 1,
            ..LogLimits::default()
        };
        assert!(s.load_log_text("1:P(1,1,1)\n2:P(2,1,1)", &limits).is_err());
        assert!(s.grid().contains(Cell::new(9, 9, 9)));
        assert_eq!(s.log().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut s = Session::default();
        s.place(Cell::new(0, 0, 0));
        let v = s.version();
        s.clear();
        assert!(s.grid().is_empty());
        assert!(s.log().is_empty());
        assert!(s.version() > v);
    }
}
