//! Headless test harness for programmatic editing.
//!
//! Drives a `Session` through the same pointer path as the viewport, with a
//! fixed viewport size, so picking can be exercised without a window.

use std::path::{Path, PathBuf};

use glam::{DVec3, DVec4};
use shared::{Cell, GridExtent};

use crate::error::{ExportError, LineRejection, LogLoadError};
use crate::export::{serialize_package, write_package};
use crate::project_log::LogLimits;
use crate::state::{ClickOutcome, Mode, Session};
use crate::validation::MeshValidator;
use crate::viewport::picking::Hover;

/// Viewport size used for pointer coordinates
pub const VIEWPORT_SIZE: [f64; 2] = [800.0, 600.0];

/// Headless test harness: owns a session and a virtual viewport
pub struct TestHarness {
    pub session: Session,
    pub limits: LogLimits,
}

impl TestHarness {
    /// Create a new empty harness with the default 16³ grid.
    pub fn new() -> Self {
        Self::with_extent(GridExtent::default())
    }

    pub fn with_extent(extent: GridExtent) -> Self {
        Self {
            session: Session::new(extent),
            limits: LogLimits::default(),
        }
    }

    // ── Editing ───────────────────────────────────────────────

    /// Place a cube at internal coordinates
    pub fn place(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.session.place(Cell::new(x, y, z))
    }

    /// Place every cell, returning how many were added
    pub fn place_all(&mut self, cells: &[Cell]) -> usize {
        cells.iter().filter(|&&c| self.session.place(c)).count()
    }

    pub fn erase(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.session.erase(Cell::new(x, y, z))
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.session.set_mode(mode);
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    // ── Pointer ───────────────────────────────────────────────

    /// Move the pointer to a viewport position (pixels, top-left origin)
    pub fn hover_at(&mut self, pointer: [f64; 2]) -> Hover {
        let ray = self.session.camera.screen_ray(pointer, VIEWPORT_SIZE);
        self.session.update_hover(ray.as_ref());
        self.session.hover()
    }

    pub fn click_at(&mut self, pointer: [f64; 2]) -> ClickOutcome {
        self.hover_at(pointer);
        self.session.click()
    }

    /// Pointer position where a world point appears, if it is in front of the camera
    pub fn screen_point(&self, world: [f64; 3]) -> Option<[f64; 2]> {
        let camera = &self.session.camera;
        let [w, h] = VIEWPORT_SIZE;
        let clip = camera.projection(w / h)
            * camera.modelview()
            * DVec4::from((DVec3::from(world), 1.0));
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some([(ndc.x + 1.0) * 0.5 * w, h - (ndc.y + 1.0) * 0.5 * h])
    }

    /// Hover over the screen position of a world point
    pub fn hover_world(&mut self, world: [f64; 3]) -> Hover {
        match self.screen_point(world) {
            Some(pointer) => self.hover_at(pointer),
            None => {
                self.session.update_hover(None);
                Hover::None
            }
        }
    }

    pub fn click_world(&mut self, world: [f64; 3]) -> ClickOutcome {
        self.hover_world(world);
        self.session.click()
    }

    // ── Export ────────────────────────────────────────────────

    /// 3MF archive bytes for the part containing `seed`
    pub fn export_bytes(&self, seed: Cell) -> Result<Vec<u8>, ExportError> {
        let export = self.session.export_part(seed)?;
        serialize_package(&export.mesh)
    }

    pub fn export_to(&self, seed: Cell, path: &Path) -> Result<PathBuf, ExportError> {
        let export = self.session.export_part(seed)?;
        write_package(&export.mesh, path)
    }

    /// Validation errors for the exported mesh of a part
    pub fn validate_part(&self, seed: Cell) -> Result<Vec<String>, ExportError> {
        let export = self.session.export_part(seed)?;
        Ok(MeshValidator::new(&export.mesh).validate_all())
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn cube_count(&self) -> usize {
        self.session.grid().len()
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.session.grid().contains(Cell::new(x, y, z))
    }

    pub fn log_text(&self) -> String {
        self.session.log_text()
    }

    pub fn load_log_text(&mut self, text: &str) -> Result<Vec<(usize, LineRejection)>, LogLoadError> {
        self.session.load_log_text(text, &self.limits)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert_eq!(h.cube_count(), 0);
        assert_eq!(h.log_text(), "");
    }

    #[test]
    fn test_screen_point_round_trip() {
        let mut h = TestHarness::new();
        assert_eq!(h.hover_world([3.5, 7.5, 0.0]), Hover::Ground { x: 3, y: 7 });
    }

    #[test]
    fn test_click_world_places_on_ground() {
        let mut h = TestHarness::new();
        let outcome = h.click_world([6.5, 2.5, 0.0]);
        assert!(matches!(outcome, ClickOutcome::Placed(c) if c == Cell::new(6, 2, 0)));
        assert_eq!(h.log_text(), "1:P(7,3,1)");
    }

    #[test]
    fn test_click_top_face_stacks() {
        let mut h = TestHarness::new();
        h.place(5, 5, 0);
        let outcome = h.click_world([5.5, 5.5, 1.0]);
        assert!(matches!(outcome, ClickOutcome::Placed(c) if c == Cell::new(5, 5, 1)));
    }

    #[test]
    fn test_place_all_and_validate() {
        let mut h = TestHarness::new();
        assert_eq!(h.place_all(&fixtures::l_shape()), 3);
        let errors = h.validate_part(Cell::new(0, 0, 0)).unwrap();
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut h = TestHarness::new();
        h.place(1, 1, 1);
        h.clear();
        assert_eq!(h.cube_count(), 0);
        assert_eq!(h.log_text(), "");
    }
}
