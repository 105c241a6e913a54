//! Integration tests for TestHarness.
//!
//! Drives the session through pointer positions the way the viewport does.

use cubecad_lib::export::{mesh_for_part, MAX_EXPORT_CELLS};
use cubecad_lib::fixtures;
use cubecad_lib::grid::VoxelGrid;
use cubecad_lib::harness::TestHarness;
use cubecad_lib::state::{ClickOutcome, Mode};
use cubecad_lib::validation::MeshValidator;
use cubecad_lib::viewport::picking::Hover;
use shared::{Cell, Face, GridExtent};

#[test]
fn test_harness_stack_a_tower_by_clicking() {
    let mut h = TestHarness::new();

    assert!(matches!(h.click_world([2.5, 2.5, 0.0]), ClickOutcome::Placed(_)));
    for z in 1..4 {
        let outcome = h.click_world([2.5, 2.5, z as f64]);
        assert!(
            matches!(outcome, ClickOutcome::Placed(c) if c == Cell::new(2, 2, z)),
            "level {z}: {outcome:?}"
        );
    }

    assert_eq!(h.cube_count(), 4);
    assert_eq!(
        h.log_text(),
        "1:P(3,3,1)\n2:P(3,3,2)\n3:P(3,3,3)\n4:P(3,3,4)"
    );
}

#[test]
fn test_harness_erase_by_clicking() {
    let mut h = TestHarness::new();
    h.place(6, 6, 0);
    h.place(6, 6, 1);
    h.set_mode(Mode::Erasing);

    let outcome = h.click_world([6.5, 6.5, 2.0]);
    assert!(matches!(outcome, ClickOutcome::Erased(c) if c == Cell::new(6, 6, 1)));
    assert_eq!(h.session.hover(), Hover::None);

    // The ground is not a target while erasing
    let outcome = h.click_world([10.5, 10.5, 0.0]);
    assert!(matches!(outcome, ClickOutcome::Ignored));
    assert_eq!(h.cube_count(), 1);
    assert_eq!(h.log_text(), "1:P(7,7,1)\n2:P(7,7,2)\n3:E(7,7,2)");
}

#[test]
fn test_harness_hover_off_grid_is_none() {
    let mut h = TestHarness::new();
    assert_eq!(h.hover_world([-3.5, 2.5, 0.0]), Hover::None);
    assert!(matches!(h.click_world([-3.5, 2.5, 0.0]), ClickOutcome::Ignored));
    assert_eq!(h.cube_count(), 0);
}

#[test]
fn test_harness_top_face_wins_over_ground() {
    let mut h = TestHarness::new();
    h.place(8, 8, 0);
    match h.hover_world([8.5, 8.5, 1.0]) {
        Hover::Face { cell, face } => {
            assert_eq!(cell, Cell::new(8, 8, 0));
            assert_eq!(face, Face::Top);
        }
        other => panic!("expected a face hover, got {other:?}"),
    }
}

#[test]
fn test_harness_export_highlight_covers_part() {
    let mut h = TestHarness::new();
    h.place_all(&fixtures::l_shape());
    h.place(9, 9, 0);
    h.set_mode(Mode::Exporting);

    h.hover_world([0.5, 0.5, 1.0]);
    // Three cubes in an L share two faces each way: 18 - 4
    assert_eq!(h.session.part_highlight().len(), 14);
    assert!(h
        .session
        .part_highlight()
        .iter()
        .all(|(cell, _)| *cell != Cell::new(9, 9, 0)));
}

#[test]
fn test_harness_export_mesh_is_valid() {
    let mut h = TestHarness::new();
    h.place_all(&fixtures::bar(Cell::new(1, 1, 0), 4));

    let errors = h.validate_part(Cell::new(2, 1, 0)).unwrap();
    assert!(errors.is_empty(), "Validation errors: {errors:?}");

    let export = h.session.export_part(Cell::new(1, 1, 0)).unwrap();
    let v = MeshValidator::new(&export.mesh);
    assert_eq!(v.vertex_count(), 32);
    assert_eq!(v.triangle_count(), 48);
    assert!(v.assert_dimensions_approx([40.0, 10.0, 10.0], 1e-9));
}

#[test]
fn test_harness_export_ceiling() {
    let mut h = TestHarness::with_extent(GridExtent::cube(18));
    let block = fixtures::block(18, 18, 16);
    assert!(block.len() > MAX_EXPORT_CELLS);
    assert_eq!(h.place_all(&block), block.len());

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("big.3mf");
    let err = h.export_to(Cell::new(0, 0, 0), &target).unwrap_err();
    assert!(err.to_string().contains("limited to 5000"), "{err}");
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    // A part of exactly the ceiling size is accepted
    let grid: VoxelGrid = fixtures::block(25, 20, 10).into_iter().collect();
    let (part, mesh) = mesh_for_part(&grid, Cell::new(0, 0, 0)).unwrap();
    assert_eq!(part.len(), MAX_EXPORT_CELLS);
    assert_eq!(mesh.triangle_count(), MAX_EXPORT_CELLS * 12);
}

#[test]
fn test_harness_camera_does_not_touch_scene() {
    let mut h = TestHarness::new();
    h.place(1, 1, 0);
    let log = h.log_text();

    h.session.camera.orbit(40.0, -25.0, 0.5);
    h.session.camera.pan(12.0, 7.0, 0.01);
    h.session
        .camera
        .wheel(3.0, &cubecad_lib::state::CameraSettings::default());

    assert_eq!(h.cube_count(), 1);
    assert_eq!(h.log_text(), log);
}
