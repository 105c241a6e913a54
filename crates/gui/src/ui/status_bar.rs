use egui::Ui;
use shared::Cell;

use crate::state::{Mode, Session};
use crate::viewport::picking::Hover;

/// Hovered cell in the same 1-based coordinates as the project log
fn hover_text(hover: Hover) -> Option<String> {
    let (cell, what) = match hover {
        Hover::Face { cell, face } => (cell, face.name()),
        Hover::Ground { x, y } => (Cell::new(x, y, 0), "ground"),
        Hover::None => return None,
    };
    let p = cell.to_user()?;
    Some(format!("({}, {}, {}) {what}", p.x, p.y, p.z))
}

pub fn show(ui: &mut Ui, session: &Session) {
    ui.horizontal(|ui| {
        ui.weak(format!("Cubes: {}", session.grid().len()));
        ui.separator();
        ui.label(format!("Mode: {}", session.mode().label()));
        ui.separator();

        match hover_text(session.hover()) {
            Some(text) => ui.label(text),
            None => ui.weak("-"),
        };

        if session.mode() == Mode::Exporting && !session.part_highlight().is_empty() {
            ui.separator();
            ui.weak(format!("Part faces: {}", session.part_highlight().len()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("CubeCAD v", env!("CARGO_PKG_VERSION")));
        });
    });
}
