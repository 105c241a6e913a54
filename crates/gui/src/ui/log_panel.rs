//! Read-only view of the project log

use egui::Ui;

use crate::state::Session;

pub fn show(ui: &mut Ui, session: &Session) {
    ui.horizontal(|ui| {
        ui.strong("Project log");
        ui.weak(format!("{} event(s)", session.log().len()));
    });
    ui.separator();

    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    let events = session.log().len();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show_rows(ui, row_height, events, |ui, rows| {
            let visible = &session.log().events()[rows.clone()];
            for (event, seq) in visible.iter().zip(rows.start + 1..) {
                ui.monospace(event.to_line(seq));
            }
        });
}
