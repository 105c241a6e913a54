//! Toolbar: file actions, tool modes and the export hint

use egui::Ui;

use crate::state::{Mode, Session};

/// Toolbar buttons the app handles itself (they open dialogs or windows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    SaveLog,
    LoadLog,
    Settings,
}

const EXPORT_HINT: &str = "Hover over the part and click it to export 3MF";

/// Show the toolbar. Mode buttons act on the session directly.
pub fn show(ui: &mut Ui, session: &mut Session) -> Option<ToolbarAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("Save Log").on_hover_text("Save the project log  Ctrl+S").clicked() {
            action = Some(ToolbarAction::SaveLog);
        }
        if ui.button("Load Log").on_hover_text("Replay a project log  Ctrl+O").clicked() {
            action = Some(ToolbarAction::LoadLog);
        }

        ui.separator();

        let tools = [
            (Mode::Placing, "Place", "Place cubes  P"),
            (Mode::Erasing, "Erase", "Erase cubes  E"),
            (Mode::Exporting, "Export 3MF", "Export a connected part  X"),
        ];
        for (mode, label, tip) in tools {
            if ui
                .selectable_label(session.mode() == mode, label)
                .on_hover_text(tip)
                .clicked()
            {
                session.set_mode(mode);
            }
        }

        ui.separator();

        if ui.button("Settings").clicked() {
            action = Some(ToolbarAction::Settings);
        }

        if session.mode() == Mode::Exporting {
            ui.separator();
            ui.colored_label(egui::Color32::RED, EXPORT_HINT);
        }
    });
    action
}
