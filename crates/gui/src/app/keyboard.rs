//! Keyboard shortcut handling

use eframe::egui;

use super::CubeApp;
use crate::state::Mode;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, app: &mut CubeApp) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (mode, escape, save, load) = ctx.input(|i| {
        let plain = !i.modifiers.command && !i.modifiers.alt;
        let mode = if plain && i.key_pressed(egui::Key::P) {
            Some(Mode::Placing)
        } else if plain && i.key_pressed(egui::Key::E) {
            Some(Mode::Erasing)
        } else if plain && i.key_pressed(egui::Key::X) {
            Some(Mode::Exporting)
        } else {
            None
        };
        let escape = i.key_pressed(egui::Key::Escape);
        let save = i.modifiers.command && i.key_pressed(egui::Key::S);
        let load = i.modifiers.command && i.key_pressed(egui::Key::O);
        (mode, escape, save, load)
    });

    if let Some(mode) = mode {
        app.session.set_mode(mode);
    }
    if escape {
        app.session.clear_hover();
    }
    // File dialogs block, so open them outside the input lock
    if save {
        app.action_save_log();
    }
    if load {
        app.action_load_log();
    }
}
