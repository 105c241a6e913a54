//! Application menu bar and settings window

use eframe::egui;

use super::CubeApp;
use crate::state::settings::AppSettings;
use crate::state::Mode;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, app: &mut CubeApp) {
    ui.menu_button("File", |ui| {
        if ui.button("New").clicked() {
            app.session.clear();
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Load Log...").clicked() {
            ui.close_menu();
            app.action_load_log();
        }
        if ui.button("Save Log...").clicked() {
            ui.close_menu();
            app.action_save_log();
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the edit menu
pub fn edit_menu(ui: &mut egui::Ui, app: &mut CubeApp) {
    ui.menu_button("Edit", |ui| {
        for mode in [Mode::Placing, Mode::Erasing, Mode::Exporting] {
            let shortcut = match mode {
                Mode::Placing => "P",
                Mode::Erasing => "E",
                Mode::Exporting => "X",
            };
            if ui
                .selectable_label(app.session.mode() == mode, format!("{}  {shortcut}", mode.label()))
                .clicked()
            {
                app.session.set_mode(mode);
                ui.close_menu();
            }
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, app: &mut CubeApp) {
    ui.menu_button("View", |ui| {
        ui.checkbox(&mut app.show_log_panel, "Project log");
        ui.checkbox(&mut app.settings.grid.visible, "Grid");
        ui.checkbox(&mut app.settings.axes.visible, "Axes");
        ui.separator();
        if ui.button("Reset camera").clicked() {
            app.session.camera = Default::default();
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Settings...").clicked() {
            app.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, app: &mut CubeApp) {
    let mut open = app.show_settings_window;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_grid_settings(ui, &mut app.settings);
                show_camera_settings(ui, &mut app.settings);
                show_axes_settings(ui, &mut app.settings);
                show_viewport_settings(ui, &mut app.settings);
                show_ui_settings(ui, &mut app.settings);
                show_settings_buttons(ui, app);
            });
        });
    app.show_settings_window &= open;
}

fn show_grid_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Grid");
    ui.checkbox(&mut settings.grid.visible, "Show grid");

    let extent = &mut settings.grid.extent;
    ui.horizontal(|ui| {
        ui.label("Size (new scenes)");
        for axis in [&mut extent.x, &mut extent.y, &mut extent.z] {
            ui.add(egui::DragValue::new(axis).speed(1).range(1..=1000));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Line opacity");
        ui.add(egui::Slider::new(&mut settings.grid.opacity, 0.0..=1.0));
    });
    ui.add_space(10.0);
}

fn show_camera_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Camera");
    ui.checkbox(&mut settings.camera.invert_zoom, "Invert scroll zoom");

    ui.horizontal(|ui| {
        ui.label("Zoom step");
        ui.add(
            egui::DragValue::new(&mut settings.camera.zoom_step)
                .speed(0.01)
                .range(1.01..=3.0),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Orbit speed");
        ui.add(
            egui::DragValue::new(&mut settings.camera.orbit_sensitivity)
                .speed(0.05)
                .range(0.05..=5.0)
                .suffix(" °/px"),
        );
    });
    ui.add_space(10.0);
}

fn show_axes_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Axes");
    ui.checkbox(&mut settings.axes.visible, "Show axes");

    ui.horizontal(|ui| {
        ui.label("Length");
        ui.add(
            egui::DragValue::new(&mut settings.axes.length)
                .speed(0.1)
                .range(0.5..=50.0),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Thickness");
        ui.add(
            egui::DragValue::new(&mut settings.axes.thickness)
                .speed(0.1)
                .range(0.5..=5.0),
        );
    });
    ui.add_space(10.0);
}

fn color_row(ui: &mut egui::Ui, label: &str, rgb: &mut [u8; 3]) {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
        if ui.color_edit_button_srgba(&mut color).changed() {
            *rgb = [color.r(), color.g(), color.b()];
        }
    });
}

fn show_viewport_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Viewport");
    let vp = &mut settings.viewport;
    color_row(ui, "Background", &mut vp.background_color);
    color_row(ui, "Cubes", &mut vp.cube_color);
    color_row(ui, "Hover", &mut vp.hover_color);
    color_row(ui, "Export part", &mut vp.export_color);

    ui.horizontal(|ui| {
        ui.label("Highlight opacity");
        ui.add(egui::Slider::new(&mut vp.highlight_alpha, 0.1..=1.0));
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, app: &mut CubeApp) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            app.settings.save();
        }
        if ui.button("Reset").clicked() {
            app.settings = AppSettings::default();
        }
        if ui.button("Close").clicked() {
            app.show_settings_window = false;
        }
    });
}
