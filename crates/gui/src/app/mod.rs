//! Main application module

mod keyboard;
mod menus;
mod styles;

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::error::LineRejection;
use crate::export::{write_package, DEFAULT_EXPORT_NAME};
use crate::project_log::{default_log_file_name, LogLimits};
use crate::state::{AppSettings, ClickOutcome, PartExport, Session};
use crate::ui::{log_panel, status_bar, toolbar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct CubeApp {
    session: Session,
    settings: AppSettings,
    limits: LogLimits,
    viewport: ViewportPanel,
    show_settings_window: bool,
    show_log_panel: bool,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
    /// Settings as last written to disk
    saved_settings: AppSettings,
}

impl CubeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_log: Option<PathBuf>) -> Self {
        let settings = AppSettings::load();
        let mut session = Session::new(settings.grid.extent);

        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);

        let mut viewport = ViewportPanel::new();
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let limits = LogLimits::default();
        if let Some(path) = initial_log {
            load_log(&mut session, &path, &limits);
        }

        let last_font_size = settings.ui.font_size;
        Self {
            session,
            saved_settings: settings.clone(),
            settings,
            limits,
            viewport,
            show_settings_window: false,
            show_log_panel: true,
            last_font_size,
        }
    }

    // ── Actions shared by menus, toolbar and keyboard ────────

    pub(crate) fn action_save_log(&mut self) {
        let file_name = default_log_file_name(chrono::Local::now().naive_local());
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Log")
            .add_filter("Project log", &["txt"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };
        match self.session.save_log_file(&path) {
            Ok(()) => show_info("Save Log", &format!("Project log saved to {}", path.display())),
            Err(e) => show_error("Save Log", &e.to_string()),
        }
    }

    pub(crate) fn action_load_log(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Load Log")
            .add_filter("Project log", &["txt"])
            .pick_file()
        else {
            return;
        };
        load_log(&mut self.session, &path, &self.limits);
    }

    fn handle_click(&mut self, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Export(export) => self.save_export(export),
            ClickOutcome::ExportFailed(e) => {
                tracing::warn!(error = %e, "export refused");
                show_error("Export 3MF", &e.to_string());
            }
            ClickOutcome::Placed(_) | ClickOutcome::Erased(_) | ClickOutcome::Ignored => {}
        }
    }

    fn save_export(&mut self, export: PartExport) {
        let Some(requested) = rfd::FileDialog::new()
            .set_title("Export 3MF")
            .add_filter("3MF", &["3mf"])
            .set_file_name(DEFAULT_EXPORT_NAME)
            .save_file()
        else {
            return;
        };
        // The written name may differ from the dialog's after sanitizing
        match write_package(&export.mesh, &requested) {
            Ok(path) => show_info(
                "Export 3MF",
                &format!("Exported {} cubes to {}", export.cells, path.display()),
            ),
            Err(e) => show_error("Export 3MF", &e.to_string()),
        }
    }
}

fn load_log(session: &mut Session, path: &Path, limits: &LogLimits) {
    match session.load_log_file(path, limits) {
        Ok(rejected) => {
            tracing::info!(
                path = %path.display(),
                cubes = session.grid().len(),
                skipped = rejected.len(),
                "loaded project log"
            );
            if !rejected.is_empty() {
                show_warning("Load Log", &rejection_summary(&rejected));
            }
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load project log");
            show_error("Load Log", &e.to_string());
        }
    }
}

/// Up to ten skipped lines, one per row
fn rejection_summary(rejected: &[(usize, LineRejection)]) -> String {
    let mut text = format!("{} line(s) were skipped:\n", rejected.len());
    for (line, reason) in rejected.iter().take(10) {
        text.push_str(&format!("line {line}: {reason}\n"));
    }
    if rejected.len() > 10 {
        text.push_str("...");
    }
    text
}

fn show_info(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn show_error(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn show_warning(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

impl eframe::App for CubeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.settings.ui.font_size);
            self.last_font_size = self.settings.ui.font_size;
        }

        // Persist settings once a change has settled (no button held)
        if self.settings != self.saved_settings && !ctx.input(|i| i.pointer.any_down()) {
            self.settings.save();
            self.saved_settings = self.settings.clone();
        }

        keyboard::handle_keyboard(ctx, self);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, self);
                menus::edit_menu(ui, self);
                menus::view_menu(ui, self);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, self);

        // ── Toolbar ───────────────────────────────────────────
        let mut action = None;
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                action = toolbar::show(ui, &mut self.session);
            });
        match action {
            Some(toolbar::ToolbarAction::SaveLog) => self.action_save_log(),
            Some(toolbar::ToolbarAction::LoadLog) => self.action_load_log(),
            Some(toolbar::ToolbarAction::Settings) => self.show_settings_window = true,
            None => {}
        }

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.session);
            });

        // ── Bottom panel: project log ────────────────────────
        if self.show_log_panel {
            egui::TopBottomPanel::bottom("log_panel")
                .default_height(140.0)
                .height_range(60.0..=400.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    log_panel::show(ui, &self.session);
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        let mut outcome = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                outcome = self.viewport.show(ui, &mut self.session, &self.settings);
            });
        if let Some(outcome) = outcome {
            self.handle_click(outcome);
        }
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.settings.save();
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
    }
}
