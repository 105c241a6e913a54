//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
pub use cubecad_lib::viewport::{camera, mesh, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::state::settings::{rgb_f32, AppSettings};
use crate::state::{ClickOutcome, Mode, Session};
use camera::OrbitCamera;
use gl_renderer::GlRenderer;
use mesh::MeshData;
use picking::Hover;

/// Scroll distance egui reports for one mouse-wheel notch
const POINTS_PER_WHEEL_STEP: f32 = 50.0;

/// Inputs the hover was last computed from
#[derive(Clone, Copy, PartialEq)]
struct HoverKey {
    pointer: egui::Pos2,
    size: egui::Vec2,
    version: u64,
    mode: Mode,
    camera: OrbitCamera,
}

/// CPU cube mesh for one grid version and color
struct CubeCache {
    key: u64,
    mesh: Arc<MeshData>,
}

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    cubes: Option<CubeCache>,
    hover_key: Option<HoverKey>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            cubes: None,
            hover_key: None,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("GL renderer unavailable: {e}"),
        }
    }

    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    /// Handle pointer input and paint. Returns the outcome of a primary click.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        session: &mut Session,
        settings: &AppSettings,
    ) -> Option<ClickOutcome> {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // ── Camera controls ──────────────────────────────────
        let cam = &settings.camera;
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            session
                .camera
                .orbit(delta.x as f64, delta.y as f64, cam.orbit_sensitivity);
        }
        if response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_delta();
            session
                .camera
                .pan(delta.x as f64, delta.y as f64, cam.pan_sensitivity);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                session
                    .camera
                    .wheel((scroll / POINTS_PER_WHEEL_STEP) as f64, cam);
            }
        }

        // ── Hover ────────────────────────────────────────────
        self.update_hover(&response, rect, session);

        // ── Primary click ────────────────────────────────────
        let outcome = if response.clicked_by(egui::PointerButton::Primary) {
            Some(session.click())
        } else {
            None
        };

        if ui.is_rect_visible(rect) {
            self.render_gl(ui, rect, session, settings);
        }

        outcome
    }

    fn update_hover(&mut self, response: &egui::Response, rect: egui::Rect, session: &mut Session) {
        let Some(pos) = response.hover_pos() else {
            if self.hover_key.take().is_some() {
                session.clear_hover();
            }
            return;
        };

        let key = HoverKey {
            pointer: pos,
            size: rect.size(),
            version: session.version(),
            mode: session.mode(),
            camera: session.camera,
        };
        if self.hover_key == Some(key) {
            return;
        }
        self.hover_key = Some(key);

        let local = pos - rect.min;
        let ray = session.camera.screen_ray(
            [local.x as f64, local.y as f64],
            [rect.width() as f64, rect.height() as f64],
        );
        session.update_hover(ray.as_ref());
    }

    fn cube_mesh(&mut self, session: &Session, settings: &AppSettings) -> Arc<MeshData> {
        let color = settings.viewport.cube_color;
        let key = session.version() << 24
            | (color[0] as u64) << 16
            | (color[1] as u64) << 8
            | color[2] as u64;
        if let Some(cache) = &self.cubes {
            if cache.key == key {
                return cache.mesh.clone();
            }
        }
        let cells = session.grid().all();
        let mesh = Arc::new(mesh::cubes(cells, rgb_f32(color)));
        tracing::debug!(cubes = cells.len(), vertices = mesh.vertex_count(), "rebuilt cube mesh");
        self.cubes = Some(CubeCache {
            key,
            mesh: mesh.clone(),
        });
        mesh
    }

    fn highlight_mesh(session: &Session, settings: &AppSettings) -> MeshData {
        let vp = &settings.viewport;
        if session.mode() == Mode::Exporting {
            return mesh::face_highlight(session.part_highlight(), rgb_f32(vp.export_color));
        }
        let color = rgb_f32(vp.hover_color);
        match session.hover() {
            Hover::Face { cell, face } => mesh::face_highlight(&[(cell, face)], color),
            Hover::Ground { x, y } => mesh::ground_highlight(x, y, color),
            Hover::None => MeshData::default(),
        }
    }

    fn render_gl(&mut self, ui: &mut Ui, rect: egui::Rect, session: &Session, settings: &AppSettings) {
        let Some(gl_renderer) = self.gl_renderer.clone() else {
            return;
        };

        let aspect = (rect.width() / rect.height().max(1.0)) as f64;
        let mvp = (session.camera.projection(aspect) * session.camera.modelview()).as_mat4();

        let cubes = self.cube_mesh(session, settings);
        let cubes_key = self.cubes.as_ref().map_or(0, |c| c.key);
        let highlight = Self::highlight_mesh(session, settings);
        let extent = session.extent();

        let grid_settings = settings.grid.clone();
        let axes_settings = settings.axes.clone();
        let bg_color = settings.viewport.background_color;
        let highlight_alpha = settings.viewport.highlight_alpha;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = gl_renderer.lock() {
                    r.update_grid(gl, extent, &grid_settings);
                    r.update_axes(gl, &axes_settings);
                    r.sync_cubes(gl, &cubes, cubes_key);
                    r.sync_highlight(gl, &highlight);

                    let render_params = gl_renderer::RenderParams {
                        viewport,
                        mvp,
                        grid_visible: grid_settings.visible,
                        axes_visible: axes_settings.visible,
                        axes_thickness: axes_settings.thickness,
                        bg_color,
                        highlight_alpha,
                    };
                    r.paint(gl, &render_params);
                }
            })),
        };
        ui.painter().add(callback);
    }
}
