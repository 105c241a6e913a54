use glam::{DMat4, DVec3, DVec4};

use super::picking::Ray;
use crate::state::settings::CameraSettings;

const FOV_Y_DEGREES: f64 = 45.0;
const NEAR: f64 = 1.0;
const FAR: f64 = 200.0;
/// Base eye distance, scaled by `zoom`
const DOLLY: f64 = 20.0;

/// Orbit camera for the voxel viewport.
///
/// The model-view transform is `translate(pan) * rot_x * rot_y`, so the grid
/// is rotated in place in front of a fixed eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Rotation about the X axis (degrees)
    pub rot_x: f64,
    /// Rotation about the Y axis (degrees)
    pub rot_y: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Dolly factor; larger is farther away
    pub zoom: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            rot_x: 0.0,
            rot_y: 0.0,
            pan_x: -5.0,
            pan_y: -8.0,
            zoom: 1.3,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tilt from a pointer drag (pixels)
    pub fn orbit(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.rot_x += dy * sensitivity;
        self.rot_y += dx * sensitivity;
    }

    /// Pan from a pointer drag (pixels). Screen y grows downward.
    pub fn pan(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.pan_x += dx * sensitivity;
        self.pan_y -= dy * sensitivity;
    }

    /// Apply `steps` wheel notches: each notch scales zoom by `step`
    pub fn zoom_by(&mut self, steps: f64, step: f64, min: f64, max: f64) {
        let factor = step.powf(steps);
        self.zoom = (self.zoom * factor).clamp(min, max);
    }

    /// Scroll-wheel zoom using the configured step, range and direction
    pub fn wheel(&mut self, steps: f64, settings: &CameraSettings) {
        let steps = if settings.invert_zoom { -steps } else { steps };
        self.zoom_by(steps, settings.zoom_step, settings.min_zoom, settings.max_zoom);
    }

    /// Model-view matrix (world -> eye)
    pub fn modelview(&self) -> DMat4 {
        DMat4::from_translation(DVec3::new(self.pan_x, self.pan_y, -DOLLY * self.zoom))
            * DMat4::from_rotation_x(self.rot_x.to_radians())
            * DMat4::from_rotation_y(self.rot_y.to_radians())
    }

    /// Projection matrix (eye -> clip), OpenGL depth range
    pub fn projection(&self, aspect: f64) -> DMat4 {
        DMat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR)
    }

    /// Cast a ray through a pointer position.
    ///
    /// `pointer` is relative to the viewport's top-left corner; `size` is the
    /// viewport size in the same units.
    pub fn screen_ray(&self, pointer: [f64; 2], size: [f64; 2]) -> Option<Ray> {
        if size[0] <= 0.0 || size[1] <= 0.0 {
            return None;
        }
        let viewport = [0.0, 0.0, size[0], size[1]];
        let modelview = self.modelview();
        let projection = self.projection(size[0] / size[1]);
        // Window coordinates have their origin at the bottom-left
        let win_x = pointer[0];
        let win_y = size[1] - pointer[1];
        ray_from_window(win_x, win_y, &modelview, &projection, viewport)
    }
}

/// Map a window-space point (x, y, depth in `[0, 1]`) back into world space.
///
/// `viewport` is `[x, y, width, height]`. Returns `None` if the combined
/// transform is singular or the point maps to infinity.
pub fn unproject(
    window: DVec3,
    modelview: &DMat4,
    projection: &DMat4,
    viewport: [f64; 4],
) -> Option<DVec3> {
    let inverse = (*projection * *modelview).inverse();
    if !inverse.is_finite() {
        return None;
    }

    let ndc = DVec4::new(
        (window.x - viewport[0]) / viewport[2] * 2.0 - 1.0,
        (window.y - viewport[1]) / viewport[3] * 2.0 - 1.0,
        window.z * 2.0 - 1.0,
        1.0,
    );
    let world = inverse * ndc;
    if world.w.abs() < f64::EPSILON {
        return None;
    }
    Some(world.truncate() / world.w)
}

/// Ray from the near plane through the far plane at a window position
pub fn ray_from_window(
    win_x: f64,
    win_y: f64,
    modelview: &DMat4,
    projection: &DMat4,
    viewport: [f64; 4],
) -> Option<Ray> {
    let near = unproject(DVec3::new(win_x, win_y, 0.0), modelview, projection, viewport)?;
    let far = unproject(DVec3::new(win_x, win_y, 1.0), modelview, projection, viewport)?;
    Ray::new(near, far - near)
}
