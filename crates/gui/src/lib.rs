// Library crate: exposes testable modules for integration tests and the command interface.
// GUI-specific modules (app, ui, GL rendering) remain in the binary crate.

pub mod command;
pub mod connectivity;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod grid;
pub mod harness;
pub mod project_log;
pub mod state;
pub mod validation;

/// Viewport math shared with the binary: camera, picking and CPU-side meshes.
/// The GL renderer stays in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
    pub mod picking;
}
