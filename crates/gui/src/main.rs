mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::export`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use cubecad_lib::error;
pub use cubecad_lib::export;
pub use cubecad_lib::project_log;
pub use cubecad_lib::state;

use app::CubeApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubecad=info,cubecad_lib=info".into()),
        )
        .init();

    // Optional project log to replay on startup
    let initial_log = parse_log_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CubeCAD")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "cubecad",
        native_options,
        Box::new(move |cc| Ok(Box::new(CubeApp::new(cc, initial_log)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_log_arg() -> Option<std::path::PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--log" {
            return args.next().map(Into::into);
        }
    }
    None
}
