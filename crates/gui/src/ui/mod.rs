pub mod log_panel;
pub mod status_bar;
pub mod toolbar;
