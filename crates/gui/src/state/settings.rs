//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::GridExtent;

use crate::error::SettingsError;

/// Grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Cells per axis. Takes effect for new sessions.
    pub extent: GridExtent,
    /// Show grid lines
    pub visible: bool,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            extent: GridExtent::default(),
            visible: true,
            opacity: 0.6,
        }
    }
}

/// Camera input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Reverse the scroll-wheel zoom direction
    pub invert_zoom: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom factor per wheel notch
    pub zoom_step: f64,
    /// Degrees per pixel of drag
    pub orbit_sensitivity: f64,
    /// World units per pixel of drag
    pub pan_sensitivity: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            invert_zoom: false,
            min_zoom: 0.1,
            max_zoom: 50.0,
            zoom_step: 1.2,
            orbit_sensitivity: 0.5,
            pan_sensitivity: 0.01,
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis line length in cells
    pub length: f32,
    /// Axis line thickness
    pub thickness: f32,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 3.0,
            thickness: 2.0,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Cube color RGB
    pub cube_color: [u8; 3],
    /// Hovered face / ground cell RGB
    pub hover_color: [u8; 3],
    /// Part highlight in export mode RGB
    pub export_color: [u8; 3],
    /// Highlight opacity (0.0 - 1.0)
    pub highlight_alpha: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 35],
            cube_color: [200, 200, 200],
            hover_color: [255, 105, 180],
            export_color: [0, 200, 0],
            highlight_alpha: 0.5,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub axes: AxisSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

/// Normalized RGB
pub fn rgb_f32(c: [u8; 3]) -> [f32; 3] {
    [
        c[0] as f32 / 255.0,
        c[1] as f32 / 255.0,
        c[2] as f32 / 255.0,
    ]
}

impl AppSettings {
    /// Platform config file location
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cubecad", "cubecad")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::default_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::error!(path = %path.display(), error = %e, "failed to save settings");
            }
        }
    }
}
