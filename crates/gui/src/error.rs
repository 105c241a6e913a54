//! Error types for export, log persistence, and input validation.

use thiserror::Error;

/// Failures while exporting a part as a 3MF package.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The seed cell is not occupied
    #[error("nothing to export: no cube at the selected position")]
    EmptyPart,

    #[error("part has {cells} cubes, export is limited to {limit}")]
    PartTooLarge { cells: usize, limit: usize },

    /// Sanitizing the requested name landed on a different, existing file
    #[error("{} already exists; choose another name", .path.display())]
    NameTaken { path: std::path::PathBuf },

    #[error("failed to write model XML: {0}")]
    Xml(String),

    #[error("failed to build 3MF archive: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub(crate) fn xml(e: impl std::fmt::Display) -> Self {
        Self::Xml(e.to_string())
    }

    pub(crate) fn archive(e: impl std::fmt::Display) -> Self {
        Self::Archive(e.to_string())
    }
}

/// File-level failures while loading a project log. Nothing is applied.
#[derive(Debug, Error)]
pub enum LogLoadError {
    #[error("log file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("log file has {count} lines, limit is {limit}")]
    TooManyLines { count: usize, limit: usize },

    #[error("log places more than {limit} cubes")]
    TooManyCubes { limit: usize },

    #[error("log file is not valid UTF-8")]
    NotUtf8,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single log line was skipped during load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("line exceeds the maximum length")]
    TooLong,

    #[error("line has too many commands")]
    TooManyTokens,

    #[error("line does not match N:P(x,y,z) or N:E(x,y,z)")]
    Malformed,

    #[error("coordinate outside the accepted range")]
    CoordinateOutOfRange,

    #[error("position is outside the grid")]
    OutsideGrid,
}

/// Failures while saving a project log.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}
