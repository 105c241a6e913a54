//! JSON command protocol for scripted editing.
//!
//! Coordinates in `place`, `erase` and `export` are 1-based, as in the
//! project log. `hover` and `click` take pointer pixels in the harness
//! viewport.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{Cell, UserPos};

use crate::harness::TestHarness;
use crate::state::{ClickOutcome, Mode};
use crate::viewport::picking::Hover;

/// A command a script or agent can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Place a cube
    Place { x: u32, y: u32, z: u32 },
    /// Erase a cube
    Erase { x: u32, y: u32, z: u32 },
    /// Switch interaction mode
    SetMode { mode: Mode },
    /// Move the pointer
    Hover { x: f64, y: f64 },
    /// Move the pointer and press the primary button
    Click { x: f64, y: f64 },
    /// Export the part containing a cube, optionally writing it to `path`
    Export {
        x: u32,
        y: u32,
        z: u32,
        #[serde(default)]
        path: Option<String>,
    },
    /// Replace the scene with a replayed log
    LoadLog { text: String },
    /// Save the log to a file
    SaveLog { path: String },
    /// Clear the scene
    Clear,
    /// Inspect the scene: cubes, mode, hover, log
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn cell_json(cell: Cell) -> serde_json::Value {
    match cell.to_user() {
        Some(p) => serde_json::json!([p.x, p.y, p.z]),
        None => serde_json::Value::Null,
    }
}

fn hover_json(hover: Hover) -> serde_json::Value {
    match hover {
        Hover::None => serde_json::json!({ "kind": "none" }),
        Hover::Face { cell, face } => serde_json::json!({
            "kind": "face",
            "cell": cell_json(cell),
            "face": face.name(),
        }),
        Hover::Ground { x, y } => serde_json::json!({
            "kind": "ground",
            "cell": cell_json(Cell::new(x, y, 0)),
        }),
    }
}

fn click_json(outcome: ClickOutcome) -> CommandResponse {
    match outcome {
        ClickOutcome::Placed(cell) => CommandResponse::ok_with_data(serde_json::json!({
            "result": "placed",
            "cell": cell_json(cell),
        })),
        ClickOutcome::Erased(cell) => CommandResponse::ok_with_data(serde_json::json!({
            "result": "erased",
            "cell": cell_json(cell),
        })),
        ClickOutcome::Export(export) => CommandResponse::ok_with_data(serde_json::json!({
            "result": "export",
            "cells": export.cells,
            "vertices": export.mesh.vertex_count(),
            "triangles": export.mesh.triangle_count(),
        })),
        ClickOutcome::ExportFailed(e) => CommandResponse::err(e.to_string()),
        ClickOutcome::Ignored => {
            CommandResponse::ok_with_data(serde_json::json!({ "result": "ignored" }))
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::Place { x, y, z } => {
            let cell = UserPos::new(x, y, z).to_cell();
            let placed = harness.session.place(cell);
            CommandResponse::ok_with_data(serde_json::json!({ "placed": placed }))
        }

        AgentCommand::Erase { x, y, z } => {
            let cell = UserPos::new(x, y, z).to_cell();
            let erased = harness.session.erase(cell);
            CommandResponse::ok_with_data(serde_json::json!({ "erased": erased }))
        }

        AgentCommand::SetMode { mode } => {
            harness.set_mode(mode);
            CommandResponse::ok()
        }

        AgentCommand::Hover { x, y } => {
            let hover = harness.hover_at([x, y]);
            CommandResponse::ok_with_data(hover_json(hover))
        }

        AgentCommand::Click { x, y } => click_json(harness.click_at([x, y])),

        AgentCommand::Export { x, y, z, path } => {
            let seed = UserPos::new(x, y, z).to_cell();
            let export = match harness.session.export_part(seed) {
                Ok(export) => export,
                Err(e) => return CommandResponse::err(e.to_string()),
            };
            let mut data = serde_json::json!({
                "cells": export.cells,
                "vertices": export.mesh.vertex_count(),
                "triangles": export.mesh.triangle_count(),
            });
            if let Some(path) = path {
                match crate::export::write_package(&export.mesh, Path::new(&path)) {
                    Ok(written) => data["path"] = serde_json::json!(written.display().to_string()),
                    Err(e) => return CommandResponse::err(e.to_string()),
                }
            }
            CommandResponse::ok_with_data(data)
        }

        AgentCommand::LoadLog { text } => match harness.load_log_text(&text) {
            Ok(rejected) => {
                let rejected: Vec<serde_json::Value> = rejected
                    .iter()
                    .map(|(line, reason)| {
                        serde_json::json!({ "line": line, "reason": reason.to_string() })
                    })
                    .collect();
                CommandResponse::ok_with_data(serde_json::json!({
                    "cube_count": harness.cube_count(),
                    "rejected": rejected,
                }))
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::SaveLog { path } => match harness.session.save_log_file(Path::new(&path)) {
            Ok(()) => CommandResponse::ok(),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let mut cells: Vec<Cell> = harness.session.grid().iter().collect();
            cells.sort();
            let cubes: Vec<serde_json::Value> = cells.into_iter().map(cell_json).collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "cube_count": cubes.len(),
                "cubes": cubes,
                "mode": harness.session.mode(),
                "hover": hover_json(harness.session.hover()),
                "log": harness.log_text(),
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
