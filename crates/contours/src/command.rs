//! JSON command protocol for scripted sessions.
//!
//! Each command maps onto one controller operation (or one raw input event)
//! and runs against a [`TestHarness`].

use kurbo::Point;
use serde::{Deserialize, Serialize};
use shared::InputEvent;

use crate::cut_loop::ShiftDirection;
use crate::error::{ContourError, ContourResult};
use crate::harness::TestHarness;
use crate::state::{Mode, WidgetKind};

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ContourCommand {
    /// Click-drag cut across the tube at world height `y`
    Cut { y: f32 },
    /// Click-drag cut between two screen points
    CutStroke { from: [f64; 2], to: [f64; 2] },
    /// Guide stroke across the tube at world height `y`
    Sketch { y: f32 },
    /// Guide stroke through screen points (guide mode)
    SketchStroke { points: Vec<[f64; 2]> },
    /// Select the loop at world height `y` (loop mode)
    SelectLoop { y: f32 },
    /// Select the path under a screen point (guide mode)
    SelectPath { at: [f64; 2] },
    /// Delete the selected loop, or the selected path in guide mode
    Delete,
    Shift { direction: ShiftDirection },
    /// Re-cut the selected loop's path at `n` vertices per ring
    Nverts { n: usize },
    Align,
    /// Resegment the selected path
    Segments { n: usize },
    Smooth,
    /// Toggle the segment lock of the selected path
    Lock,
    Rotate { from: [f64; 2], to: [f64; 2] },
    Translate { from: [f64; 2], to: [f64; 2] },
    ModeToggle,
    ForceNew,
    SnapCursor,
    Undo,
    /// Feed a raw input event through the modal tool
    Event { event: InputEvent },
    /// Inspect the session: paths, selection, history.
    Inspect,
    /// Commit the lofted mesh
    Finish,
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

    fn from_result(result: ContourResult<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

fn point(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: ContourCommand) -> CommandResponse {
    let camera = harness.camera.clone();
    let response = match cmd {
        ContourCommand::Cut { y } => CommandResponse::from_result(harness.cut_across(y)),

        ContourCommand::CutStroke { from, to } => {
            let c = harness.contours_mut();
            let result = c.click_new_cut(&camera, point(from)).and_then(|_| {
                c.cut_drag(point(from).midpoint(point(to)));
                c.release_place_cut(&camera, point(to))
            });
            CommandResponse::from_result(result)
        }

        ContourCommand::Sketch { y } => CommandResponse::from_result(harness.sketch_across(y)),

        ContourCommand::SketchStroke { points } => {
            let c = harness.contours_mut();
            let result = match points.split_first() {
                Some((first, rest)) => c.sketch_begin(point(*first)).and_then(|_| {
                    for p in rest {
                        c.sketch_extend(point(*p));
                    }
                    c.sketch_confirm(&camera)
                }),
                None => Err(ContourError::degenerate("empty stroke")),
            };
            CommandResponse::from_result(result)
        }

        ContourCommand::SelectLoop { y } => match harness.select_loop_at(y) {
            Ok(hit) => CommandResponse::ok_with_data(serde_json::json!({
                "selected": hit.map(|id| id.to_string()),
            })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::SelectPath { at } => match harness.contours_mut().guide_mode_select(&camera, point(at)) {
            Ok(hit) => CommandResponse::ok_with_data(serde_json::json!({
                "selected": hit.map(|id| id.to_string()),
            })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::Delete => {
            let c = harness.contours_mut();
            let selected = c.selection().sel_loop;
            let result = match c.mode() {
                Mode::Loop => match selected {
                    Some(id) => c.loops_delete(&[id]),
                    None => Err(ContourError::NothingSelected),
                },
                Mode::Guide => c.paths_delete(),
            };
            CommandResponse::from_result(result)
        }

        ContourCommand::Shift { direction } => {
            let c = harness.contours_mut();
            let result = match c.mode() {
                Mode::Loop => c.loop_shift(direction),
                Mode::Guide => c.segment_shift(direction),
            };
            CommandResponse::from_result(result)
        }

        ContourCommand::Nverts { n } => CommandResponse::from_result(harness.contours_mut().loop_nverts_change(n)),

        ContourCommand::Align => CommandResponse::from_result(harness.contours_mut().loop_align()),

        ContourCommand::Segments { n } => {
            let c = harness.contours_mut();
            let target = c
                .selected_path()
                .or_else(|| c.selection().sel_loop.and_then(|id| c.path_of(id)))
                .map(|p| p.id);
            let result = match target {
                Some(path) => c.segment_n_loops(path, n),
                None => Err(ContourError::NothingSelected),
            };
            CommandResponse::from_result(result)
        }

        ContourCommand::Smooth => CommandResponse::from_result(harness.contours_mut().segment_smooth()),

        ContourCommand::Lock => match harness.contours_mut().segment_lock_toggle() {
            Ok(locked) => CommandResponse::ok_with_data(serde_json::json!({ "locked": locked })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::Rotate { from, to } => {
            CommandResponse::from_result(run_widget(harness, WidgetKind::Rotate, point(from), point(to)))
        }

        ContourCommand::Translate { from, to } => {
            CommandResponse::from_result(run_widget(harness, WidgetKind::Translate, point(from), point(to)))
        }

        ContourCommand::ModeToggle => match harness.contours_mut().mode_toggle() {
            Ok(mode) => CommandResponse::ok_with_data(serde_json::json!({ "mode": mode })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::ForceNew => {
            let on = harness.contours_mut().force_new_toggle();
            CommandResponse::ok_with_data(serde_json::json!({ "force_new": on }))
        }

        ContourCommand::SnapCursor => match harness.contours_mut().snap_cursor() {
            Ok(p) => CommandResponse::ok_with_data(serde_json::json!({ "cursor": p.to_array() })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::Undo => match harness.undo() {
            Ok(label) => CommandResponse::ok_with_data(serde_json::json!({ "undone": label })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ContourCommand::Event { event } => {
            let outcome = harness.send(&event);
            CommandResponse::ok_with_data(serde_json::json!({
                "outcome": outcome,
                "footer": harness.tool.footer(),
                "message": harness.contours().message(),
            }))
        }

        ContourCommand::Inspect => CommandResponse::ok_with_data(inspect(harness)),

        ContourCommand::Finish => match harness.finish() {
            Ok(()) => {
                let mesh = harness.last_mesh();
                CommandResponse::ok_with_data(serde_json::json!({
                    "vertices": mesh.map_or(0, |m| m.vertex_count()),
                    "faces": mesh.map_or(0, |m| m.face_count()),
                }))
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },
    };

    if let Some(error) = &response.error {
        tracing::warn!(%error, "command failed");
    }
    response
}

/// Prepare, move and confirm a widget gesture in one go
fn run_widget(harness: &mut TestHarness, kind: WidgetKind, from: Point, to: Point) -> ContourResult<()> {
    let camera = harness.camera.clone();
    let c = harness.contours_mut();
    match kind {
        WidgetKind::Rotate => c.prepare_rotate(from)?,
        WidgetKind::Translate => c.prepare_translate(from)?,
    }
    if let Err(e) = c.widget_transform(&camera, to) {
        c.widget_cancel()?;
        return Err(e);
    }
    c.widget_confirm()
}

fn inspect(harness: &TestHarness) -> serde_json::Value {
    let c = harness.contours();
    let paths: Vec<serde_json::Value> = c
        .paths()
        .iter()
        .map(|path| {
            serde_json::json!({
                "id": path.id.to_string(),
                "loop_count": path.len(),
                "user_loops": path.user_count(),
                "segments": path.segments(),
                "ring_size": path.ring_size(),
                "locked": path.is_locked(),
            })
        })
        .collect();
    let view = c.view_state();
    serde_json::json!({
        "mode": view.mode,
        "interaction": view.interaction,
        "path_count": view.path_count,
        "loop_count": view.loop_count,
        "selected_loop": view.sel_loop.map(|id| id.to_string()),
        "selected_path": view.sel_path.map(|id| id.to_string()),
        "force_new": view.force_new,
        "undo": c.history().labels(),
        "message": c.message(),
        "committed": c.is_committed(),
        "paths": paths,
    })
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: ContourCommand = serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(harness: &mut TestHarness, json: &str) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ContourCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds.into_iter().map(|cmd| execute_command(harness, cmd)).collect())
}
