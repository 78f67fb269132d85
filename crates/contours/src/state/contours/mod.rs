//! Contours controller
//!
//! Owns the cut paths, the selection, the undo history and the transient
//! interaction state. Operations are split by concern into the submodules;
//! each one validates its input and builds the new state before recording an
//! undo snapshot, so a failed operation leaves everything as it was.

mod commit;
mod cut_ops;
mod history;
mod loop_ops;
mod path_ops;
mod widget_ops;

pub use commit::MeshSink;
pub use history::{History, Snapshot};

use glam::Vec3;
use kurbo::Point;
use serde::Serialize;

use crate::cut_loop::{CutLoop, LoopId};
use crate::cut_path::{CutPath, PathId};
use crate::error::{ContourError, ContourResult};
use crate::state::selection::SelectionState;
use crate::state::settings::ToolSettings;
use crate::surface::SurfaceMesh;
use crate::view::ViewProjection;

/// Gesture set in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Loop,
    Guide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Rotate,
    Translate,
}

/// Active rotate/translate gesture
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub kind: WidgetKind,
    pub path: PathId,
    pub target: LoopId,
    /// Cursor position when the gesture started
    pub anchor: Point,
    pub pivot: Vec3,
    /// The loop as it was before the gesture
    pub original: CutLoop,
}

/// Transient interaction state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Click-drag cut in progress; `tail` follows the cursor
    Cutting { head: Point, tail: Point },
    Sketching,
    Widget(Box<WidgetState>),
}

/// Fieldless mirror of [`Interaction`] for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Idle,
    Cutting,
    Sketching,
    Widget,
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Idle => InteractionKind::Idle,
            Interaction::Cutting { .. } => InteractionKind::Cutting,
            Interaction::Sketching => InteractionKind::Sketching,
            Interaction::Widget(_) => InteractionKind::Widget,
        }
    }
}

/// Read-only summary for drawing and inspection
#[derive(Debug, Clone, PartialEq)]
pub struct ContoursView {
    pub mode: Mode,
    pub interaction: InteractionKind,
    pub sel_loop: Option<LoopId>,
    pub sel_path: Option<PathId>,
    pub hover_loop: Option<LoopId>,
    pub hover_path: Option<PathId>,
    pub path_count: usize,
    pub loop_count: usize,
    pub sketch_len: usize,
    pub force_new: bool,
    pub undo_len: usize,
}

/// Contour editing session over one surface
pub struct Contours {
    surface: SurfaceMesh,
    settings: ToolSettings,
    mode: Mode,
    interaction: Interaction,
    cut_paths: Vec<CutPath>,
    selection: SelectionState,
    /// Stroke points in screen space while sketching
    sketch: Vec<Point>,
    force_new: bool,
    history: History,
    /// Host 3D cursor location set by `snap_cursor`
    cursor: Option<Vec3>,
    message: Option<String>,
    committed: bool,
}

impl Contours {
    pub fn new(surface: SurfaceMesh, settings: ToolSettings) -> Self {
        let history = History::new(settings.undo_depth);
        Self {
            surface,
            settings,
            mode: Mode::Loop,
            interaction: Interaction::Idle,
            cut_paths: Vec::new(),
            selection: SelectionState::default(),
            sketch: Vec::new(),
            force_new: false,
            history,
            cursor: None,
            message: None,
            committed: false,
        }
    }

    pub fn surface(&self) -> &SurfaceMesh {
        &self.surface
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn paths(&self) -> &[CutPath] {
        &self.cut_paths
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn sketch(&self) -> &[Point] {
        &self.sketch
    }

    pub fn force_new(&self) -> bool {
        self.force_new
    }

    pub fn cursor(&self) -> Option<Vec3> {
        self.cursor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Last user-facing message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Record a rejected operation as the user message
    pub fn report(&mut self, op: &str, err: &ContourError) {
        tracing::warn!(op, error = %err, "operation rejected");
        self.message = Some(err.to_string());
    }

    pub fn path(&self, id: PathId) -> Option<&CutPath> {
        self.cut_paths.iter().find(|p| p.id == id)
    }

    /// Path holding the loop
    pub fn path_of(&self, id: LoopId) -> Option<&CutPath> {
        self.cut_paths.iter().find(|p| p.contains(id))
    }

    pub fn find_loop(&self, id: LoopId) -> Option<&CutLoop> {
        self.cut_paths.iter().find_map(|p| p.get(id))
    }

    pub fn loop_count(&self) -> usize {
        self.cut_paths.iter().map(CutPath::len).sum()
    }

    pub fn selected_loop(&self) -> Option<&CutLoop> {
        self.selection.sel_loop.and_then(|id| self.find_loop(id))
    }

    pub fn selected_path(&self) -> Option<&CutPath> {
        self.selection.sel_path.and_then(|id| self.path(id))
    }

    pub fn view_state(&self) -> ContoursView {
        ContoursView {
            mode: self.mode,
            interaction: self.interaction.kind(),
            sel_loop: self.selection.sel_loop,
            sel_path: self.selection.sel_path,
            hover_loop: self.selection.hover_loop,
            hover_path: self.selection.hover_path,
            path_count: self.cut_paths.len(),
            loop_count: self.loop_count(),
            sketch_len: self.sketch.len(),
            force_new: self.force_new,
            undo_len: self.history.len(),
        }
    }

    /// Push the current paths and selection onto the undo history
    pub(crate) fn checkpoint(&mut self, label: &'static str) {
        self.history.push(label, &self.cut_paths, &self.selection);
    }

    fn require_idle(&self) -> ContourResult<()> {
        match self.interaction {
            Interaction::Idle => Ok(()),
            _ => Err(ContourError::InvalidState { expected: "idle" }),
        }
    }

    fn require_mode(&self, mode: Mode) -> ContourResult<()> {
        if self.mode != mode {
            return Err(ContourError::InvalidState {
                expected: match mode {
                    Mode::Loop => "loop mode",
                    Mode::Guide => "guide mode",
                },
            });
        }
        Ok(())
    }

    fn path_index(&self, id: PathId) -> ContourResult<usize> {
        self.cut_paths
            .iter()
            .position(|p| p.id == id)
            .ok_or(ContourError::UnknownPath)
    }

    /// Selected loop with the index of its path
    fn selected_loop_location(&self) -> ContourResult<(usize, LoopId)> {
        let id = self.selection.sel_loop.ok_or(ContourError::NothingSelected)?;
        let idx = self
            .cut_paths
            .iter()
            .position(|p| p.contains(id))
            .ok_or(ContourError::UnknownLoop)?;
        Ok((idx, id))
    }

    fn selected_path_index(&self) -> ContourResult<usize> {
        let id = self.selection.sel_path.ok_or(ContourError::NothingSelected)?;
        self.path_index(id)
    }

    /// Closest loop outline within the pick radius
    fn pick_loop(&self, view: &dyn ViewProjection, pos: Point) -> Option<(PathId, LoopId)> {
        self.cut_paths
            .iter()
            .flat_map(|p| p.loops().iter().map(move |l| (p.id, l)))
            .map(|(path, l)| (path, l.id, l.screen_distance(view, pos)))
            .filter(|(_, _, d)| *d <= self.settings.pick_radius_px)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(path, id, _)| (path, id))
    }

    /// Path with a loop outline within the pick radius
    fn pick_path(&self, view: &dyn ViewProjection, pos: Point) -> Option<PathId> {
        self.pick_loop(view, pos).map(|(path, _)| path)
    }

    /// Hover highlight for the next draw, no undo entry
    pub fn hover(&mut self, view: &dyn ViewProjection, pos: Point) {
        match self.mode {
            Mode::Loop => {
                self.selection.hover_loop = self.pick_loop(view, pos).map(|(_, id)| id);
                self.selection.hover_path = None;
            }
            Mode::Guide => {
                self.selection.hover_path = self.pick_path(view, pos);
                self.selection.hover_loop = None;
            }
        }
    }

    /// Switch between loop and guide gestures
    pub fn mode_toggle(&mut self) -> ContourResult<Mode> {
        self.require_idle()?;
        self.mode = match self.mode {
            Mode::Loop => {
                if let Some(path) = self.selected_loop().and(self.selection.sel_path) {
                    self.selection.select_path(path);
                }
                Mode::Guide
            }
            Mode::Guide => Mode::Loop,
        };
        self.selection.hover_loop = None;
        self.selection.hover_path = None;
        tracing::info!(mode = ?self.mode, "mode changed");
        Ok(self.mode)
    }

    pub fn force_new_toggle(&mut self) -> bool {
        self.force_new = !self.force_new;
        self.force_new
    }

    /// Restore the state before the last recorded operation
    pub fn undo_action(&mut self) -> ContourResult<Option<&'static str>> {
        self.require_idle()?;
        let Some(snapshot) = self.history.pop() else {
            self.set_message("Nothing to undo");
            return Ok(None);
        };
        self.cut_paths = snapshot.paths;
        self.selection = snapshot.selection;
        tracing::info!(label = snapshot.label, "undo");
        Ok(Some(snapshot.label))
    }
}
