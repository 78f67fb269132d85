//! Headless test harness for driving a contour session without a host.
//!
//! Bundles a surface, a front camera, the modal tool and a mesh sink.

use glam::Vec3;
use kurbo::Point;
use shared::{CommittedMesh, InputEvent};

use crate::cut_loop::LoopId;
use crate::error::ContourResult;
use crate::fixtures;
use crate::modal::{ContoursTool, ToolOutcome};
use crate::state::{Contours, Mode, ToolSettings};
use crate::surface::SurfaceMesh;
use crate::validation::MeshValidator;
use crate::view::OrbitCamera;

/// Screen span of harness strokes; wider than the tube at the default camera
const STROKE_X: (f64, f64) = (330.0, 490.0);

pub struct TestHarness {
    pub tool: ContoursTool,
    pub camera: OrbitCamera,
    pub committed: Vec<CommittedMesh>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Unit tube seen head-on, small test settings
    pub fn new() -> Self {
        Self::with_surface(fixtures::tube(), fixtures::test_settings(), fixtures::front_camera(Vec3::ZERO))
    }

    pub fn with_surface(surface: SurfaceMesh, settings: ToolSettings, camera: OrbitCamera) -> Self {
        Self {
            tool: ContoursTool::new(surface, settings),
            camera,
            committed: Vec::new(),
        }
    }

    pub fn contours(&self) -> &Contours {
        self.tool.contours()
    }

    pub fn contours_mut(&mut self) -> &mut Contours {
        self.tool.contours_mut()
    }

    // ── Events ────────────────────────────────────────────────

    /// Feed one event through the modal tool
    pub fn send(&mut self, event: &InputEvent) -> ToolOutcome {
        self.tool.handle(&self.camera, &mut self.committed, event)
    }

    pub fn press_key(&mut self, key: &str) -> ToolOutcome {
        self.send(&InputEvent::press(key, 0.0, 0.0))
    }

    /// Press, move through and release along `points`; returns the last outcome
    pub fn drag(&mut self, key: &str, points: &[Point]) -> ToolOutcome {
        let mut outcome = ToolOutcome::Running;
        for event in fixtures::stroke_events(key, points) {
            outcome = self.send(&event);
        }
        outcome
    }

    // ── Gestures ──────────────────────────────────────────────

    /// Screen row of world height `y` on the front of the tube
    pub fn row(&self, y: f32) -> f64 {
        fixtures::screen_row(&self.camera, y)
    }

    /// Horizontal click-drag cut across the tube at height `y`
    pub fn cut_across(&mut self, y: f32) -> ContourResult<()> {
        let sy = self.row(y);
        let (x0, x1) = STROKE_X;
        let camera = self.camera.clone();
        let contours = self.tool.contours_mut();
        contours.click_new_cut(&camera, Point::new(x0, sy))?;
        contours.cut_drag(Point::new((x0 + x1) * 0.5, sy));
        contours.release_place_cut(&camera, Point::new(x1, sy))
    }

    /// Guide stroke across the tube at height `y`, switching to guide mode first
    pub fn sketch_across(&mut self, y: f32) -> ContourResult<()> {
        let points = fixtures::horizontal_stroke(self.row(y), STROKE_X.0, STROKE_X.1, 17);
        let camera = self.camera.clone();
        let contours = self.tool.contours_mut();
        if contours.mode() == Mode::Loop {
            contours.mode_toggle()?;
        }
        contours.sketch_begin(points[0])?;
        for p in &points[1..] {
            contours.sketch_extend(*p);
        }
        contours.sketch_confirm(&camera)
    }

    /// Right-click select at height `y` in loop mode
    pub fn select_loop_at(&mut self, y: f32) -> ContourResult<Option<LoopId>> {
        let at = Point::new(400.0, self.row(y));
        let camera = self.camera.clone();
        self.tool.contours_mut().loop_select(&camera, at)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn loop_count(&self) -> usize {
        self.contours().loop_count()
    }

    pub fn path_count(&self) -> usize {
        self.contours().paths().len()
    }

    pub fn undo(&mut self) -> ContourResult<Option<&'static str>> {
        self.tool.contours_mut().undo_action()
    }

    // ── Commit ────────────────────────────────────────────────

    pub fn finish(&mut self) -> ContourResult<()> {
        self.tool.contours_mut().finish_mesh(&mut self.committed)
    }

    pub fn last_mesh(&self) -> Option<&CommittedMesh> {
        self.committed.last()
    }

    /// Problems found in every committed mesh
    pub fn validate_committed(&self) -> Vec<String> {
        self.committed
            .iter()
            .flat_map(|mesh| MeshValidator::new(mesh).validate_all())
            .collect()
    }
}
