//! Placing new loops: click-drag cuts and sketched strokes

use kurbo::{Point, Vec2};

use super::{Contours, Interaction, Mode};
use crate::cut_loop::CutLoop;
use crate::cut_path::CutPath;
use crate::error::{ContourError, ContourResult};
use crate::view::ViewProjection;

/// Least-squares line through a screen stroke, returned as its two extreme
/// points along the principal direction.
pub(crate) fn fit_stroke(points: &[Point]) -> ContourResult<(Point, Point)> {
    if points.len() < 2 {
        return Err(ContourError::degenerate("stroke needs at least 2 points"));
    }
    let n = points.len() as f64;
    let c = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2()) / n;

    let (mut xx, mut xy, mut yy) = (0.0, 0.0, 0.0);
    for p in points {
        let d = p.to_vec2() - c;
        xx += d.x * d.x;
        xy += d.x * d.y;
        yy += d.y * d.y;
    }
    // principal axis of the 2x2 covariance
    let angle = 0.5 * (2.0 * xy).atan2(xx - yy);
    let dir = Vec2::new(angle.cos(), angle.sin());

    let (lo, hi) = points
        .iter()
        .map(|p| (p.to_vec2() - c).dot(dir))
        .fold((f64::MAX, f64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));
    if hi - lo < 1e-6 {
        return Err(ContourError::degenerate("stroke has no extent"));
    }
    Ok(((c + dir * lo).to_point(), (c + dir * hi).to_point()))
}

impl Contours {
    /// Start a click-drag cut at `pos`
    pub fn click_new_cut(&mut self, view: &dyn ViewProjection, pos: Point) -> ContourResult<()> {
        self.require_idle()?;
        self.require_mode(Mode::Loop)?;
        if self.surface.raycast(&view.ray(pos)).is_none() {
            return Err(ContourError::NoIntersection);
        }
        self.interaction = Interaction::Cutting { head: pos, tail: pos };
        Ok(())
    }

    /// Follow the cursor with the pending cut's tail
    pub fn cut_drag(&mut self, pos: Point) {
        if let Interaction::Cutting { tail, .. } = &mut self.interaction {
            *tail = pos;
        }
    }

    /// Finish the pending cut and place the resulting loop.
    ///
    /// A drag shorter than `min_cut_length_px` cuts along the screen
    /// horizontal through the click.
    pub fn release_place_cut(&mut self, view: &dyn ViewProjection, pos: Point) -> ContourResult<()> {
        let Interaction::Cutting { head, .. } = self.interaction else {
            return Err(ContourError::InvalidState { expected: "cutting" });
        };
        self.interaction = Interaction::Idle;

        let (head, tail) = if head.distance(pos) < self.settings.min_cut_length_px {
            let half = Vec2::new(self.settings.min_cut_length_px, 0.0);
            (pos - half, pos + half)
        } else {
            (head, pos)
        };
        let cut = CutLoop::from_stroke(&self.surface, view, head, tail, self.settings.loop_vert_count)?;
        self.place_loop("release_place_cut", cut)
    }

    pub fn cut_cancel(&mut self) {
        if matches!(self.interaction, Interaction::Cutting { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    /// Start a freehand stroke (guide mode)
    pub fn sketch_begin(&mut self, pos: Point) -> ContourResult<()> {
        self.require_idle()?;
        self.require_mode(Mode::Guide)?;
        self.sketch = vec![pos];
        self.interaction = Interaction::Sketching;
        Ok(())
    }

    /// Append a point, smoothed toward the previous one
    pub fn sketch_extend(&mut self, pos: Point) {
        if self.interaction != Interaction::Sketching {
            return;
        }
        let s = self.settings.stroke_smoothing.clamp(0.0, 1.0);
        let next = match self.sketch.last() {
            Some(last) => last.lerp(pos, 1.0 - s),
            None => pos,
        };
        self.sketch.push(next);
    }

    /// Fit a line through the stroke and place the loop it cuts
    pub fn sketch_confirm(&mut self, view: &dyn ViewProjection) -> ContourResult<()> {
        if self.interaction != Interaction::Sketching {
            return Err(ContourError::InvalidState { expected: "sketching" });
        }
        self.interaction = Interaction::Idle;
        let stroke = std::mem::take(&mut self.sketch);

        let (head, tail) = fit_stroke(&stroke)?;
        let cut = CutLoop::from_stroke(&self.surface, view, head, tail, self.settings.loop_vert_count)?;
        self.place_loop("sketch_confirm", cut)
    }

    pub fn sketch_cancel(&mut self) {
        if self.interaction == Interaction::Sketching {
            self.interaction = Interaction::Idle;
            self.sketch.clear();
        }
    }

    /// Index of the path a new loop joins, if any
    fn join_target(&self, cut: &CutLoop) -> Option<usize> {
        if self.force_new {
            return None;
        }
        let reach = self.settings.path_proximity * cut.radius();
        self.cut_paths
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance_to(cut.center())))
            .filter(|(_, d)| *d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Insert into the nearest path or start a new one, then select the loop
    fn place_loop(&mut self, label: &'static str, mut cut: CutLoop) -> ContourResult<()> {
        cut.simplify(self.settings.handle_count);
        let id = cut.id;

        match self.join_target(&cut) {
            Some(idx) => {
                let mut path = self.cut_paths[idx].clone();
                let pos = path.insert_loop(&self.surface, cut)?;
                self.checkpoint(label);
                tracing::info!(path = %path.id, loop_id = %id, pos, "loop added to path");
                self.selection.select_loop(path.id, id);
                self.cut_paths[idx] = path;
            }
            None => {
                let path = CutPath::new(cut, self.settings.default_segments);
                self.checkpoint(label);
                tracing::info!(path = %path.id, loop_id = %id, "new path");
                self.selection.select_loop(path.id, id);
                self.cut_paths.push(path);
            }
        }
        if self.mode == Mode::Guide {
            if let Some(path) = self.selection.sel_path {
                self.selection.select_path(path);
            }
        }
        Ok(())
    }
}
