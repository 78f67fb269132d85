//! Guide mode operations on whole paths

use kurbo::Point;

use super::{Contours, Mode};
use crate::cut_loop::ShiftDirection;
use crate::cut_path::PathId;
use crate::error::ContourResult;
use crate::view::ViewProjection;

impl Contours {
    /// Select the path under the cursor, or clear the selection on a miss
    pub fn guide_mode_select(&mut self, view: &dyn ViewProjection, pos: Point) -> ContourResult<Option<PathId>> {
        self.require_idle()?;
        self.require_mode(Mode::Guide)?;
        let hit = self.pick_path(view, pos);
        self.checkpoint("guide_mode_select");
        match hit {
            Some(path) => self.selection.select_path(path),
            None => self.selection.clear(),
        }
        Ok(hit)
    }

    /// Remove the selected path
    pub fn paths_delete(&mut self) -> ContourResult<()> {
        self.require_idle()?;
        let idx = self.selected_path_index()?;
        self.checkpoint("paths_delete");
        let removed = self.cut_paths.remove(idx);
        tracing::info!(path = %removed.id, loops = removed.len(), "path deleted");
        self.selection.retain_valid(&self.cut_paths);
        Ok(())
    }

    /// Rotate the seam of every ring in the selected path
    pub fn segment_shift(&mut self, direction: ShiftDirection) -> ContourResult<()> {
        self.require_idle()?;
        let idx = self.selected_path_index()?;
        self.checkpoint("segment_shift");
        self.cut_paths[idx].shift(direction);
        Ok(())
    }

    /// Resegment a path to `n` spans
    pub fn segment_n_loops(&mut self, path: PathId, n: usize) -> ContourResult<()> {
        self.require_idle()?;
        let idx = self.path_index(path)?;
        let mut next = self.cut_paths[idx].clone();
        next.resegment(&self.surface, n)?;
        self.checkpoint("segment_n_loops");
        tracing::info!(path = %path, segments = next.segments(), "path resegmented");
        self.set_message(format!("Path segments: {}", next.segments()));
        self.cut_paths[idx] = next;
        self.selection.retain_valid(&self.cut_paths);
        Ok(())
    }

    /// Relax the interior rings of the selected path
    pub fn segment_smooth(&mut self) -> ContourResult<()> {
        self.require_idle()?;
        let idx = self.selected_path_index()?;
        let mut next = self.cut_paths[idx].clone();
        next.smooth(&self.surface)?;
        self.checkpoint("segment_smooth");
        self.cut_paths[idx] = next;
        Ok(())
    }

    /// Flip the segment lock of the selected path
    pub fn segment_lock_toggle(&mut self) -> ContourResult<bool> {
        self.require_idle()?;
        let idx = self.selected_path_index()?;
        self.checkpoint("segment_lock_toggle");
        let path = &mut self.cut_paths[idx];
        path.set_locked(!path.is_locked());
        Ok(path.is_locked())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{cut, row, setup};
    use super::*;
    use crate::error::ContourError;

    fn guide_with_path() -> (Contours, crate::view::OrbitCamera) {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, -0.8).unwrap();
        cut(&mut c, &cam, 0.8).unwrap();
        c.mode_toggle().unwrap();
        (c, cam)
    }

    #[test]
    fn test_guide_select() {
        let (mut c, cam) = guide_with_path();
        let id = c.paths()[0].id;
        c.guide_mode_select(&cam, Point::new(20.0, 20.0)).unwrap();
        assert!(c.selection().sel_path.is_none());
        let hit = c.guide_mode_select(&cam, Point::new(400.0, row(&cam, 0.0))).unwrap();
        assert_eq!(hit, Some(id));
    }

    #[test]
    fn test_resegment_and_lock() {
        let (mut c, _) = guide_with_path();
        let id = c.paths()[0].id;
        c.segment_n_loops(id, 6).unwrap();
        assert_eq!(c.paths()[0].len(), 7);

        assert_eq!(
            c.segment_n_loops(id, 2),
            Err(ContourError::TooFewSegments { requested: 2 })
        );
        assert_eq!(c.paths()[0].segments(), 6);

        assert!(c.segment_lock_toggle().unwrap());
        assert_eq!(c.segment_n_loops(id, 5), Err(ContourError::PathLocked));
        assert_eq!(c.paths()[0].len(), 7);
    }

    #[test]
    fn test_paths_delete() {
        let (mut c, _) = guide_with_path();
        c.paths_delete().unwrap();
        assert!(c.paths().is_empty());
        assert!(c.selection().is_empty());
        assert_eq!(c.paths_delete(), Err(ContourError::NothingSelected));
    }

    #[test]
    fn test_segment_smooth_keeps_rings() {
        let (mut c, _) = guide_with_path();
        let count = c.paths()[0].len();
        c.segment_smooth().unwrap();
        assert_eq!(c.paths()[0].len(), count);
    }

    #[test]
    fn test_snap_cursor_to_path_middle() {
        let (mut c, _) = guide_with_path();
        let cursor = c.snap_cursor().unwrap();
        assert!(cursor.y.abs() < 0.05);
    }
}
