//! Loop mode operations on the selected loop

use glam::Vec3;
use kurbo::Point;

use super::{Contours, Mode};
use crate::cut_loop::{LoopId, LoopKind, ShiftDirection};
use crate::error::{ContourError, ContourResult};
use crate::view::ViewProjection;

impl Contours {
    /// Select the loop under the cursor, or clear the selection on a miss
    pub fn loop_select(&mut self, view: &dyn ViewProjection, pos: Point) -> ContourResult<Option<LoopId>> {
        self.require_idle()?;
        self.require_mode(Mode::Loop)?;
        let hit = self.pick_loop(view, pos);
        self.checkpoint("loop_select");
        match hit {
            Some((path, id)) => self.selection.select_loop(path, id),
            None => self.selection.clear(),
        }
        Ok(hit.map(|(_, id)| id))
    }

    /// Remove user loops; paths left without loops are removed too
    pub fn loops_delete(&mut self, loops: &[LoopId]) -> ContourResult<()> {
        self.require_idle()?;
        if loops.is_empty() {
            return Err(ContourError::NothingSelected);
        }

        let mut paths = self.cut_paths.clone();
        for id in loops {
            let path = paths
                .iter_mut()
                .find(|p| p.contains(*id))
                .ok_or(ContourError::UnknownLoop)?;
            path.remove_loop(&self.surface, *id)?;
        }
        let before = paths.len();
        paths.retain(|p| !p.is_empty());

        self.checkpoint("loops_delete");
        tracing::info!(loops = loops.len(), paths_removed = before - paths.len(), "loops deleted");
        self.cut_paths = paths;
        self.selection.retain_valid(&self.cut_paths);
        Ok(())
    }

    /// Rotate the selected loop's seam by one vertex; the interpolated
    /// rings follow it. Interpolated rings are rebuilt from the user loops,
    /// so only a user loop can be shifted.
    pub fn loop_shift(&mut self, direction: ShiftDirection) -> ContourResult<()> {
        self.require_idle()?;
        let (idx, id) = self.selected_loop_location()?;
        let mut path = self.cut_paths[idx].clone();
        let ring = path.get_mut(id).ok_or(ContourError::UnknownLoop)?;
        if ring.kind != LoopKind::User {
            return Err(ContourError::InvalidState {
                expected: "user-placed loop",
            });
        }
        ring.shift(direction);
        path.regenerate(&self.surface)?;
        self.checkpoint("loop_shift");
        self.cut_paths[idx] = path;
        self.selection.retain_valid(&self.cut_paths);
        Ok(())
    }

    /// Re-cut every ring of the selected loop's path at `n` vertices
    pub fn loop_nverts_change(&mut self, n: usize) -> ContourResult<()> {
        self.require_idle()?;
        if n < 3 {
            return Err(ContourError::degenerate(format!("loops need at least 3 vertices, got {n}")));
        }
        let (idx, id) = self.selected_loop_location()?;
        let slot = self.cut_paths[idx].index_of(id).ok_or(ContourError::UnknownLoop)?;
        let mut path = self.cut_paths[idx].clone();
        path.set_ring_size(&self.surface, n)?;
        self.checkpoint("loop_nverts_change");
        tracing::info!(path = %path.id, n, "ring size changed");

        // interpolated rings are rebuilt with fresh ids; keep the same slot selected
        if !path.contains(id) {
            if let Some(ring) = path.loops().get(slot) {
                self.selection.select_loop(path.id, ring.id);
            }
        }
        self.cut_paths[idx] = path;
        self.selection.retain_valid(&self.cut_paths);
        Ok(())
    }

    /// Seam-align the selected loop's path outward from that loop
    pub fn loop_align(&mut self) -> ContourResult<()> {
        self.require_idle()?;
        let (idx, id) = self.selected_loop_location()?;
        let mut path = self.cut_paths[idx].clone();
        path.align(id)?;
        self.checkpoint("loop_align");
        self.cut_paths[idx] = path;
        Ok(())
    }

    /// Move the 3D cursor to the selected loop center (loop mode) or the
    /// middle of the selected path (guide mode)
    pub fn snap_cursor(&mut self) -> ContourResult<Vec3> {
        let target = match self.mode {
            Mode::Loop => self.selected_loop().map(|l| l.center()),
            Mode::Guide => self.selected_path().map(|p| p.midpoint()),
        }
        .ok_or(ContourError::NothingSelected)?;
        self.cursor = Some(target);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{cut, row, setup};
    use super::*;

    #[test]
    fn test_select_and_miss() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.3).unwrap();
        let id = c.selection().sel_loop;
        c.loop_select(&cam, Point::new(20.0, 20.0)).unwrap();
        assert!(c.selection().is_empty());
        let hit = c.loop_select(&cam, Point::new(400.0, row(&cam, 0.3))).unwrap();
        assert_eq!(hit, id);
        assert_eq!(c.selection().sel_loop, id);
    }

    #[test]
    fn test_delete_last_loop_removes_path() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.3).unwrap();
        let id = c.selection().sel_loop.unwrap();
        c.loops_delete(&[id]).unwrap();
        assert!(c.paths().is_empty());
        assert!(c.selection().is_empty());
    }

    #[test]
    fn test_delete_interpolated_rejected() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, -0.8).unwrap();
        cut(&mut c, &cam, 0.8).unwrap();
        let before = c.paths().to_vec();
        let middle = c.paths()[0].loops()[2].id;
        assert!(c.loops_delete(&[middle]).is_err());
        assert_eq!(c.paths(), &before[..]);
    }

    #[test]
    fn test_nverts_change_whole_path() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, -0.8).unwrap();
        cut(&mut c, &cam, 0.8).unwrap();
        c.loop_nverts_change(13).unwrap();
        assert!(c.paths()[0].loops().iter().all(|l| l.len() == 13));
        assert!(c.loop_nverts_change(2).is_err());
        assert_eq!(c.paths()[0].ring_size(), 13);
    }

    #[test]
    fn test_interpolated_selection_survives_edits() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, -0.8).unwrap();
        cut(&mut c, &cam, 0.8).unwrap();
        let ring = c.paths()[0].loops()[2].clone();
        assert_eq!(ring.kind, LoopKind::Interpolated);
        let path = c.paths()[0].id;
        c.selection.select_loop(path, ring.id);

        let before = c.paths().to_vec();
        let depth = c.history().len();
        assert_eq!(
            c.loop_shift(ShiftDirection::Up),
            Err(ContourError::InvalidState {
                expected: "user-placed loop"
            })
        );
        assert_eq!(c.paths(), &before[..]);
        assert_eq!(c.history().len(), depth);

        c.loop_nverts_change(14).unwrap();
        let sel = c.selection().sel_loop.unwrap();
        assert_eq!(c.paths()[0].index_of(sel), Some(2));
        assert_eq!(c.selected_loop().unwrap().len(), 14);

        c.loop_align().unwrap();
        c.loop_nverts_change(12).unwrap();
        assert!(c.selected_loop().is_some());
    }

    #[test]
    fn test_shift_requires_selection() {
        let (mut c, _) = setup();
        assert_eq!(c.loop_shift(ShiftDirection::Up), Err(ContourError::NothingSelected));
        assert_eq!(c.snap_cursor(), Err(ContourError::NothingSelected));
    }

    #[test]
    fn test_snap_cursor_to_loop_center() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.3).unwrap();
        let center = c.selected_loop().unwrap().center();
        assert_eq!(c.snap_cursor().unwrap(), center);
        assert_eq!(c.cursor(), Some(center));
    }
}
