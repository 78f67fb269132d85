//! Interactive rotate / translate of the selected loop

use glam::{Quat, Vec3};
use kurbo::Point;

use super::{Contours, Interaction, WidgetKind, WidgetState};
use crate::error::{ContourError, ContourResult};
use crate::view::ViewProjection;

impl Contours {
    pub fn prepare_rotate(&mut self, pos: Point) -> ContourResult<()> {
        self.prepare_widget(WidgetKind::Rotate, pos)
    }

    pub fn prepare_translate(&mut self, pos: Point) -> ContourResult<()> {
        self.prepare_widget(WidgetKind::Translate, pos)
    }

    /// Begin a gesture on the selected loop. The undo entry recorded here
    /// covers the whole gesture.
    fn prepare_widget(&mut self, kind: WidgetKind, pos: Point) -> ContourResult<()> {
        self.require_idle()?;
        let (idx, id) = self.selected_loop_location()?;
        let original = self.cut_paths[idx].get(id).ok_or(ContourError::UnknownLoop)?.clone();

        self.checkpoint(match kind {
            WidgetKind::Rotate => "prepare_rotate",
            WidgetKind::Translate => "prepare_translate",
        });
        self.interaction = Interaction::Widget(Box::new(WidgetState {
            kind,
            path: self.cut_paths[idx].id,
            target: id,
            anchor: pos,
            pivot: original.center(),
            original,
        }));
        Ok(())
    }

    /// Apply the gesture for the current cursor position.
    ///
    /// Rotation spins the loop about the view axis through its center by the
    /// angle swept around the center on screen. Translation slides it along
    /// its own normal.
    pub fn widget_transform(&mut self, view: &dyn ViewProjection, pos: Point) -> ContourResult<()> {
        let Interaction::Widget(widget) = &self.interaction else {
            return Err(ContourError::InvalidState { expected: "widget" });
        };

        let (rotation, translation) = match widget.kind {
            WidgetKind::Rotate => {
                let center = view.project(widget.pivot).ok_or(ContourError::NoIntersection)?;
                let a0 = (widget.anchor - center).atan2();
                let a1 = (pos - center).atan2();
                // screen y points down, so a positive screen angle is clockwise
                let angle = (a1 - a0) as f32;
                (Quat::from_axis_angle(view.view_direction(), angle), Vec3::ZERO)
            }
            WidgetKind::Translate => {
                let start = view.unproject(widget.anchor, widget.pivot);
                let end = view.unproject(pos, widget.pivot);
                let normal = widget.original.normal();
                (Quat::IDENTITY, normal * (end - start).dot(normal))
            }
        };

        let mut moved = widget.original.clone();
        moved.transform(rotation, widget.pivot, translation);
        let path = widget.path;

        let idx = self.path_index(path)?;
        let target = self.cut_paths[idx]
            .get_mut(moved.id)
            .ok_or(ContourError::UnknownLoop)?;
        *target = moved;
        Ok(())
    }

    /// End the gesture: re-cut the moved loop on the surface and rebuild
    /// its path. A failed re-cut reverts the gesture.
    pub fn widget_confirm(&mut self) -> ContourResult<()> {
        let Interaction::Widget(widget) = std::mem::take(&mut self.interaction) else {
            return Err(ContourError::InvalidState { expected: "widget" });
        };

        let result = self.path_index(widget.path).and_then(|idx| {
            let path = &self.cut_paths[idx];
            let moved = path.get(widget.target).ok_or(ContourError::UnknownLoop)?;
            let recut = moved.recut(&self.surface, path.ring_size())?;
            let mut next = path.clone();
            next.replace_loop(&self.surface, recut)?;
            Ok((idx, next))
        });

        match result {
            Ok((idx, next)) => {
                tracing::info!(loop_id = %widget.target, kind = ?widget.kind, "loop transformed");
                self.cut_paths[idx] = next;
                self.selection.retain_valid(&self.cut_paths);
                Ok(())
            }
            Err(err) => {
                self.restore_widget_target(&widget);
                self.history.discard_last();
                Err(err)
            }
        }
    }

    /// Abort the gesture and restore the loop
    pub fn widget_cancel(&mut self) -> ContourResult<()> {
        let Interaction::Widget(widget) = std::mem::take(&mut self.interaction) else {
            return Err(ContourError::InvalidState { expected: "widget" });
        };
        self.restore_widget_target(&widget);
        self.history.discard_last();
        Ok(())
    }

    fn restore_widget_target(&mut self, widget: &WidgetState) {
        if let Some(ring) = self
            .cut_paths
            .iter_mut()
            .find(|p| p.id == widget.path)
            .and_then(|p| p.get_mut(widget.target))
        {
            *ring = widget.original.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{cut, setup};
    use super::*;
    use crate::cut_loop::LoopKind;

    #[test]
    fn test_translate_moves_along_normal() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.0).unwrap();
        let before = c.selected_loop().unwrap().center();
        let start = cam.center();
        c.prepare_translate(start).unwrap();
        c.widget_transform(&cam, Point::new(start.x + 40.0, start.y - 60.0)).unwrap();
        let moved = c.selected_loop().unwrap().center();
        assert!(moved.y > before.y + 0.3);
        assert!((moved.x - before.x).abs() < 0.05);

        c.widget_confirm().unwrap();
        let placed = c.selected_loop().unwrap();
        assert!((placed.center().y - moved.y).abs() < 0.05);
        assert_eq!(placed.kind, LoopKind::User);
        assert_eq!(c.history().labels(), vec!["release_place_cut", "prepare_translate"]);
    }

    #[test]
    fn test_rotate_tilts_loop() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.0).unwrap();
        let normal = c.selected_loop().unwrap().normal();
        let center = cam.center();
        c.prepare_rotate(Point::new(center.x + 100.0, center.y)).unwrap();
        c.widget_transform(&cam, Point::new(center.x + 100.0, center.y + 30.0)).unwrap();
        let tilted = c.selected_loop().unwrap().normal();
        assert!(tilted.dot(normal) < 0.99);
        assert!(tilted.dot(normal) > 0.9);
    }

    #[test]
    fn test_widget_cancel_restores() {
        let (mut c, cam) = setup();
        cut(&mut c, &cam, 0.0).unwrap();
        let paths = c.paths().to_vec();
        let start = cam.center();
        c.prepare_translate(start).unwrap();
        c.widget_transform(&cam, Point::new(start.x, start.y - 80.0)).unwrap();
        assert_ne!(c.paths(), &paths[..]);
        c.widget_cancel().unwrap();
        assert_eq!(c.paths(), &paths[..]);
        assert_eq!(c.history().len(), 1);
        assert_eq!(*c.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_widget_needs_selection() {
        let (mut c, _) = setup();
        assert_eq!(c.prepare_rotate(Point::ZERO), Err(ContourError::NothingSelected));
        assert!(c.widget_confirm().is_err());
    }
}
