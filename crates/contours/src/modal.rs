//! Modal event dispatch.
//!
//! Routes raw host events to controller operations, based on the current
//! interaction state and mode. Rejected operations become the controller's
//! user message; nothing here panics or propagates errors.

use kurbo::Point;
use serde::Serialize;
use shared::{Action, EventKind, InputEvent, KeyMap};

use crate::cut_loop::ShiftDirection;
use crate::error::ContourResult;
use crate::state::{Contours, InteractionKind, MeshSink, Mode, ToolSettings};
use crate::surface::SurfaceMesh;
use crate::view::ViewProjection;

/// What the host should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Running,
    /// Mesh handed to the sink, tool finished
    Committed,
    /// State discarded, tool finished
    Cancelled,
}

pub struct ContoursTool {
    contours: Contours,
    keymap: KeyMap,
    footer: &'static str,
}

impl ContoursTool {
    pub fn new(surface: SurfaceMesh, settings: ToolSettings) -> Self {
        let keymap = settings.keymap.clone();
        Self {
            contours: Contours::new(surface, settings),
            keymap,
            footer: "Loop Mode",
        }
    }

    pub fn contours(&self) -> &Contours {
        &self.contours
    }

    pub fn contours_mut(&mut self) -> &mut Contours {
        &mut self.contours
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Status line for the host
    pub fn footer(&self) -> &'static str {
        self.footer
    }

    /// Handle one input event
    pub fn handle(&mut self, view: &dyn ViewProjection, sink: &mut dyn MeshSink, event: &InputEvent) -> ToolOutcome {
        let pos = Point::new(event.mouse[0], event.mouse[1]);
        let actions = match (&event.key, event.kind) {
            (Some(key), EventKind::Press | EventKind::Release) => self.keymap.actions_for(key),
            _ => Vec::new(),
        };

        let outcome = match self.contours.interaction().kind() {
            InteractionKind::Idle => self.modal_main(view, sink, event.kind, &actions, pos),
            InteractionKind::Cutting => self.modal_cut(view, event.kind, &actions, pos),
            InteractionKind::Sketching => self.modal_sketching(view, event.kind, &actions, pos),
            InteractionKind::Widget => self.modal_widget(view, event.kind, &actions, pos),
        };

        self.footer = match (self.contours.interaction().kind(), self.contours.mode()) {
            (InteractionKind::Idle, Mode::Loop) => "Loop Mode",
            (InteractionKind::Idle, Mode::Guide) => "Guide Mode",
            (InteractionKind::Cutting, _) => "Cutting",
            (InteractionKind::Sketching, _) => "Sketching",
            (InteractionKind::Widget, _) => "Widget",
        };
        outcome
    }

    /// Report a failed operation, keep running either way
    fn check<T>(&mut self, op: &str, result: ContourResult<T>) -> ToolOutcome {
        if let Err(err) = result {
            self.contours.report(op, &err);
        }
        ToolOutcome::Running
    }

    fn modal_main(
        &mut self,
        view: &dyn ViewProjection,
        sink: &mut dyn MeshSink,
        kind: EventKind,
        actions: &[Action],
        pos: Point,
    ) -> ToolOutcome {
        if kind == EventKind::Move {
            self.contours.hover(view, pos);
            return ToolOutcome::Running;
        }
        if kind != EventKind::Press {
            return ToolOutcome::Running;
        }

        for &action in actions {
            let outcome = match action {
                Action::ModeToggle => {
                    let r = self.contours.mode_toggle();
                    Some(self.check("mode_toggle", r))
                }
                Action::Undo => {
                    let r = self.contours.undo_action();
                    Some(self.check("undo_action", r))
                }
                Action::ModalConfirm => match self.contours.finish_mesh(sink) {
                    Ok(()) => Some(ToolOutcome::Committed),
                    Err(err) => {
                        self.contours.report("finish_mesh", &err);
                        Some(ToolOutcome::Running)
                    }
                },
                Action::ModalCancel => {
                    self.contours.cancel();
                    Some(ToolOutcome::Cancelled)
                }
                Action::New => {
                    let on = self.contours.force_new_toggle();
                    self.contours.set_message(if on { "New path: on" } else { "New path: off" });
                    Some(ToolOutcome::Running)
                }
                _ => match self.contours.mode() {
                    Mode::Loop => self.loop_action(view, action, pos),
                    Mode::Guide => self.guide_action(view, action, pos),
                },
            };
            if let Some(outcome) = outcome {
                return outcome;
            }
        }
        ToolOutcome::Running
    }

    fn loop_action(&mut self, view: &dyn ViewProjection, action: Action, pos: Point) -> Option<ToolOutcome> {
        match action {
            Action::Select => {
                let r = self.contours.loop_select(view, pos);
                return Some(self.check("loop_select", r));
            }
            Action::Action => {
                let r = self.contours.click_new_cut(view, pos);
                return Some(self.check("click_new_cut", r));
            }
            _ => {}
        }

        let sel = self.contours.selection().sel_loop?;
        let ring_size = self.contours.path_of(sel)?.ring_size();
        let outcome = match action {
            Action::Delete => {
                let r = self.contours.loops_delete(&[sel]);
                self.check("loops_delete", r)
            }
            Action::Align => {
                let r = self.contours.loop_align();
                self.check("loop_align", r)
            }
            Action::ShiftUp => {
                let r = self.contours.loop_shift(ShiftDirection::Up);
                self.check("loop_shift", r)
            }
            Action::ShiftDown => {
                let r = self.contours.loop_shift(ShiftDirection::Down);
                self.check("loop_shift", r)
            }
            Action::CountUp => {
                let r = self.contours.loop_nverts_change(ring_size + 1);
                self.check("loop_nverts_change", r)
            }
            Action::CountDown => {
                let r = self.contours.loop_nverts_change(ring_size.saturating_sub(1));
                self.check("loop_nverts_change", r)
            }
            Action::SnapCursor => {
                let r = self.contours.snap_cursor();
                self.check("snap_cursor", r)
            }
            Action::Rotate => {
                let r = self.contours.prepare_rotate(pos);
                self.check("prepare_rotate", r)
            }
            Action::Translate => {
                let r = self.contours.prepare_translate(pos);
                self.check("prepare_translate", r)
            }
            _ => return None,
        };
        Some(outcome)
    }

    fn guide_action(&mut self, view: &dyn ViewProjection, action: Action, pos: Point) -> Option<ToolOutcome> {
        match action {
            Action::Select => {
                let r = self.contours.guide_mode_select(view, pos);
                return Some(self.check("guide_mode_select", r));
            }
            Action::Action => {
                let r = self.contours.sketch_begin(pos);
                return Some(self.check("sketch_begin", r));
            }
            _ => {}
        }

        let path = self.contours.selected_path()?;
        let (id, segments) = (path.id, path.segments());
        let outcome = match action {
            Action::Delete => {
                let r = self.contours.paths_delete();
                self.check("paths_delete", r)
            }
            Action::ShiftUp => {
                let r = self.contours.segment_shift(ShiftDirection::Up);
                self.check("segment_shift", r)
            }
            Action::ShiftDown => {
                let r = self.contours.segment_shift(ShiftDirection::Down);
                self.check("segment_shift", r)
            }
            Action::CountUp => {
                let r = self.contours.segment_n_loops(id, segments + 1);
                self.check("segment_n_loops", r)
            }
            Action::CountDown => {
                let r = self.contours.segment_n_loops(id, segments.saturating_sub(1));
                self.check("segment_n_loops", r)
            }
            Action::Smooth => {
                let r = self.contours.segment_smooth();
                self.check("segment_smooth", r)
            }
            Action::SnapCursor => {
                let r = self.contours.snap_cursor();
                self.check("snap_cursor", r)
            }
            _ => return None,
        };
        Some(outcome)
    }

    fn modal_cut(&mut self, view: &dyn ViewProjection, kind: EventKind, actions: &[Action], pos: Point) -> ToolOutcome {
        match kind {
            EventKind::Move => self.contours.cut_drag(pos),
            EventKind::Release if actions.contains(&Action::Action) => {
                let r = self.contours.release_place_cut(view, pos);
                return self.check("release_place_cut", r);
            }
            EventKind::Press if actions.contains(&Action::ModalCancel) => self.contours.cut_cancel(),
            _ => {}
        }
        ToolOutcome::Running
    }

    fn modal_sketching(
        &mut self,
        view: &dyn ViewProjection,
        kind: EventKind,
        actions: &[Action],
        pos: Point,
    ) -> ToolOutcome {
        match kind {
            EventKind::Move => self.contours.sketch_extend(pos),
            EventKind::Release if actions.contains(&Action::Action) => {
                let r = self.contours.sketch_confirm(view);
                return self.check("sketch_confirm", r);
            }
            EventKind::Press if actions.contains(&Action::ModalCancel) => self.contours.sketch_cancel(),
            _ => {}
        }
        ToolOutcome::Running
    }

    fn modal_widget(&mut self, view: &dyn ViewProjection, kind: EventKind, actions: &[Action], pos: Point) -> ToolOutcome {
        let confirm = (kind == EventKind::Release && actions.contains(&Action::Action))
            || (kind == EventKind::Press && actions.contains(&Action::ModalConfirm));
        if kind == EventKind::Move {
            let r = self.contours.widget_transform(view, pos);
            self.check("widget_transform", r)
        } else if confirm {
            let r = self.contours.widget_confirm();
            self.check("widget_confirm", r)
        } else if kind == EventKind::Press && actions.contains(&Action::ModalCancel) {
            let r = self.contours.widget_cancel();
            self.check("widget_cancel", r)
        } else {
            ToolOutcome::Running
        }
    }
}
