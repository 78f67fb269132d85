//! Integration tests for modal event dispatch.
//!
//! Tests the host-facing path: raw input events -> key map -> controller.

use contours_lib::fixtures::horizontal_stroke;
use contours_lib::harness::TestHarness;
use contours_lib::modal::ToolOutcome;
use contours_lib::state::{InteractionKind, Mode};
use shared::{Action, InputEvent};

fn drag_cut(h: &mut TestHarness, y: f32) -> ToolOutcome {
    let stroke = horizontal_stroke(h.row(y), 330.0, 490.0, 6);
    h.drag("LEFTMOUSE", &stroke)
}

#[test]
fn test_full_session_commits_once() {
    let mut h = TestHarness::new();
    assert_eq!(drag_cut(&mut h, -0.8), ToolOutcome::Running);
    assert_eq!(drag_cut(&mut h, 0.8), ToolOutcome::Running);
    assert_eq!(h.loop_count(), 5);

    assert_eq!(h.press_key("RET"), ToolOutcome::Committed);
    assert_eq!(h.committed.len(), 1);
    assert!(h.validate_committed().is_empty());

    // second confirm is rejected, the sink is untouched
    assert_eq!(h.press_key("RET"), ToolOutcome::Running);
    assert_eq!(h.committed.len(), 1);
    assert_eq!(h.contours().message(), Some("mesh was already committed"));
}

#[test]
fn test_cut_missing_surface_reports_message() {
    let mut h = TestHarness::new();
    h.drag("LEFTMOUSE", &horizontal_stroke(20.0, 10.0, 60.0, 4));
    assert_eq!(h.path_count(), 0);
    assert_eq!(h.contours().interaction().kind(), InteractionKind::Idle);
    assert_eq!(h.contours().message(), Some("stroke does not cross the surface"));
}

#[test]
fn test_select_delete_undo_by_keys() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, -0.8);
    drag_cut(&mut h, 0.8);
    let before = h.contours().paths().to_vec();

    let at = h.row(-0.8);
    h.send(&InputEvent::press("RIGHTMOUSE", 400.0, at));
    let selected = h.contours().selected_loop().map(|l| l.center().y);
    assert!(selected.is_some_and(|y| y < -0.5));

    h.press_key("X");
    assert_eq!(h.loop_count(), 1);

    h.press_key("CTRL+Z");
    h.press_key("CTRL+Z");
    assert_eq!(h.contours().paths(), &before[..]);
}

#[test]
fn test_hover_follows_cursor() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, 0.2);
    let at = h.row(0.2);

    h.send(&InputEvent::mouse_move(400.0, at));
    assert_eq!(h.contours().selection().hover_loop, h.contours().selection().sel_loop);
    h.send(&InputEvent::mouse_move(15.0, 15.0));
    assert!(h.contours().selection().hover_loop.is_none());
}

#[test]
fn test_guide_sketch_and_segment_keys() {
    let mut h = TestHarness::new();
    h.press_key("TAB");
    assert_eq!(h.contours().mode(), Mode::Guide);
    assert_eq!(h.tool.footer(), "Guide Mode");

    for y in [-0.8, 0.8] {
        let stroke = horizontal_stroke(h.row(y), 330.0, 490.0, 12);
        h.drag("LEFTMOUSE", &stroke);
    }
    assert_eq!(h.path_count(), 1);
    assert!(h.contours().selection().sel_path.is_some());

    h.press_key("NUMPAD_PLUS");
    assert_eq!(h.contours().paths()[0].segments(), 5);
    assert_eq!(h.contours().message(), Some("Path segments: 5"));
    h.press_key("SHIFT+S");
    assert!(h.contours().cursor().is_some());
}

#[test]
fn test_escape_while_sketching_keeps_paths() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, 0.0);
    h.press_key("TAB");

    let at = h.row(0.5);
    h.send(&InputEvent::press("LEFTMOUSE", 330.0, at));
    h.send(&InputEvent::mouse_move(380.0, at));
    assert_eq!(h.tool.footer(), "Sketching");
    assert_eq!(h.send(&InputEvent::press("ESC", 380.0, at)), ToolOutcome::Running);
    assert_eq!(h.tool.footer(), "Guide Mode");
    assert!(h.contours().sketch().is_empty());
    assert_eq!(h.path_count(), 1);
}

#[test]
fn test_translate_widget_by_keys() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, 0.0);
    let before = h.contours().selected_loop().unwrap().center();

    h.send(&InputEvent::press("G", 400.0, 300.0));
    assert_eq!(h.tool.footer(), "Widget");
    h.send(&InputEvent::mouse_move(400.0, 250.0));
    h.send(&InputEvent::release("LEFTMOUSE", 400.0, 250.0));
    assert_eq!(h.tool.footer(), "Loop Mode");

    let after = h.contours().selected_loop().unwrap().center();
    assert!(after.y > before.y + 0.3);
    assert_eq!(h.contours().history().last_label(), Some("prepare_translate"));
}

#[test]
fn test_widget_escape_restores_loop() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, 0.0);
    let before = h.contours().paths().to_vec();
    let depth = h.contours().history().len();

    h.send(&InputEvent::press("R", 500.0, 300.0));
    h.send(&InputEvent::mouse_move(500.0, 340.0));
    assert_ne!(h.contours().paths(), &before[..]);
    h.send(&InputEvent::press("ESC", 500.0, 340.0));

    assert_eq!(h.contours().paths(), &before[..]);
    assert_eq!(h.contours().history().len(), depth);
}

#[test]
fn test_rebound_keys_are_honoured() {
    let mut h = TestHarness::new();
    drag_cut(&mut h, 0.3);
    let mut settings = h.contours().settings().clone();
    settings.keymap.bind(Action::Delete, vec!["BACK_SPACE".to_string()]);
    let surface = h.contours().surface().clone();
    let mut h = TestHarness::with_surface(surface, settings, h.camera.clone());
    drag_cut(&mut h, 0.3);

    h.press_key("X");
    assert_eq!(h.loop_count(), 1);
    h.press_key("BACK_SPACE");
    assert_eq!(h.loop_count(), 0);
}
