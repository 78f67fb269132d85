//! Factory functions for test surfaces, cameras and strokes.
//!
//! Used by the unit tests, the integration tests and the headless harness.

use glam::Vec3;
use kurbo::Point;
use shared::InputEvent;

use crate::state::ToolSettings;
use crate::surface::SurfaceMesh;
use crate::view::{OrbitCamera, ViewProjection};

// ── Surface factories ───────────────────────────────────────────

/// Unit-radius tube, 6 tall, along +Y
pub fn tube() -> SurfaceMesh {
    SurfaceMesh::cylinder(1.0, 6.0, 32, 12)
}

/// Tube of `radius` swept along a circular arc in the XY plane.
///
/// The arc starts at the origin heading up +Y and bends toward +X around
/// `(bend_radius, 0, 0)` through `angle` radians. At the start the layout
/// matches [`SurfaceMesh::cylinder`], so faces point outward.
pub fn bent_tube(radius: f32, bend_radius: f32, angle: f32, segments: u32, rings: u32) -> SurfaceMesh {
    let mut vertices = Vec::with_capacity(((rings + 1) * segments) as usize);
    let mut triangles = Vec::with_capacity((rings * segments * 2) as usize);

    for r in 0..=rings {
        let theta = angle * r as f32 / rings as f32;
        let (sin, cos) = theta.sin_cos();
        let center = Vec3::new(bend_radius * (1.0 - cos), bend_radius * sin, 0.0);
        let u = Vec3::new(cos, -sin, 0.0);
        for s in 0..segments {
            let a = s as f32 * std::f32::consts::TAU / segments as f32;
            vertices.push(center + radius * (a.cos() * u + a.sin() * Vec3::Z));
        }
    }

    for r in 0..rings {
        for s in 0..segments {
            let next = (s + 1) % segments;
            let i0 = r * segments + s;
            let i1 = r * segments + next;
            let i2 = (r + 1) * segments + next;
            let i3 = (r + 1) * segments + s;
            triangles.push([i0, i2, i1]);
            triangles.push([i0, i3, i2]);
        }
    }

    SurfaceMesh::new(vertices, triangles)
}

// ── Settings & camera factories ─────────────────────────────────

/// Small rings and few segments keep expected counts easy to write down
pub fn test_settings() -> ToolSettings {
    ToolSettings {
        loop_vert_count: 12,
        default_segments: 4,
        ..Default::default()
    }
}

/// 800x600 camera on +Z, 10 units from `target`
pub fn front_camera(target: Vec3) -> OrbitCamera {
    OrbitCamera::front(target, 10.0, 800.0, 600.0)
}

// ── Stroke factories ────────────────────────────────────────────

/// Screen row where the front wall of a unit tube sits at height `y`
pub fn screen_row(view: &dyn ViewProjection, y: f32) -> f64 {
    view.project(Vec3::new(0.0, y, 1.0)).map(|p| p.y).unwrap_or(300.0)
}

/// `n` evenly spaced points from `x0` to `x1` along screen row `row`
pub fn horizontal_stroke(row: f64, x0: f64, x1: f64, n: usize) -> Vec<Point> {
    let n = n.max(2);
    (0..n)
        .map(|i| Point::new(x0 + (x1 - x0) * i as f64 / (n - 1) as f64, row))
        .collect()
}

/// Press `key` on the first point, move through the rest, release on the last
pub fn stroke_events(key: &str, points: &[Point]) -> Vec<InputEvent> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let mut events = vec![InputEvent::press(key, first.x, first.y)];
    events.extend(points[1..].iter().map(|p| InputEvent::mouse_move(p.x, p.y)));
    events.push(InputEvent::release(key, last.x, last.y));
    events
}
