//! Screen/world projection.
//!
//! The host viewport supplies these through [`ViewProjection`]; [`OrbitCamera`]
//! is the stand-alone implementation used by the harness and the CLI.

use glam::{Mat4, Vec3, Vec4};
use kurbo::Point;

use crate::surface::Ray;

/// Projection services supplied by the host viewport.
/// Screen coordinates have their origin at the top-left corner, y down.
pub trait ViewProjection {
    /// Ray from the viewer through a screen position
    fn ray(&self, screen: Point) -> Ray;

    /// Screen position of a world point, `None` when behind the viewer
    fn project(&self, world: Vec3) -> Option<Point>;

    /// Unit direction the viewer is looking in
    fn view_direction(&self) -> Vec3;

    /// World point under `screen` at the depth of `depth_ref`
    fn unproject(&self, screen: Point, depth_ref: Vec3) -> Vec3 {
        let ray = self.ray(screen);
        let normal = self.view_direction();
        let denom = ray.direction.dot(normal);
        if denom.abs() < 1e-6 {
            return depth_ref;
        }
        let t = (depth_ref - ray.origin).dot(normal) / denom;
        ray.at(t)
    }
}

/// Orbit camera around a target point
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Viewport size in pixels
    pub width: f64,
    pub height: f64,
}

impl OrbitCamera {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
            width,
            height,
        }
    }

    /// Camera on +Z looking at `target` head-on
    pub fn front(target: Vec3, distance: f32, width: f64, height: f64) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target,
            ..Self::new(width, height)
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 100.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(self.distance * cp * sy, self.distance * sp, self.distance * cp * cy)
    }

    fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect(), 0.1, 200.0)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Screen position of the viewport center
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

impl ViewProjection for OrbitCamera {
    fn ray(&self, screen: Point) -> Ray {
        // Screen -> NDC
        let ndc_x = ((screen.x - self.width * 0.5) / (self.width * 0.5)) as f32;
        let ndc_y = (-(screen.y - self.height * 0.5) / (self.height * 0.5)) as f32;

        let vp_inv = self.view_projection().inverse();
        let near = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray {
            origin: near,
            direction: (far - near).normalize(),
        }
    }

    fn project(&self, world: Vec3) -> Option<Point> {
        let p = self.view_projection() * world.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some(Point::new(
            self.width * 0.5 + ndc.x as f64 * self.width * 0.5,
            self.height * 0.5 - ndc.y as f64 * self.height * 0.5,
        ))
    }

    fn view_direction(&self) -> Vec3 {
        (self.target - self.eye_position()).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_hits_target() {
        let cam = OrbitCamera::front(Vec3::new(0.0, 1.0, 0.0), 8.0, 800.0, 600.0);
        let ray = cam.ray(cam.center());
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!(ray.origin.x.abs() < 1e-4 && (ray.origin.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let cam = OrbitCamera::new(1024.0, 768.0);
        let world = Vec3::new(0.4, -0.3, 0.8);
        let screen = cam.project(world).unwrap();
        let back = cam.unproject(screen, world);
        assert!((back - world).length() < 1e-3, "{back:?}");
    }

    #[test]
    fn test_screen_y_points_down() {
        let cam = OrbitCamera::front(Vec3::ZERO, 8.0, 800.0, 600.0);
        let above = cam.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(above.y < 300.0);
        assert!((above.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_behind_viewer_not_projected() {
        let cam = OrbitCamera::front(Vec3::ZERO, 5.0, 800.0, 600.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }
}
