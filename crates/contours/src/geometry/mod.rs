//! Pure geometry used by loops and paths: planes, plane fitting, seam
//! alignment, plus surface intersection, resampling and backbone splines.

pub mod backbone;
pub mod intersect;
pub mod resample;

pub use backbone::Backbone;
pub use intersect::{intersect_plane, nearest_polyline, Polyline};
pub use resample::{closed_length, resample};

use glam::Vec3;

use crate::error::{ContourError, ContourResult};

/// An oriented plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Vec3,
    /// Unit normal
    pub normal: Vec3,
}

impl Plane {
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Signed distance from the plane (positive on the normal side)
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.normal)
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }

    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }
}

/// Arithmetic mean of a point set
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// Newell normal of a closed polygon (unnormalized, length ~ 2 * area).
/// Its direction follows the winding order of the points.
pub fn winding_normal(points: &[Vec3]) -> Vec3 {
    let c = centroid(points);
    let n = points.len();
    (0..n)
        .map(|i| (points[i] - c).cross(points[(i + 1) % n] - c))
        .sum()
}

/// Least-squares plane through a point set.
///
/// The normal is taken from the covariance matrix (largest 2x2 determinant),
/// then oriented so that the points wind counter-clockwise around it.
pub fn fit_plane(points: &[Vec3]) -> ContourResult<Plane> {
    if points.len() < 3 {
        return Err(ContourError::degenerate(format!(
            "plane fit needs 3 points, got {}",
            points.len()
        )));
    }

    let c = centroid(points);
    let (mut xx, mut xy, mut xz, mut yy, mut yz, mut zz) = (0.0f64, 0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let r = (*p - c).as_dvec3();
        xx += r.x * r.x;
        xy += r.x * r.y;
        xz += r.x * r.z;
        yy += r.y * r.y;
        yz += r.y * r.z;
        zz += r.z * r.z;
    }

    let det_x = yy * zz - yz * yz;
    let det_y = xx * zz - xz * xz;
    let det_z = xx * yy - xy * xy;
    let det_max = det_x.max(det_y).max(det_z);
    let scale = xx + yy + zz;

    if scale <= f64::EPSILON || det_max <= 1e-9 * scale * scale {
        return Err(ContourError::degenerate("points are collinear"));
    }

    let normal = if det_max == det_x {
        glam::DVec3::new(det_x, xz * yz - xy * zz, xy * yz - xz * yy)
    } else if det_max == det_y {
        glam::DVec3::new(xz * yz - xy * zz, det_y, xy * xz - yz * xx)
    } else {
        glam::DVec3::new(xy * yz - xz * yy, xy * xz - yz * xx, det_z)
    };

    let mut normal = normal.normalize().as_vec3();
    if normal.dot(winding_normal(points)) < 0.0 {
        normal = -normal;
    }

    Ok(Plane { origin: c, normal })
}

/// Seam rotation `k` minimizing the summed squared distance between
/// `reference[i]` and `verts[(i + k) % n]`. Returns 0 for mismatched lengths.
pub fn best_seam_offset(reference: &[Vec3], verts: &[Vec3]) -> usize {
    let n = verts.len();
    if n == 0 || reference.len() != n {
        return 0;
    }

    let mut best = (0, f32::MAX);
    for k in 0..n {
        let cost: f32 = (0..n)
            .map(|i| reference[i].distance_squared(verts[(i + k) % n]))
            .sum();
        if cost < best.1 {
            best = (k, cost);
        }
    }
    best.0
}

/// Distance from a point to the segment `a..b`
pub fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn circle(n: usize, r: f32, y: f32) -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let a = i as f32 * TAU / n as f32;
                Vec3::new(r * a.cos(), y, r * a.sin())
            })
            .collect()
    }

    #[test]
    fn test_fit_plane_circle() {
        let pts = circle(24, 2.0, 0.5);
        let plane = fit_plane(&pts).unwrap();
        assert!((plane.origin - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-4);
        assert!((plane.normal.abs() - Vec3::Y).length() < 1e-4);
        for p in &pts {
            assert!(plane.signed_distance(*p).abs() < 1e-4);
        }
    }

    #[test]
    fn test_fit_plane_orientation_follows_winding() {
        let pts = circle(12, 1.0, 0.0);
        let n1 = fit_plane(&pts).unwrap().normal;
        let mut rev = pts.clone();
        rev.reverse();
        let n2 = fit_plane(&rev).unwrap().normal;
        assert!((n1 + n2).length() < 1e-4);
        // (cos, 0, sin) winds clockwise seen from +Y
        assert!(n1.dot(Vec3::NEG_Y) > 0.99);
    }

    #[test]
    fn test_fit_plane_rejects_collinear() {
        let pts = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0];
        assert!(matches!(fit_plane(&pts), Err(ContourError::DegenerateLoop(_))));
        assert!(fit_plane(&pts[..2]).is_err());
    }

    #[test]
    fn test_best_seam_offset() {
        let a = circle(8, 1.0, 0.0);
        let mut b = a.clone();
        b.rotate_left(3);
        // b[i] == a[i + 3], so a[i] == b[(i + 5) % 8]
        assert_eq!(best_seam_offset(&a, &b), 5);
        assert_eq!(best_seam_offset(&a, &a), 0);
        assert_eq!(best_seam_offset(&a, &a[..4]), 0);
    }

    #[test]
    fn test_plane_project() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y * 3.0);
        assert_eq!(plane.project(Vec3::new(2.0, 5.0, -1.0)), Vec3::new(2.0, 1.0, -1.0));
        assert!((plane.signed_distance(Vec3::ZERO) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_segment_distance() {
        let d = point_segment_distance(Vec3::new(0.5, 1.0, 0.0), Vec3::ZERO, Vec3::X);
        assert!((d - 1.0).abs() < 1e-6);
        let d = point_segment_distance(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Vec3::X);
        assert!((d - 2.0).abs() < 1e-6);
    }
}
