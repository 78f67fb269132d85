//! Read-only target surface: indexed triangles with shared vertices,
//! ray picking and closest-point queries.

use glam::Vec3;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the diagonal
    pub fn size(&self) -> f32 {
        (self.max - self.min).length()
    }
}

/// Result of a surface raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub triangle_index: usize,
    pub distance: f32,
    pub point: Vec3,
    /// Geometric normal of the hit triangle
    pub normal: Vec3,
}

/// Triangle mesh the contours are cut from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Closest point to `p` on triangle `abc` (Ericson, Real-Time Collision Detection 5.1.5)
fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

impl SurfaceMesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self { vertices, triangles }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corners(&self, tri: &[u32; 3]) -> (Vec3, Vec3, Vec3) {
        (
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        )
    }

    pub fn aabb(&self) -> Aabb {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        Aabb { min, max }
    }

    /// Nearest triangle hit along the ray
    pub fn raycast(&self, ray: &Ray) -> Option<SurfaceHit> {
        let mut best: Option<SurfaceHit> = None;

        for (idx, tri) in self.triangles.iter().enumerate() {
            let (v0, v1, v2) = self.corners(tri);
            if let Some(dist) = ray_triangle_intersect(ray, v0, v1, v2) {
                if best.as_ref().is_none_or(|b| dist < b.distance) {
                    best = Some(SurfaceHit {
                        triangle_index: idx,
                        distance: dist,
                        point: ray.at(dist),
                        normal: (v1 - v0).cross(v2 - v0).normalize_or_zero(),
                    });
                }
            }
        }

        best
    }

    /// Closest point on the surface to `p` (returns `p` for an empty mesh)
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let mut best = (p, f32::MAX);
        for tri in &self.triangles {
            let (a, b, c) = self.corners(tri);
            let q = closest_point_on_triangle(p, a, b, c);
            let d = q.distance_squared(p);
            if d < best.1 {
                best = (q, d);
            }
        }
        best.0
    }

    /// Open tube along +Y centered at the origin, `segments` around and
    /// `rings` bands tall. Vertices are shared between neighbouring quads.
    pub fn cylinder(radius: f32, height: f32, segments: u32, rings: u32) -> Self {
        let hh = height * 0.5;
        let mut vertices = Vec::with_capacity(((rings + 1) * segments) as usize);
        let mut triangles = Vec::with_capacity((rings * segments * 2) as usize);

        for r in 0..=rings {
            let y = -hh + height * r as f32 / rings as f32;
            for s in 0..segments {
                let a = s as f32 * std::f32::consts::TAU / segments as f32;
                vertices.push(Vec3::new(radius * a.cos(), y, radius * a.sin()));
            }
        }

        for r in 0..rings {
            for s in 0..segments {
                let next = (s + 1) % segments;
                let i0 = r * segments + s;
                let i1 = r * segments + next;
                let i2 = (r + 1) * segments + next;
                let i3 = (r + 1) * segments + s;
                // outward facing
                triangles.push([i0, i2, i1]);
                triangles.push([i0, i3, i2]);
            }
        }

        Self { vertices, triangles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_counts() {
        let c = SurfaceMesh::cylinder(1.0, 2.0, 12, 3);
        assert_eq!(c.vertices.len(), 48);
        assert_eq!(c.triangle_count(), 72);
        let aabb = c.aabb();
        assert!((aabb.max.y - 1.0).abs() < 1e-6);
        assert!((aabb.min.y + 1.0).abs() < 1e-6);
        assert!(aabb.center().length() < 1e-6);
    }

    #[test]
    fn test_cylinder_faces_outward() {
        let c = SurfaceMesh::cylinder(1.0, 2.0, 12, 3);
        for tri in &c.triangles {
            let (a, b, d) = c.corners(tri);
            let n = (b - a).cross(d - a);
            let mid = (a + b + d) / 3.0;
            assert!(n.dot(Vec3::new(mid.x, 0.0, mid.z)) > 0.0);
        }
    }

    #[test]
    fn test_raycast_hits_front_wall() {
        let c = SurfaceMesh::cylinder(1.0, 2.0, 32, 4);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.1, 10.0),
            direction: Vec3::NEG_Z,
        };
        let hit = c.raycast(&ray).unwrap();
        assert!((hit.point.z - 1.0).abs() < 0.01);
        assert!((hit.distance - 9.0).abs() < 0.01);
        assert!(hit.normal.z > 0.9);
    }

    #[test]
    fn test_raycast_miss() {
        let c = SurfaceMesh::cylinder(1.0, 2.0, 16, 2);
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        assert!(c.raycast(&ray).is_none());
    }

    #[test]
    fn test_ray_triangle_parallel() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::X,
        };
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_closest_point() {
        let c = SurfaceMesh::cylinder(1.0, 2.0, 64, 2);
        let q = c.closest_point(Vec3::new(3.0, 0.2, 0.0));
        assert!((q - Vec3::new(1.0, 0.2, 0.0)).length() < 1e-3);
        // from inside the tube
        let q = c.closest_point(Vec3::new(0.0, -0.5, 0.5));
        assert!((q.z - 1.0).abs() < 0.01 && (q.y + 0.5).abs() < 1e-3);
    }
}
