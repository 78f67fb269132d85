//! A single cross-section loop cut from the surface.

use glam::{Quat, Vec3};
use kurbo::{Line, ParamCurveNearest, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ContourError, ContourResult};
use crate::geometry::{self, fit_plane, intersect_plane, nearest_polyline, resample, Plane};
use crate::surface::SurfaceMesh;
use crate::view::ViewProjection;

/// Default number of interaction handles kept in `verts_simple`
pub const DEFAULT_HANDLE_COUNT: usize = 8;

/// Stable loop identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(Uuid);

impl LoopId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoopId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LoopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Whether the user placed the loop or the path generated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    User,
    Interpolated,
}

/// Direction for seam shifting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDirection {
    Up,
    Down,
}

/// Closed cross-section loop.
///
/// `verts` are evenly spaced around the cut; `plane` is refit whenever they
/// change and its normal follows the vertex winding.
#[derive(Debug, Clone, PartialEq)]
pub struct CutLoop {
    pub id: LoopId,
    pub kind: LoopKind,
    verts: Vec<Vec3>,
    verts_simple: Vec<Vec3>,
    handle_count: usize,
    plane: Plane,
    /// Plane the surface was cut with
    cut_plane: Plane,
    /// Surface point that picked which intersection chain to keep
    seed: Vec3,
}

/// Cutting plane for a screen-space line: the plane holding the view rays
/// through both endpoints.
pub fn stroke_plane(view: &dyn ViewProjection, head: Point, tail: Point) -> ContourResult<Plane> {
    let h = view.ray(head);
    let t = view.ray(tail);
    let along = t.at(1.0) - h.at(1.0);
    let mid = (h.direction + t.direction).normalize_or_zero();
    let normal = along.cross(mid);
    if normal.length_squared() < 1e-12 {
        return Err(ContourError::degenerate("stroke is too short"));
    }
    Ok(Plane::new(h.origin, normal))
}

impl CutLoop {
    /// Build a loop of `n` vertices from an intersection chain.
    /// Vertex 0 is the vertex closest to `seed`.
    pub fn from_polyline(points: &[Vec3], n: usize, seed: Vec3, cut_plane: Plane) -> ContourResult<Self> {
        let mut verts = resample(points, n)?;
        let start = nearest_index(&verts, seed);
        verts.rotate_left(start);
        let plane = fit_plane(&verts)?;

        let mut cut = Self {
            id: LoopId::new(),
            kind: LoopKind::User,
            verts,
            verts_simple: Vec::new(),
            handle_count: DEFAULT_HANDLE_COUNT,
            plane,
            cut_plane,
            seed,
        };
        cut.simplify(DEFAULT_HANDLE_COUNT);
        Ok(cut)
    }

    /// Cut the surface with `plane`, keeping the chain nearest `seed`
    pub fn cut(surface: &SurfaceMesh, plane: Plane, seed: Vec3, n: usize) -> ContourResult<Self> {
        let chains = intersect_plane(surface, &plane)?;
        let chain = nearest_polyline(chains, seed).ok_or(ContourError::NoIntersection)?;
        tracing::debug!(points = chain.points.len(), closed = chain.closed, "cut chain");
        Self::from_polyline(&chain.points, n, seed, plane)
    }

    /// Cut from a screen-space line (a click-drag or a fitted stroke).
    /// The seed is the surface point under the middle of the line.
    pub fn from_stroke(
        surface: &SurfaceMesh,
        view: &dyn ViewProjection,
        head: Point,
        tail: Point,
        n: usize,
    ) -> ContourResult<Self> {
        let plane = stroke_plane(view, head, tail)?;
        let seed = surface
            .raycast(&view.ray(head.midpoint(tail)))
            .ok_or(ContourError::NoIntersection)?
            .point;
        Self::cut(surface, Plane::new(seed, plane.normal), seed, n)
    }

    /// Re-cut with the stored cutting plane at a new vertex count.
    /// Keeps identity, kind and winding direction.
    pub fn recut(&self, surface: &SurfaceMesh, n: usize) -> ContourResult<Self> {
        let mut fresh = Self::cut(surface, self.cut_plane, self.seed, n)?;
        if fresh.normal().dot(self.normal()) < 0.0 {
            fresh.reverse();
        }
        let start = nearest_index(&fresh.verts, self.verts[0]);
        fresh.verts.rotate_left(start);
        fresh.id = self.id;
        fresh.kind = self.kind;
        fresh.handle_count = self.handle_count;
        fresh.simplify(self.handle_count);
        Ok(fresh)
    }

    /// Replace the vertices and refit the plane.
    ///
    /// The vertex order is kept as given; the plane normal is oriented to
    /// agree with the previous one so the loop never flips implicitly.
    pub fn update(&mut self, new_points: Vec<Vec3>) -> ContourResult<()> {
        let mut plane = fit_plane(&new_points)?;
        if plane.normal.dot(self.plane.normal) < 0.0 {
            plane = plane.flipped();
        }
        self.verts = new_points;
        self.plane = plane;
        self.simplify(self.handle_count);
        Ok(())
    }

    /// Stride-based subsample used for handles and hit testing
    pub fn simplify(&mut self, target_count: usize) -> &[Vec3] {
        self.handle_count = target_count.max(1);
        let stride = self.verts.len().div_ceil(self.handle_count).max(1);
        self.verts_simple = self.verts.iter().step_by(stride).copied().collect();
        &self.verts_simple
    }

    /// Rotate the seam one vertex along `direction`
    pub fn shift(&mut self, direction: ShiftDirection) {
        match direction {
            ShiftDirection::Up => self.verts.rotate_left(1),
            ShiftDirection::Down => self.verts.rotate_right(1),
        }
        self.simplify(self.handle_count);
    }

    /// Rotate the seam by `k` vertices
    pub fn rotate_seam(&mut self, k: usize) {
        let n = self.verts.len();
        if n > 0 {
            self.verts.rotate_left(k % n);
            self.simplify(self.handle_count);
        }
    }

    /// Reverse the winding, keeping vertex 0 in place
    pub fn reverse(&mut self) {
        self.verts[1..].reverse();
        self.plane = self.plane.flipped();
        self.simplify(self.handle_count);
    }

    /// Rigid transform about `pivot`: rotate, then translate.
    /// The cutting plane and seed move with the loop.
    pub fn transform(&mut self, rotation: Quat, pivot: Vec3, translation: Vec3) {
        let apply = |p: Vec3| rotation * (p - pivot) + pivot + translation;
        for v in &mut self.verts {
            *v = apply(*v);
        }
        self.seed = apply(self.seed);
        self.cut_plane = Plane::new(apply(self.cut_plane.origin), rotation * self.cut_plane.normal);
        self.plane = Plane::new(apply(self.plane.origin), rotation * self.plane.normal);
        self.simplify(self.handle_count);
    }

    /// Screen-space distance from `cursor` to the loop outline (pixels)
    pub fn screen_distance(&self, view: &dyn ViewProjection, cursor: Point) -> f64 {
        let pts: Vec<Point> = self.verts.iter().filter_map(|v| view.project(*v)).collect();
        if pts.len() < 2 {
            return f64::MAX;
        }
        (0..pts.len())
            .map(|i| {
                Line::new(pts[i], pts[(i + 1) % pts.len()])
                    .nearest(cursor, 1e-6)
                    .distance_sq
            })
            .fold(f64::MAX, f64::min)
            .sqrt()
    }

    pub fn verts(&self) -> &[Vec3] {
        &self.verts
    }

    pub fn verts_simple(&self) -> &[Vec3] {
        &self.verts_simple
    }

    pub fn handle_count(&self) -> usize {
        self.handle_count
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn cut_plane(&self) -> Plane {
        self.cut_plane
    }

    pub fn seed(&self) -> Vec3 {
        self.seed
    }

    /// Center of mass (plane origin)
    pub fn center(&self) -> Vec3 {
        self.plane.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.plane.normal
    }

    /// Mean distance of the vertices from the center
    pub fn radius(&self) -> f32 {
        if self.verts.is_empty() {
            return 0.0;
        }
        let c = self.center();
        self.verts.iter().map(|v| v.distance(c)).sum::<f32>() / self.verts.len() as f32
    }

    /// Loop built directly from already-spaced vertices (interpolated rings)
    pub(crate) fn from_ring(verts: Vec<Vec3>, cut_plane: Plane, seed: Vec3, kind: LoopKind) -> ContourResult<Self> {
        let plane = fit_plane(&verts)?;
        let mut cut = Self {
            id: LoopId::new(),
            kind,
            verts,
            verts_simple: Vec::new(),
            handle_count: DEFAULT_HANDLE_COUNT,
            plane,
            cut_plane,
            seed,
        };
        cut.simplify(DEFAULT_HANDLE_COUNT);
        Ok(cut)
    }
}

fn nearest_index(verts: &[Vec3], p: Vec3) -> usize {
    verts
        .iter()
        .enumerate()
        .min_by(|a, b| {
            a.1.distance_squared(p)
                .partial_cmp(&b.1.distance_squared(p))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Mean squared distance between corresponding vertices
pub fn ring_distance(a: &CutLoop, b: &CutLoop) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    (0..n).map(|i| a.verts[i].distance_squared(b.verts[i])).sum::<f32>() / n as f32
}

impl CutLoop {
    /// Rotate the seam to best match `reference` vertex-for-vertex
    pub fn align_to(&mut self, reference: &CutLoop) -> usize {
        let k = geometry::best_seam_offset(&reference.verts, &self.verts);
        self.rotate_seam(k);
        k
    }
}
