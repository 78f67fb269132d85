//! Cut paths: an ordered chain of loops along a backbone spline.
//!
//! User-placed loops anchor the path. Between them the path fills its
//! `segments + 1` ring slots with interpolated loops cut from the surface
//! perpendicular to the backbone.

use glam::Vec3;
use uuid::Uuid;

use crate::cut_loop::{CutLoop, LoopId, LoopKind, ShiftDirection};
use crate::error::{ContourError, ContourResult};
use crate::geometry::{centroid, Backbone, Plane};
use crate::surface::SurfaceMesh;

/// Stable path identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(Uuid);

impl PathId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PathId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Minimum span count of an unlocked path
pub const MIN_SEGMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CutPath {
    pub id: PathId,
    /// Every ring in path order, user and interpolated
    loops: Vec<CutLoop>,
    segments: usize,
    seg_lock: bool,
    backbone: Backbone,
    /// Shared vertex count of every ring
    ring_size: usize,
}

impl CutPath {
    /// Start a path from a single user loop
    pub fn new(first: CutLoop, segments: usize) -> Self {
        let mut first = first;
        first.kind = LoopKind::User;
        Self {
            id: PathId::new(),
            backbone: Backbone::through(&[first.center()]),
            ring_size: first.len(),
            loops: vec![first],
            segments: segments.max(MIN_SEGMENTS),
            seg_lock: false,
        }
    }

    pub fn loops(&self) -> &[CutLoop] {
        &self.loops
    }

    pub fn user_loops(&self) -> impl Iterator<Item = &CutLoop> {
        self.loops.iter().filter(|l| l.kind == LoopKind::User)
    }

    pub fn user_count(&self) -> usize {
        self.user_loops().count()
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn is_locked(&self) -> bool {
        self.seg_lock
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.seg_lock = locked;
    }

    pub fn backbone(&self) -> &Backbone {
        &self.backbone
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    pub fn contains(&self, id: LoopId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: LoopId) -> Option<usize> {
        self.loops.iter().position(|l| l.id == id)
    }

    pub fn get(&self, id: LoopId) -> Option<&CutLoop> {
        self.loops.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LoopId) -> Option<&mut CutLoop> {
        self.loops.iter_mut().find(|l| l.id == id)
    }

    /// Distance from `p` to the backbone
    pub fn distance_to(&self, p: Vec3) -> f32 {
        self.backbone.project(p).1
    }

    /// Backbone point halfway along the path
    pub fn midpoint(&self) -> Vec3 {
        self.backbone.point_at(0.5)
    }

    /// Insert a user loop in backbone order.
    ///
    /// The loop is re-cut to the path's ring size, reversed if it winds
    /// against the backbone and seam-aligned to its neighbour. Returns its
    /// position among the user loops.
    pub fn insert_loop(&mut self, surface: &SurfaceMesh, cut: CutLoop) -> ContourResult<usize> {
        let users: Vec<CutLoop> = self.user_loops().cloned().collect();
        let (next, pos) = self.with_inserted(surface, users, cut)?;
        *self = next;
        Ok(pos)
    }

    /// Swap a loop for a moved copy of itself, keeping its id.
    /// An interpolated loop becomes user-placed.
    pub fn replace_loop(&mut self, surface: &SurfaceMesh, cut: CutLoop) -> ContourResult<usize> {
        if !self.contains(cut.id) {
            return Err(ContourError::UnknownLoop);
        }
        let users: Vec<CutLoop> = self
            .user_loops()
            .filter(|l| l.id != cut.id)
            .cloned()
            .collect();
        let (next, pos) = self.with_inserted(surface, users, cut)?;
        *self = next;
        Ok(pos)
    }

    /// Remove a user loop. Interpolated loops belong to the path and
    /// cannot be removed on their own. The path may end up empty.
    pub fn remove_loop(&mut self, surface: &SurfaceMesh, id: LoopId) -> ContourResult<CutLoop> {
        let removed = self.get(id).ok_or(ContourError::UnknownLoop)?.clone();
        if removed.kind == LoopKind::Interpolated {
            return Err(ContourError::InvalidState {
                expected: "user-placed loop",
            });
        }
        let users: Vec<CutLoop> = self.user_loops().filter(|l| l.id != id).cloned().collect();
        let mut next = self.clone();
        next.layout(surface, users)?;
        *self = next;
        Ok(removed)
    }

    /// Change the number of spans between the end loops
    pub fn resegment(&mut self, surface: &SurfaceMesh, n: usize) -> ContourResult<()> {
        if self.seg_lock {
            return Err(ContourError::PathLocked);
        }
        if n < MIN_SEGMENTS {
            return Err(ContourError::TooFewSegments { requested: n });
        }
        let users: Vec<CutLoop> = self.user_loops().cloned().collect();
        let mut next = self.clone();
        next.segments = n;
        next.layout(surface, users)?;
        *self = next;
        Ok(())
    }

    /// Rebuild the backbone and interpolated loops from the user loops
    pub fn regenerate(&mut self, surface: &SurfaceMesh) -> ContourResult<()> {
        let users: Vec<CutLoop> = self.user_loops().cloned().collect();
        let mut next = self.clone();
        next.layout(surface, users)?;
        *self = next;
        Ok(())
    }

    /// Re-cut every loop at `n` vertices
    pub fn set_ring_size(&mut self, surface: &SurfaceMesh, n: usize) -> ContourResult<()> {
        let mut users = self
            .user_loops()
            .map(|l| l.recut(surface, n))
            .collect::<ContourResult<Vec<_>>>()?;
        for i in 1..users.len() {
            let prev = users[i - 1].clone();
            users[i].align_to(&prev);
        }
        let mut next = self.clone();
        next.ring_size = n;
        next.layout(surface, users)?;
        *self = next;
        Ok(())
    }

    /// Move the seam of every ring one vertex along `direction`
    pub fn shift(&mut self, direction: ShiftDirection) {
        for ring in &mut self.loops {
            ring.shift(direction);
        }
    }

    /// Relax interior rings toward their neighbours and snap them back
    /// onto the surface. Ring count and end rings are unchanged.
    pub fn smooth(&mut self, surface: &SurfaceMesh) -> ContourResult<()> {
        if self.loops.len() < 3 {
            return Ok(());
        }
        let mut rings = self.loops.clone();
        for i in 1..self.loops.len() - 1 {
            let (prev, cur, next) = (
                self.loops[i - 1].verts(),
                self.loops[i].verts(),
                self.loops[i + 1].verts(),
            );
            let relaxed = (0..cur.len())
                .map(|k| surface.closest_point(cur[k] * 0.5 + (prev[k] + next[k]) * 0.25))
                .collect();
            rings[i].update(relaxed)?;
        }
        let centers: Vec<Vec3> = rings
            .iter()
            .filter(|l| l.kind == LoopKind::User)
            .map(CutLoop::center)
            .collect();
        self.backbone = Backbone::through(&centers);
        self.loops = rings;
        Ok(())
    }

    /// Seam-align the rings outward from `reference` so corresponding
    /// vertices line up from ring to ring.
    pub fn align(&mut self, reference: LoopId) -> ContourResult<()> {
        let r = self.index_of(reference).ok_or(ContourError::UnknownLoop)?;
        for i in r + 1..self.loops.len() {
            let prev = self.loops[i - 1].clone();
            self.loops[i].align_to(&prev);
        }
        for i in (0..r).rev() {
            let next = self.loops[i + 1].clone();
            self.loops[i].align_to(&next);
        }
        Ok(())
    }

    fn with_inserted(
        &self,
        surface: &SurfaceMesh,
        mut users: Vec<CutLoop>,
        cut: CutLoop,
    ) -> ContourResult<(CutPath, usize)> {
        let mut cut = if cut.len() == self.ring_size {
            cut
        } else {
            cut.recut(surface, self.ring_size)?
        };
        cut.kind = LoopKind::User;

        let pos = insertion_index(&users, cut.center());
        users.insert(pos, cut);
        orient(&mut users);
        if users.len() > 1 {
            let neighbour = if pos > 0 { pos - 1 } else { 1 };
            let reference = users[neighbour].clone();
            let k = users[pos].align_to(&reference);
            tracing::debug!(pos, seam_offset = k, "loop inserted");
        }

        let mut next = self.clone();
        next.layout(surface, users)?;
        Ok((next, pos))
    }

    /// Lay out the ring slots for the given user loops (in path order)
    fn layout(&mut self, surface: &SurfaceMesh, users: Vec<CutLoop>) -> ContourResult<()> {
        let centers: Vec<Vec3> = users.iter().map(CutLoop::center).collect();
        let backbone = Backbone::through(&centers);

        if users.len() < 2 {
            self.backbone = backbone;
            self.loops = users;
            return Ok(());
        }

        let ts: Vec<f32> = centers.iter().map(|c| backbone.project(*c).0).collect();
        let segments = self.segments.max(users.len() - 1);
        let anchors = slot_plan(&ts, segments);

        let mut rings: Vec<CutLoop> = Vec::with_capacity(segments + 1);
        for (i, user) in users.iter().enumerate() {
            rings.push(user.clone());
            let Some(&end) = anchors.get(i + 1) else {
                break;
            };
            let start = anchors[i];
            let next_user = &users[i + 1];
            for j in start + 1..end {
                let t = j as f32 / segments as f32;
                let u = (j - start) as f32 / (end - start) as f32;
                let prev = &rings[rings.len() - 1];
                let ring = interpolate(surface, &backbone, t, user, next_user, u, self.ring_size, prev)?;
                rings.push(ring);
            }
        }

        self.segments = segments;
        self.backbone = backbone;
        self.loops = rings;
        Ok(())
    }
}

/// Position of a loop centered at `center` among `users`
fn insertion_index(users: &[CutLoop], center: Vec3) -> usize {
    let k = users.len();
    if k < 2 {
        return k;
    }
    let centers: Vec<Vec3> = users.iter().map(CutLoop::center).collect();
    let backbone = Backbone::through(&centers);
    let (t, _) = backbone.project(center);

    if t <= 0.0 && (center - centers[0]).dot(backbone.tangent_at(0.0)) < 0.0 {
        return 0;
    }
    if t >= 1.0 && (center - centers[k - 1]).dot(backbone.tangent_at(1.0)) > 0.0 {
        return k;
    }
    let before = centers.iter().filter(|c| backbone.project(**c).0 < t).count();
    before.clamp(1, k - 1)
}

/// Make every user loop wind along the backbone direction
fn orient(users: &mut [CutLoop]) {
    if users.len() < 2 {
        return;
    }
    let centers: Vec<Vec3> = users.iter().map(CutLoop::center).collect();
    let backbone = Backbone::through(&centers);
    for ring in users.iter_mut() {
        let (t, _) = backbone.project(ring.center());
        if ring.normal().dot(backbone.tangent_at(t)) < 0.0 {
            ring.reverse();
        }
    }
}

/// Slot index for each user loop. The ends take the first and last slot,
/// interior loops the nearest slot that keeps them in order.
fn slot_plan(ts: &[f32], segments: usize) -> Vec<usize> {
    let k = ts.len();
    let mut slots: Vec<usize> = Vec::with_capacity(k);
    for (i, t) in ts.iter().enumerate() {
        let slot = if i == 0 {
            0
        } else if i == k - 1 {
            segments
        } else {
            let lo = slots[i - 1] + 1;
            let hi = segments - (k - 1 - i);
            ((t * segments as f32).round() as usize).clamp(lo, hi)
        };
        slots.push(slot);
    }
    slots
}

#[allow(clippy::too_many_arguments)]
fn interpolate(
    surface: &SurfaceMesh,
    backbone: &Backbone,
    t: f32,
    a: &CutLoop,
    b: &CutLoop,
    u: f32,
    ring_size: usize,
    prev: &CutLoop,
) -> ContourResult<CutLoop> {
    let p = backbone.point_at(t);
    let tangent = backbone.tangent_at(t);
    let plane = Plane::new(p, tangent);
    let limit = 0.5 * (a.radius() + b.radius());

    let mut ring = match CutLoop::cut(surface, plane, p, ring_size) {
        Ok(ring) if ring.center().distance(p) <= limit => ring,
        _ => {
            tracing::debug!(t, "surface cut missed, blending neighbour rings");
            blend(a, b, u, p, plane)?
        }
    };
    ring.kind = LoopKind::Interpolated;
    ring.simplify(a.handle_count());
    if ring.normal().dot(tangent) < 0.0 {
        ring.reverse();
    }
    ring.align_to(prev);
    Ok(ring)
}

/// Linear blend of two aligned rings, recentered on `p`
fn blend(a: &CutLoop, b: &CutLoop, u: f32, p: Vec3, plane: Plane) -> ContourResult<CutLoop> {
    let mut verts: Vec<Vec3> = a
        .verts()
        .iter()
        .zip(b.verts())
        .map(|(x, y)| x.lerp(*y, u))
        .collect();
    let offset = p - centroid(&verts);
    for v in &mut verts {
        *v += offset;
    }
    CutLoop::from_ring(verts, plane, p, LoopKind::Interpolated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube() -> SurfaceMesh {
        SurfaceMesh::cylinder(1.0, 6.0, 32, 12)
    }

    fn ring_at(surface: &SurfaceMesh, y: f32, n: usize) -> CutLoop {
        let plane = Plane::new(Vec3::new(0.0, y, 0.0), Vec3::Y);
        CutLoop::cut(surface, plane, Vec3::new(0.0, y, 1.0), n).unwrap()
    }

    fn two_loop_path(segments: usize) -> (SurfaceMesh, CutPath) {
        let surface = tube();
        let mut path = CutPath::new(ring_at(&surface, -2.1, 12), segments);
        path.insert_loop(&surface, ring_at(&surface, 1.9, 12)).unwrap();
        (surface, path)
    }

    fn end_loops(path: &CutPath) -> (CutLoop, CutLoop) {
        let users: Vec<&CutLoop> = path.user_loops().collect();
        (users[0].clone(), users[users.len() - 1].clone())
    }

    #[test]
    fn test_two_loops_fill_slots() {
        let (_, path) = two_loop_path(4);
        assert_eq!(path.len(), 5);
        assert_eq!(path.user_count(), 2);
        let ys: Vec<f32> = path.loops().iter().map(|l| l.center().y).collect();
        for (i, y) in ys.iter().enumerate() {
            assert!((y - (-2.1 + i as f32)).abs() < 0.02, "{ys:?}");
        }
        for ring in path.loops() {
            assert_eq!(ring.len(), 12);
            assert!(ring.normal().dot(Vec3::Y) > 0.99);
        }
        assert_eq!(path.loops()[1].kind, LoopKind::Interpolated);
    }

    #[test]
    fn test_insert_orders_along_backbone() {
        let (surface, mut path) = two_loop_path(6);
        let below = ring_at(&surface, -2.7, 12);
        assert_eq!(path.insert_loop(&surface, below.clone()).unwrap(), 0);
        let middle = ring_at(&surface, 0.3, 12);
        assert_eq!(path.insert_loop(&surface, middle.clone()).unwrap(), 2);

        let users: Vec<LoopId> = path.user_loops().map(|l| l.id).collect();
        assert_eq!(users[0], below.id);
        assert_eq!(users[2], middle.id);
        let ys: Vec<f32> = path.loops().iter().map(|l| l.center().y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]), "{ys:?}");
    }

    #[test]
    fn test_insert_recuts_to_ring_size() {
        let (surface, mut path) = two_loop_path(4);
        path.insert_loop(&surface, ring_at(&surface, 0.2, 20)).unwrap();
        assert!(path.loops().iter().all(|l| l.len() == 12));
    }

    #[test]
    fn test_resegment_preserves_end_loops() {
        let (surface, mut path) = two_loop_path(4);
        let ends = end_loops(&path);
        path.resegment(&surface, 7).unwrap();
        assert_eq!(path.len(), 8);
        path.resegment(&surface, 3).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(end_loops(&path), ends);
    }

    #[test]
    fn test_resegment_rejects_too_few() {
        let (surface, mut path) = two_loop_path(5);
        let before = path.clone();
        assert_eq!(
            path.resegment(&surface, 2),
            Err(ContourError::TooFewSegments { requested: 2 })
        );
        assert_eq!(path, before);
        assert_eq!(path.segments(), 5);
    }

    #[test]
    fn test_resegment_locked() {
        let (surface, mut path) = two_loop_path(5);
        path.set_locked(true);
        assert_eq!(path.resegment(&surface, 8), Err(ContourError::PathLocked));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_shift_full_cycle() {
        let (_, mut path) = two_loop_path(3);
        let before = path.clone();
        for _ in 0..path.ring_size() {
            path.shift(ShiftDirection::Down);
        }
        assert_eq!(path, before);
    }

    #[test]
    fn test_smooth_keeps_counts_and_ends() {
        let (surface, mut path) = two_loop_path(4);
        let ends = (path.loops()[0].clone(), path.loops()[4].clone());
        path.smooth(&surface).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.loops()[0], ends.0);
        assert_eq!(path.loops()[4], ends.1);
        for ring in path.loops() {
            for v in ring.verts() {
                assert!(((v.x * v.x + v.z * v.z).sqrt() - 1.0).abs() < 0.01);
            }
        }
    }

    #[test]
    fn test_align_propagates_from_reference() {
        let (_, mut path) = two_loop_path(4);
        let reference = path.loops()[2].id;
        for i in [0, 1, 3, 4] {
            path.loops[i].rotate_seam(i + 2);
        }
        path.align(reference).unwrap();
        // neighbouring seams end up within half a vertex spacing (15 degrees)
        for pair in path.loops().windows(2) {
            let (a, b) = (pair[0].verts()[0], pair[1].verts()[0]);
            assert!(Vec3::new(a.x - b.x, 0.0, a.z - b.z).length() < 0.3);
        }
    }

    #[test]
    fn test_remove_loop() {
        let (surface, mut path) = two_loop_path(4);
        let interpolated = path.loops()[1].id;
        assert!(path.remove_loop(&surface, interpolated).is_err());

        let last = path.loops()[4].id;
        path.remove_loop(&surface, last).unwrap();
        assert_eq!(path.len(), 1);
        let first = path.loops()[0].id;
        path.remove_loop(&surface, first).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.remove_loop(&surface, first), Err(ContourError::UnknownLoop));
    }

    #[test]
    fn test_set_ring_size() {
        let (surface, mut path) = two_loop_path(3);
        path.set_ring_size(&surface, 20).unwrap();
        assert_eq!(path.ring_size(), 20);
        assert!(path.loops().iter().all(|l| l.len() == 20));
        assert!(path.set_ring_size(&surface, 2).is_err());
        assert_eq!(path.ring_size(), 20);
    }

    #[test]
    fn test_more_users_than_slots_raises_segments() {
        let (surface, mut path) = two_loop_path(3);
        for y in [-1.3, -0.4, 0.5, 1.2] {
            path.insert_loop(&surface, ring_at(&surface, y, 12)).unwrap();
        }
        assert_eq!(path.user_count(), 6);
        assert_eq!(path.segments(), 5);
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_interpolated_rings_take_user_handle_count() {
        let surface = tube();
        let mut first = ring_at(&surface, -2.1, 12);
        first.simplify(4);
        let mut last = ring_at(&surface, 1.9, 12);
        last.simplify(4);
        let mut path = CutPath::new(first, 4);
        path.insert_loop(&surface, last).unwrap();

        for ring in path.loops() {
            assert_eq!(ring.handle_count(), 4);
            assert_eq!(ring.verts_simple().len(), 4);
        }
    }

    #[test]
    fn test_slot_plan() {
        assert_eq!(slot_plan(&[0.0, 1.0], 4), vec![0, 4]);
        assert_eq!(slot_plan(&[0.0, 0.4, 1.0], 5), vec![0, 2, 5]);
        assert_eq!(slot_plan(&[0.0, 0.01, 0.02, 1.0], 3), vec![0, 1, 2, 3]);
    }
}
