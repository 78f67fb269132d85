//! Plane / surface intersection.
//!
//! Every triangle straddling the plane contributes one segment. Segment
//! endpoints are keyed by the mesh edge they lie on, so neighbouring
//! triangles chain exactly without any position tolerance.

use std::collections::HashMap;

use glam::Vec3;

use super::{point_segment_distance, Plane};
use crate::error::{ContourError, ContourResult};
use crate::surface::SurfaceMesh;

/// Edge key: (min vertex index, max vertex index)
type EdgeKey = (u32, u32);

/// An intersection chain
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    /// Whether the chain returned to its starting edge
    pub closed: bool,
}

impl Polyline {
    /// Smallest distance from `p` to any segment of the chain
    pub fn distance_to(&self, p: Vec3) -> f32 {
        match self.points.len() {
            0 => f32::MAX,
            1 => self.points[0].distance(p),
            n => {
                let segs = if self.closed { n } else { n - 1 };
                (0..segs)
                    .map(|i| point_segment_distance(p, self.points[i], self.points[(i + 1) % n]))
                    .fold(f32::MAX, f32::min)
            }
        }
    }
}

fn edge_key(a: u32, b: u32) -> EdgeKey {
    (a.min(b), a.max(b))
}

/// Intersect the surface with a plane.
///
/// Returns every disjoint chain, or `NoIntersection` when the plane does not
/// cross the surface. A vertex lying exactly on the plane counts as being on
/// the positive side.
pub fn intersect_plane(surface: &SurfaceMesh, plane: &Plane) -> ContourResult<Vec<Polyline>> {
    let dist: Vec<f32> = surface
        .vertices
        .iter()
        .map(|v| plane.signed_distance(*v))
        .collect();

    let mut points: HashMap<EdgeKey, Vec3> = HashMap::new();
    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();

    for tri in &surface.triangles {
        let mut crossing = Vec::with_capacity(2);
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let (da, db) = (dist[a as usize], dist[b as usize]);
            if (da >= 0.0) == (db >= 0.0) {
                continue;
            }
            let key = edge_key(a, b);
            points.entry(key).or_insert_with(|| {
                let t = da / (da - db);
                surface.vertices[a as usize].lerp(surface.vertices[b as usize], t)
            });
            crossing.push(key);
        }
        if let [k0, k1] = crossing[..] {
            segments.push((k0, k1));
        }
    }

    if segments.is_empty() {
        return Err(ContourError::NoIntersection);
    }

    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (i, (k0, k1)) in segments.iter().enumerate() {
        by_edge.entry(*k0).or_default().push(i);
        by_edge.entry(*k1).or_default().push(i);
    }

    let mut visited = vec![false; segments.len()];
    let mut chains = Vec::new();

    // Follow unvisited segments from `key`, appending the far endpoints
    let walk = |key: EdgeKey, visited: &mut [bool]| -> Vec<EdgeKey> {
        let mut out = Vec::new();
        let mut current = key;
        loop {
            let next = by_edge
                .get(&current)
                .and_then(|segs| segs.iter().copied().find(|&s| !visited[s]));
            let Some(s) = next else { break };
            visited[s] = true;
            let (k0, k1) = segments[s];
            current = if k0 == current { k1 } else { k0 };
            out.push(current);
        }
        out
    };

    for start in 0..segments.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let (k0, k1) = segments[start];

        let mut keys = vec![k0, k1];
        keys.extend(walk(k1, &mut visited));

        let closed = keys.len() > 2 && keys.first() == keys.last();
        if closed {
            keys.pop();
        } else {
            let mut back = walk(k0, &mut visited);
            back.reverse();
            back.extend(keys);
            keys = back;
        }

        if keys.len() >= 2 {
            chains.push(Polyline {
                points: keys.iter().map(|k| points[k]).collect(),
                closed,
            });
        }
    }

    tracing::debug!(chains = chains.len(), segments = segments.len(), "plane intersection");
    Ok(chains)
}

/// The chain closest to `seed`
pub fn nearest_polyline(chains: Vec<Polyline>, seed: Vec3) -> Option<Polyline> {
    chains.into_iter().min_by(|a, b| {
        a.distance_to(seed)
            .partial_cmp(&b.distance_to(seed))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
