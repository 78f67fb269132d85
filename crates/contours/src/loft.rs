//! Quad bridging between consecutive rings.

use shared::CommittedMesh;

use crate::cut_loop::CutLoop;
use crate::cut_path::CutPath;

/// Bridge an ordered ring sequence into a quad strip.
///
/// Ring `r` occupies vertices `r * n .. (r + 1) * n`. Between rings `a` and
/// `b` each quad is `(a_i, a_{i+1}, b_{i+1}, b_i)`, wrapping at the seam.
/// Rings whose vertex count differs from the first ring are skipped.
pub fn bridge_rings(rings: &[&[glam::Vec3]]) -> CommittedMesh {
    let mut mesh = CommittedMesh::default();
    let Some(first) = rings.first() else {
        return mesh;
    };
    let n = first.len();

    let rings: Vec<&[glam::Vec3]> = rings.iter().copied().filter(|r| r.len() == n).collect();
    for ring in &rings {
        mesh.vertices.extend(ring.iter().map(|v| v.to_array()));
    }

    if n < 3 {
        return mesh;
    }
    for r in 0..rings.len().saturating_sub(1) {
        let a = (r * n) as u32;
        let b = ((r + 1) * n) as u32;
        for i in 0..n as u32 {
            let j = (i + 1) % n as u32;
            mesh.faces.push([a + i, a + j, b + j, b + i]);
        }
    }
    mesh
}

/// Loft every ring of a path
pub fn loft_path(path: &CutPath) -> CommittedMesh {
    let rings: Vec<&[glam::Vec3]> = path.loops().iter().map(CutLoop::verts).collect();
    bridge_rings(&rings)
}

/// Loft several paths into one mesh
pub fn loft_paths<'a>(paths: impl IntoIterator<Item = &'a CutPath>) -> CommittedMesh {
    let mut mesh = CommittedMesh::default();
    for path in paths {
        mesh.append(loft_path(path));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn square(y: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, y, 0.0),
            Vec3::new(0.0, y, 1.0),
            Vec3::new(-1.0, y, 0.0),
            Vec3::new(0.0, y, -1.0),
        ]
    }

    #[test]
    fn test_bridge_two_rings() {
        let (a, b) = (square(0.0), square(1.0));
        let mesh = bridge_rings(&[&a, &b]);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.faces[0], [0, 1, 5, 4]);
        // seam quad wraps back to vertex 0
        assert_eq!(mesh.faces[3], [3, 0, 4, 7]);
    }

    #[test]
    fn test_three_rings_counts() {
        let rings = [square(0.0), square(1.0), square(2.0)];
        let refs: Vec<&[Vec3]> = rings.iter().map(|r| r.as_slice()).collect();
        let mesh = bridge_rings(&refs);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 8);
        assert!(mesh.faces.iter().all(|f| f.iter().all(|&i| i < 12)));
    }

    #[test]
    fn test_single_ring_has_no_faces() {
        let a = square(0.0);
        let mesh = bridge_rings(&[&a]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 0);
        assert!(bridge_rings(&[]).is_empty());
    }
}
