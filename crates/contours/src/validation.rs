//! Committed mesh validation.
//!
//! `MeshValidator` checks the lofted output before it reaches the host:
//! in-range indices, quad-only faces and no collapsed quads.

use glam::Vec3;
use shared::CommittedMesh;

/// Validator for `CommittedMesh` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a CommittedMesh,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a CommittedMesh) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.faces.len()
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.faces.iter().flatten().all(|&i| i < max_idx)
    }

    /// Every face references four distinct vertices (no triangles
    /// disguised as quads).
    pub fn is_quad_only(&self) -> bool {
        self.mesh.faces.iter().all(|f| {
            let mut sorted = *f;
            sorted.sort_unstable();
            sorted.windows(2).all(|w| w[0] != w[1])
        })
    }

    /// Faces with (near) zero area
    pub fn degenerate_faces(&self, epsilon: f32) -> Vec<usize> {
        if !self.are_indices_in_range() {
            return Vec::new();
        }
        self.mesh
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                let p = f.map(|i| Vec3::from_array(self.mesh.vertices[i as usize]));
                let area = 0.5 * ((p[1] - p[0]).cross(p[2] - p[0]) + (p[2] - p[0]).cross(p[3] - p[0])).length();
                area < epsilon
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Check that the vertex count is `ring_size * rings`.
    pub fn has_vertex_count(&self, ring_size: usize, rings: usize) -> bool {
        self.vertex_count() == ring_size * rings
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .faces
                .iter()
                .flatten()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if !self.is_quad_only() {
            errors.push("Some faces repeat a vertex".to_string());
        }

        let degenerate = self.degenerate_faces(1e-8);
        if !degenerate.is_empty() {
            errors.push(format!("{} faces have zero area", degenerate.len()));
        }

        errors
    }
}
