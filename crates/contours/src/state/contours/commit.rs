//! Ending the session: commit the lofted mesh or discard everything

use shared::CommittedMesh;

use super::{Contours, Interaction};
use crate::error::{ContourError, ContourResult};
use crate::loft::loft_paths;

/// Receives the final mesh (host scene object replacement)
pub trait MeshSink {
    fn commit(&mut self, mesh: CommittedMesh);
}

impl MeshSink for Vec<CommittedMesh> {
    fn commit(&mut self, mesh: CommittedMesh) {
        self.push(mesh);
    }
}

impl Contours {
    /// Loft every path and hand the mesh to `sink`. Runs once per session.
    pub fn finish_mesh(&mut self, sink: &mut dyn MeshSink) -> ContourResult<()> {
        if self.committed {
            return Err(ContourError::AlreadyCommitted);
        }
        self.require_idle()?;
        if self.cut_paths.is_empty() {
            return Err(ContourError::EmptyResult);
        }

        let mesh = loft_paths(&self.cut_paths);
        tracing::info!(
            paths = self.cut_paths.len(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "mesh committed"
        );
        sink.commit(mesh);
        self.committed = true;
        Ok(())
    }

    /// Discard all state without committing
    pub fn cancel(&mut self) {
        tracing::info!(paths = self.cut_paths.len(), "contours cancelled");
        self.interaction = Interaction::Idle;
        self.cut_paths.clear();
        self.selection = Default::default();
        self.sketch.clear();
        self.history.clear();
        self.cursor = None;
    }
}
