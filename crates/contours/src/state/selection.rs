//! Selection and hover state.
//!
//! Holds identifiers only; the controller re-validates them after every
//! operation that can remove loops or paths.

use crate::cut_loop::LoopId;
use crate::cut_path::{CutPath, PathId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub sel_loop: Option<LoopId>,
    pub sel_path: Option<PathId>,
    /// Loop under the cursor (loop mode)
    pub hover_loop: Option<LoopId>,
    /// Path under the cursor (guide mode)
    pub hover_path: Option<PathId>,
}

impl SelectionState {
    pub fn clear(&mut self) {
        self.sel_loop = None;
        self.sel_path = None;
    }

    pub fn select_loop(&mut self, path: PathId, id: LoopId) {
        self.sel_path = Some(path);
        self.sel_loop = Some(id);
    }

    pub fn select_path(&mut self, path: PathId) {
        self.sel_path = Some(path);
        self.sel_loop = None;
    }

    pub fn is_empty(&self) -> bool {
        self.sel_loop.is_none() && self.sel_path.is_none()
    }

    /// Drop identifiers that no longer resolve
    pub fn retain_valid(&mut self, paths: &[CutPath]) {
        let path_of = |id: LoopId| paths.iter().find(|p| p.contains(id)).map(|p| p.id);

        if let Some(id) = self.sel_loop {
            match path_of(id) {
                Some(path) => self.sel_path = Some(path),
                None => self.sel_loop = None,
            }
        }
        if let Some(path) = self.sel_path {
            if !paths.iter().any(|p| p.id == path) {
                self.sel_path = None;
            }
        }
        if self.hover_loop.is_some_and(|id| path_of(id).is_none()) {
            self.hover_loop = None;
        }
        if self.hover_path.is_some_and(|h| !paths.iter().any(|p| p.id == h)) {
            self.hover_path = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_ids_cleared() {
        let mut sel = SelectionState::default();
        sel.select_loop(PathId::new(), LoopId::new());
        sel.hover_path = Some(PathId::new());
        sel.retain_valid(&[]);
        assert!(sel.is_empty());
        assert!(sel.hover_path.is_none());
    }

    #[test]
    fn test_select_path_drops_loop() {
        let mut sel = SelectionState::default();
        let path = PathId::new();
        sel.select_loop(path, LoopId::new());
        sel.select_path(path);
        assert_eq!(sel.sel_path, Some(path));
        assert!(sel.sel_loop.is_none());
    }
}
