//! Undo history

use crate::cut_path::CutPath;
use crate::state::selection::SelectionState;

/// Deep copy of the editable state, tagged with the operation that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: &'static str,
    pub paths: Vec<CutPath>,
    pub selection: SelectionState,
}

/// Bounded LIFO of snapshots
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Snapshot>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Save current state to the undo stack, dropping the oldest entry
    /// past the depth limit
    pub fn push(&mut self, label: &'static str, paths: &[CutPath], selection: &SelectionState) {
        self.entries.push(Snapshot {
            label,
            paths: paths.to_vec(),
            selection: selection.clone(),
        });
        if self.entries.len() > self.depth {
            self.entries.remove(0);
        }
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop()
    }

    /// Drop the newest entry without restoring it
    pub fn discard_last(&mut self) {
        self.entries.pop();
    }

    pub fn last_label(&self) -> Option<&'static str> {
        self.entries.last().map(|s| s.label)
    }

    /// Labels oldest first
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|s| s.label).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
