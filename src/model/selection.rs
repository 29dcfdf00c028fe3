//! Selection list - ordered, duplicate-free export columns
//!
//! Entry order is export column order: the fetcher, the preview and every
//! encoder iterate this list as-is.

use super::field::{FieldNode, SelectionEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionList {
    entries: Vec<SelectionEntry>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Append a leaf, or every leaf under a section, skipping keys already present
    ///
    /// Returns how many entries were appended.
    pub fn add_field(&mut self, node: &FieldNode) -> usize {
        let mut added = 0;
        for leaf in node.leaves() {
            if !self.contains(&leaf.key) {
                self.entries.push(SelectionEntry::from(leaf));
                added += 1;
            }
        }
        added
    }

    /// Remove the entry with `key`; false when absent
    pub fn remove_field(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Move the entry at `from` so that it ends up at `to`
    ///
    /// `to` is clamped to the last index. Called on every hover during a
    /// drag, so repeated calls with the same slot are cheap no-ops.
    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len {
            return false;
        }
        let to = to.min(len - 1);
        if from == to {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.title.clone()).collect()
    }
}

/// Drop target for pointer drags onto the selection pane
///
/// Keeps the drag gesture code independent of the list it edits.
pub trait SelectionDropTarget {
    /// A tree node was released over the selection pane
    fn on_drop_into_selection(&mut self, node: &FieldNode) -> usize;

    /// A selection entry is hovering over a new slot
    fn on_reorder(&mut self, from: usize, to: usize) -> bool;
}

impl SelectionDropTarget for SelectionList {
    fn on_drop_into_selection(&mut self, node: &FieldNode) -> usize {
        self.add_field(node)
    }

    fn on_reorder(&mut self, from: usize, to: usize) -> bool {
        self.move_field(from, to)
    }
}
