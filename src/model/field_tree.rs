//! Field tree - sections of exportable fields with search and collapse state

use super::field::FieldNode;
use std::collections::HashSet;

/// A row of the flattened tree as it is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: FieldNode,
    pub depth: usize,
    pub expanded: bool,
}

/// Hierarchy of section -> leaf fields for one entity
#[derive(Debug, Clone, Default)]
pub struct FieldTree {
    roots: Vec<FieldNode>,
    pub search_text: String,
    collapsed: HashSet<String>,
}

impl FieldTree {
    pub fn new(roots: Vec<FieldNode>) -> Self {
        Self {
            roots,
            search_text: String::new(),
            collapsed: HashSet::new(),
        }
    }

    pub fn roots(&self) -> &[FieldNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of leaf fields across all sections
    pub fn leaf_count(&self) -> usize {
        self.roots.iter().map(|n| n.leaves().len()).sum()
    }

    /// Tree pruned to nodes matching `search_text`
    pub fn filtered_tree(&self, search_text: &str) -> Vec<FieldNode> {
        filter_nodes(&self.roots, search_text)
    }

    pub fn toggle_section(&mut self, key: &str) {
        if !self.collapsed.remove(key) {
            self.collapsed.insert(key.to_string());
        }
    }

    pub fn set_expanded(&mut self, key: &str, expanded: bool) {
        if expanded {
            self.collapsed.remove(key);
        } else {
            self.collapsed.insert(key.to_string());
        }
    }

    /// Flattened rows for the current search text
    ///
    /// Collapsed sections hide their children, except while a search is
    /// active where every matching section is shown open.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let searching = !self.search_text.trim().is_empty();
        let nodes = self.filtered_tree(&self.search_text);
        let mut rows = Vec::new();
        for node in &nodes {
            self.push_rows(node, 0, searching, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &FieldNode, depth: usize, searching: bool, rows: &mut Vec<TreeRow>) {
        let expanded = searching || !self.collapsed.contains(&node.key);
        rows.push(TreeRow {
            node: node.clone(),
            depth,
            expanded,
        });
        if node.is_section() && expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, searching, rows);
            }
        }
    }
}

/// Recursively filter nodes by case-insensitive title substring
///
/// A section whose own title matches keeps all of its children; otherwise
/// it survives only if some descendant matches, carrying just those.
pub fn filter_nodes(nodes: &[FieldNode], search_text: &str) -> Vec<FieldNode> {
    let needle = search_text.trim().to_lowercase();
    if needle.is_empty() {
        return nodes.to_vec();
    }
    filter_with(nodes, &needle)
}

fn filter_with(nodes: &[FieldNode], needle: &str) -> Vec<FieldNode> {
    let mut out = Vec::new();
    for node in nodes {
        if node.title_matches(needle) {
            out.push(node.clone());
        } else if node.is_section() {
            let children = filter_with(&node.children, needle);
            if !children.is_empty() {
                out.push(FieldNode {
                    key: node.key.clone(),
                    title: node.title.clone(),
                    children,
                });
            }
        }
    }
    out
}
