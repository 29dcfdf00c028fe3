//! Field model - backend field metadata, tree nodes and chosen columns

use serde::{Deserialize, Serialize};

/// A single field definition from the DocType metadata endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default)]
    pub fieldname: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub fieldtype: String,
}

impl FieldDef {
    /// Label to show, falling back to the raw field name
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => self.fieldname.clone(),
        }
    }
}

/// One exportable attribute (leaf) or one grouping (section)
///
/// A node with children is never a data column itself; adding it to the
/// selection adds its leaves instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub key: String,
    pub title: String,
    pub children: Vec<FieldNode>,
}

impl FieldNode {
    pub fn leaf(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            children: Vec::new(),
        }
    }

    pub fn section(key: &str, title: &str, children: Vec<FieldNode>) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            children,
        }
    }

    pub fn is_section(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaf descendants in depth-first order (a leaf yields itself)
    pub fn leaves(&self) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FieldNode>) {
        if self.children.is_empty() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// Case-insensitive substring match on the title
    pub fn title_matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

/// One chosen output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub key: String,
    pub title: String,
}

impl SelectionEntry {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
        }
    }
}

impl From<&FieldNode> for SelectionEntry {
    fn from(node: &FieldNode) -> Self {
        Self {
            key: node.key.clone(),
            title: node.title.clone(),
        }
    }
}
