//! Derived tree view over notes and folders.
//!
//! # Responsibility
//! - Model one rendered folder/note entry as a tagged union.
//!
//! # Invariants
//! - Only folder nodes own children; note nodes are leaves.
//! - `parent_id` records the declared parent for reconstruction only. A
//!   node re-attached at root keeps its original (dangling) `parent_id`.

use serde::{Deserialize, Serialize};

/// Variant-specific part of a tree node.
///
/// Serialized as `"type": "folder" | "note"` next to the common fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TreeNodeKind {
    /// Folder with ordered children.
    #[serde(rename = "folder")]
    Folder { children: Vec<TreeNode> },
    /// Reference to one note.
    #[serde(rename = "note")]
    NoteRef,
}

/// One entry of the derived folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Folder id or note id.
    pub id: String,
    /// Folder name or note title.
    pub name: String,
    /// Declared parent folder id.
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub kind: TreeNodeKind,
}

impl TreeNode {
    /// Creates an empty folder node.
    pub fn folder(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            kind: TreeNodeKind::Folder {
                children: Vec::new(),
            },
        }
    }

    /// Creates a note leaf node.
    pub fn note_ref(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            kind: TreeNodeKind::NoteRef,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, TreeNodeKind::Folder { .. })
    }

    /// Ordered children. Always empty for note nodes.
    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            TreeNodeKind::Folder { children } => children.as_slice(),
            TreeNodeKind::NoteRef => &[],
        }
    }

    /// Counts this node and all of its descendants.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    /// Finds a node by id in this subtree (depth-first, pre-order).
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.id == id {
                return Some(node);
            }
            pending.extend(node.children().iter().rev());
        }
        None
    }
}
