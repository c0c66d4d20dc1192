//! Accessibility Node
//!
//! A node living inside a [`Tree`]. Nodes are only created or mutated
//! through atomic tree updates.

use crate::attributes::{BoolAttribute, StringAttribute};
use crate::{NodeData, NodeId, Role, Tree, TreeId};

/// Live node in a tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) tree_id: TreeId,
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index_in_parent: usize,
}

impl Node {
    pub(crate) fn new(tree_id: TreeId, data: NodeData) -> Self {
        Self {
            tree_id,
            data,
            parent: None,
            index_in_parent: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.data.id
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    pub fn role(&self) -> Role {
        self.data.role
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Parent within the same tree
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.data.child_ids
    }

    pub fn child_count(&self) -> usize {
        self.data.child_ids.len()
    }

    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent
    }

    pub fn is_leaf(&self) -> bool {
        self.data.child_ids.is_empty()
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }

    pub fn is_text(&self) -> bool {
        self.data.role.is_text()
    }

    /// A line break, or the text box inside one
    pub fn is_line_break(&self, tree: &Tree) -> bool {
        if self.data.role == Role::LineBreak {
            return true;
        }
        self.is_text()
            && self
                .parent
                .and_then(|id| tree.get(id))
                .map_or(false, |parent| parent.role() == Role::LineBreak)
    }

    /// This node, its parent or its grandparent is a list marker
    pub fn is_in_list_marker(&self, tree: &Tree) -> bool {
        let mut current = Some(self);
        for _ in 0..3 {
            let Some(node) = current else {
                return false;
            };
            if node.role() == Role::ListMarker {
                return true;
            }
            current = node.parent.and_then(|id| tree.get(id));
        }
        false
    }

    pub fn is_busy(&self) -> bool {
        self.data.get_bool_attribute(BoolAttribute::Busy)
    }

    pub fn live_status(&self) -> Option<&str> {
        self.data.try_get_string_attribute(StringAttribute::LiveStatus)
    }
}
