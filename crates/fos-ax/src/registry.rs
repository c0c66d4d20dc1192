//! Tree Registry
//!
//! Resolves trees by id so that navigation can cross into embedded
//! child trees (iframes) and back out to their host nodes. Every step
//! goes through an id lookup; nothing holds on to a tree between calls.

use std::collections::HashMap;

use crate::{AxResult, Node, NodeId, Tree, TreeChange, TreeId, TreeObserver, TreeUpdate};

/// How childless non-text objects (images, embedded controls) are exposed
/// in text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddedObjectBehavior {
    /// Each empty object contributes one U+FFFC character
    ExposeCharacter,
    /// Empty objects contribute no text
    #[default]
    SuppressCharacter,
}

/// Lookup service for trees and nodes by id
pub trait TreeLookup {
    fn tree(&self, tree_id: TreeId) -> Option<&Tree>;

    fn node(&self, tree_id: TreeId, node_id: NodeId) -> Option<&Node> {
        if !node_id.is_valid() {
            return None;
        }
        self.tree(tree_id)?.get(node_id)
    }

    /// Tree whose root the given host node delegates to
    fn child_tree_of(&self, host: &Node) -> Option<&Tree> {
        let child_tree = self.tree(host.data().child_tree_id?)?;
        child_tree.root().map(|_| child_tree)
    }

    /// Parent tree id and host node of an embedded tree
    fn parent_host_of(&self, tree_id: TreeId) -> Option<(TreeId, NodeId)> {
        let parent_tree_id = self.tree(tree_id)?.data().parent_tree_id?;
        let host = self.tree(parent_tree_id)?.child_tree_hosts(tree_id).next()?;
        Some((parent_tree_id, host))
    }

    fn embedded_object_behavior(&self) -> EmbeddedObjectBehavior {
        EmbeddedObjectBehavior::default()
    }
}

/// A lone tree resolves only itself
impl TreeLookup for Tree {
    fn tree(&self, tree_id: TreeId) -> Option<&Tree> {
        (!tree_id.is_unknown() && tree_id == self.tree_id()).then_some(self)
    }
}

/// Owner of all trees of a page, keyed by tree id
#[derive(Debug, Default)]
pub struct TreeRegistry {
    trees: HashMap<TreeId, Tree>,
    embedded_object_behavior: EmbeddedObjectBehavior,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embedded_object_behavior(mut self, behavior: EmbeddedObjectBehavior) -> Self {
        self.embedded_object_behavior = behavior;
        self
    }

    pub fn set_embedded_object_behavior(&mut self, behavior: EmbeddedObjectBehavior) {
        self.embedded_object_behavior = behavior;
    }

    /// Register a tree, returning the tree it replaces
    pub fn insert(&mut self, tree: Tree) -> Option<Tree> {
        if tree.tree_id().is_unknown() {
            tracing::warn!("Registering a tree without a tree id; it cannot be resolved");
        }
        self.trees.insert(tree.tree_id(), tree)
    }

    pub fn remove(&mut self, tree_id: TreeId) -> Option<Tree> {
        self.trees.remove(&tree_id)
    }

    pub fn tree_mut(&mut self, tree_id: TreeId) -> Option<&mut Tree> {
        self.trees.get_mut(&tree_id)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Apply an update to a registered tree. Returns `None` when the tree
    /// is not registered.
    pub fn unserialize(
        &mut self,
        tree_id: TreeId,
        update: &TreeUpdate,
        observer: &mut dyn TreeObserver,
    ) -> Option<AxResult<Vec<TreeChange>>> {
        let tree = self.trees.get_mut(&tree_id)?;
        Some(tree.unserialize_with(update, observer))
    }
}

impl TreeLookup for TreeRegistry {
    fn tree(&self, tree_id: TreeId) -> Option<&Tree> {
        if tree_id.is_unknown() {
            return None;
        }
        self.trees.get(&tree_id)
    }

    fn embedded_object_behavior(&self) -> EmbeddedObjectBehavior {
        self.embedded_object_behavior
    }
}
