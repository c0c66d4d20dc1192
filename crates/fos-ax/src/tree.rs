//! Accessibility Tree
//!
//! Node storage with atomic batch updates. An update is validated in
//! full before the tree is touched, so a rejected update leaves the tree
//! exactly as it was. Observers see deletions while the old structure is
//! still intact, attribute changes once the new structure is in place,
//! and a single end-of-batch notification.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::attributes::{BoolAttribute, IntAttribute, StringAttribute};
use crate::{AxError, AxResult, Node, NodeData, NodeId, Role, TreeData, TreeId, TreeUpdate};

/// Kind of structural change reported at the end of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeChangeKind {
    /// New node below another new node
    NodeCreated,
    /// New node attached to a pre-existing parent (or a new root)
    SubtreeCreated,
    /// Pre-existing node whose data changed
    NodeChanged,
    /// Moved node below another moved or new node
    NodeReparented,
    /// Moved node attached to a pre-existing parent
    SubtreeReparented,
}

/// One entry of the change list passed to
/// [`TreeObserver::on_atomic_update_finished`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeChange {
    pub node_id: NodeId,
    pub kind: TreeChangeKind,
}

/// Receives notifications while a [`TreeUpdate`] is applied
///
/// All methods default to doing nothing.
pub trait TreeObserver {
    /// Called once for the top of every deleted subtree, before any of
    /// its nodes are deleted
    fn on_subtree_will_be_deleted(&mut self, _tree: &Tree, _node: &Node) {}

    /// Called for every deleted node, parents before children
    fn on_node_will_be_deleted(&mut self, _tree: &Tree, _node: &Node) {}

    /// Called for every node that is about to move to a new parent
    fn on_node_will_be_reparented(&mut self, _tree: &Tree, _node: &Node) {}

    /// A pre-existing node's data changed; `node` holds the new data
    fn on_node_data_changed(&mut self, _tree: &Tree, _node: &Node, _old: &NodeData) {}

    fn on_role_changed(&mut self, _tree: &Tree, _node: &Node, _old: Role, _new: Role) {}

    fn on_string_attribute_changed(
        &mut self,
        _tree: &Tree,
        _node: &Node,
        _attr: StringAttribute,
        _old: &str,
        _new: &str,
    ) {
    }

    fn on_bool_attribute_changed(
        &mut self,
        _tree: &Tree,
        _node: &Node,
        _attr: BoolAttribute,
        _new: bool,
    ) {
    }

    fn on_int_attribute_changed(
        &mut self,
        _tree: &Tree,
        _node: &Node,
        _attr: IntAttribute,
        _old: i32,
        _new: i32,
    ) {
    }

    fn on_tree_data_changed(&mut self, _tree: &Tree, _old: &TreeData) {}

    /// Called once after the whole batch has been applied
    fn on_atomic_update_finished(
        &mut self,
        _tree: &Tree,
        _root_changed: bool,
        _changes: &[TreeChange],
    ) {
    }
}

/// No-op observer
impl TreeObserver for () {}

/// Validated outcome of an update, computed without touching the tree
struct UpdatePlan {
    new_root: NodeId,
    /// Reachable nodes in pre-order, with parent and index in parent
    order: Vec<(NodeId, Option<NodeId>, usize)>,
    deleted: HashSet<NodeId>,
    created: HashSet<NodeId>,
    reparented: HashSet<NodeId>,
}

/// Accessibility tree
#[derive(Debug, Clone, Default)]
pub struct Tree {
    data: TreeData,
    root: Option<NodeId>,
    nodes: HashMap<NodeId, Node>,
    /// Host nodes by the child tree they embed
    child_tree_hosts: HashMap<TreeId, BTreeSet<NodeId>>,
}

impl Tree {
    /// Create an empty tree
    pub fn new(tree_id: TreeId) -> Self {
        Self {
            data: TreeData {
                tree_id,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Build a tree from an initial update. The tree id comes from the
    /// update's tree data, or is freshly allocated.
    pub fn from_update(update: &TreeUpdate) -> AxResult<Self> {
        let tree_id = update
            .tree_data
            .as_ref()
            .map(|d| d.tree_id)
            .filter(|id| !id.is_unknown())
            .unwrap_or_else(TreeId::new);
        let mut tree = Self::new(tree_id);
        tree.unserialize(update)?;
        Ok(tree)
    }

    pub fn tree_id(&self) -> TreeId {
        self.data.tree_id
    }

    pub fn data(&self) -> &TreeData {
        &self.data
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.and_then(|id| self.get(id))
    }

    /// Get node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent.and_then(|id| self.get(id))
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of this tree that embed the given child tree
    pub fn child_tree_hosts(&self, child_tree: TreeId) -> impl Iterator<Item = NodeId> + '_ {
        self.child_tree_hosts
            .get(&child_tree)
            .into_iter()
            .flat_map(|hosts| hosts.iter().copied())
    }

    /// Full snapshot of the current state as an update
    pub fn to_update(&self) -> TreeUpdate {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                nodes.push(node.data.clone());
                stack.extend(node.children().iter().rev().copied());
            }
        }
        TreeUpdate {
            root_id: self.root,
            node_id_to_clear: None,
            nodes,
            tree_data: Some(self.data.clone()),
        }
    }

    /// Apply an update without observers
    pub fn unserialize(&mut self, update: &TreeUpdate) -> AxResult<Vec<TreeChange>> {
        self.unserialize_with(update, &mut ())
    }

    /// Apply an update atomically, notifying `observer`
    pub fn unserialize_with(
        &mut self,
        update: &TreeUpdate,
        observer: &mut dyn TreeObserver,
    ) -> AxResult<Vec<TreeChange>> {
        let plan = match self.plan(update) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!("Rejected update for {}: {}", self.tree_id(), err);
                return Err(err);
            }
        };
        Ok(self.apply(update, plan, observer))
    }

    fn plan(&self, update: &TreeUpdate) -> AxResult<UpdatePlan> {
        let mut updated: HashMap<NodeId, &NodeData> = HashMap::new();
        for data in &update.nodes {
            if !data.id.is_valid() {
                return Err(AxError::InvalidNodeId);
            }
            updated.insert(data.id, data);
        }

        // Nodes discarded by node_id_to_clear cannot be reused, only re-created
        let mut cleared = HashSet::new();
        if let Some(clear_id) = update.node_id_to_clear {
            if let Some(node) = self.get(clear_id) {
                if self.root == Some(clear_id) {
                    cleared.insert(clear_id);
                }
                self.collect_descendants(node, &mut cleared);
            }
        }

        let data_for = |id: NodeId| self.planned_data(&updated, &cleared, id);

        let new_root = match update.root_id.or(self.root) {
            Some(id) => id,
            None => return Err(AxError::EmptyTree),
        };
        if !new_root.is_valid() {
            return Err(AxError::InvalidNodeId);
        }
        if data_for(new_root).is_none() {
            return Err(AxError::RootNotFound(new_root));
        }

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(new_root, None, 0usize)];
        visited.insert(new_root);
        while let Some((id, parent, index)) = stack.pop() {
            order.push((id, parent, index));
            let Some(data) = data_for(id) else {
                return Err(AxError::RootNotFound(id));
            };
            let mut children = Vec::with_capacity(data.child_ids.len());
            for (i, &child) in data.child_ids.iter().enumerate() {
                if !child.is_valid() {
                    return Err(AxError::InvalidNodeId);
                }
                if !visited.insert(child) {
                    return Err(AxError::DuplicateChild(child));
                }
                if data_for(child).is_none() {
                    return Err(AxError::MissingChild { parent: id, child });
                }
                children.push((child, Some(id), i));
            }
            stack.extend(children.into_iter().rev());
        }

        if let Some(data) = update.nodes.iter().find(|d| !visited.contains(&d.id)) {
            return Err(AxError::NodeNotReachable(data.id));
        }

        let deleted: HashSet<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| !visited.contains(id) || cleared.contains(id))
            .collect();
        let created: HashSet<NodeId> = visited
            .iter()
            .copied()
            .filter(|id| !self.nodes.contains_key(id) || cleared.contains(id))
            .collect();
        let reparented = order
            .iter()
            .filter(|(id, parent, _)| {
                !created.contains(id)
                    && self.get(*id).map_or(false, |old| old.parent != *parent)
            })
            .map(|(id, _, _)| *id)
            .collect();

        Ok(UpdatePlan {
            new_root,
            order,
            deleted,
            created,
            reparented,
        })
    }

    /// Data a node will have after the update, if it will exist at all
    fn planned_data<'a>(
        &'a self,
        updated: &HashMap<NodeId, &'a NodeData>,
        cleared: &HashSet<NodeId>,
        id: NodeId,
    ) -> Option<&'a NodeData> {
        if let Some(data) = updated.get(&id) {
            return Some(*data);
        }
        if cleared.contains(&id) {
            return None;
        }
        self.get(id).map(|n| &n.data)
    }

    fn collect_descendants(&self, node: &Node, out: &mut HashSet<NodeId>) {
        for &child_id in node.children() {
            if let Some(child) = self.get(child_id) {
                out.insert(child_id);
                self.collect_descendants(child, out);
            }
        }
    }

    fn apply(
        &mut self,
        update: &TreeUpdate,
        plan: UpdatePlan,
        observer: &mut dyn TreeObserver,
    ) -> Vec<TreeChange> {
        let UpdatePlan {
            new_root,
            order,
            deleted,
            created,
            reparented,
        } = plan;

        self.notify_removals(&deleted, &reparented, observer);

        for id in &deleted {
            self.nodes.remove(id);
        }
        for hosts in self.child_tree_hosts.values_mut() {
            hosts.retain(|id| !deleted.contains(id));
        }

        let mut updated: HashMap<NodeId, &NodeData> = HashMap::new();
        for data in &update.nodes {
            updated.insert(data.id, data);
        }

        let tree_id = self.tree_id();
        let mut data_changes: Vec<(NodeId, NodeData)> = Vec::new();
        let mut changes = Vec::new();
        for &(id, parent, index) in &order {
            let new_data = updated.get(&id).copied();
            if created.contains(&id) {
                let Some(data) = new_data else {
                    continue;
                };
                let mut node = Node::new(tree_id, data.clone());
                node.parent = parent;
                node.index_in_parent = index;
                self.index_child_tree(id, None, data.child_tree_id);
                self.nodes.insert(id, node);

                let parent_is_new = parent.map_or(false, |p| created.contains(&p));
                changes.push(TreeChange {
                    node_id: id,
                    kind: if parent_is_new {
                        TreeChangeKind::NodeCreated
                    } else {
                        TreeChangeKind::SubtreeCreated
                    },
                });
                continue;
            }

            let mut old_hosted = None;
            let mut new_hosted = None;
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = parent;
                node.index_in_parent = index;
                if let Some(data) = new_data {
                    if node.data != *data {
                        old_hosted = node.data.child_tree_id;
                        new_hosted = data.child_tree_id;
                        let old = std::mem::replace(&mut node.data, data.clone());
                        data_changes.push((id, old));
                    }
                }
            }
            if old_hosted != new_hosted {
                self.index_child_tree(id, old_hosted, new_hosted);
            }

            if reparented.contains(&id) {
                let parent_moved = parent
                    .map_or(false, |p| reparented.contains(&p) || created.contains(&p));
                changes.push(TreeChange {
                    node_id: id,
                    kind: if parent_moved {
                        TreeChangeKind::NodeReparented
                    } else {
                        TreeChangeKind::SubtreeReparented
                    },
                });
            } else if data_changes.last().map_or(false, |(changed, _)| *changed == id) {
                changes.push(TreeChange {
                    node_id: id,
                    kind: TreeChangeKind::NodeChanged,
                });
            }
        }

        let root_changed = self.root != Some(new_root);
        self.root = Some(new_root);

        for (id, old) in &data_changes {
            if let Some(node) = self.nodes.get(id) {
                notify_data_change(self, node, old, observer);
            }
        }
        // Node callbacks still see the old tree id
        let old_tree_data = update.tree_data.as_ref().and_then(|data| self.replace_tree_data(data));
        if let Some(old) = &old_tree_data {
            observer.on_tree_data_changed(self, old);
        }

        tracing::debug!(
            "Applied update to {}: {} nodes, {} created, {} deleted, {} changed",
            tree_id,
            self.nodes.len(),
            created.len(),
            deleted.len(),
            data_changes.len()
        );

        observer.on_atomic_update_finished(self, root_changed, &changes);
        changes
    }

    /// Deletion and reparenting callbacks, walking the old structure in pre-order
    fn notify_removals(
        &self,
        deleted: &HashSet<NodeId>,
        reparented: &HashSet<NodeId>,
        observer: &mut dyn TreeObserver,
    ) {
        if deleted.is_empty() && reparented.is_empty() {
            return;
        }
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if deleted.contains(&id) {
                let parent_deleted = node.parent.map_or(false, |p| deleted.contains(&p));
                if !parent_deleted {
                    observer.on_subtree_will_be_deleted(self, node);
                }
                observer.on_node_will_be_deleted(self, node);
            } else if reparented.contains(&id) {
                observer.on_node_will_be_reparented(self, node);
            }
            stack.extend(node.children().iter().rev().copied());
        }
    }

    fn index_child_tree(&mut self, host: NodeId, old: Option<TreeId>, new: Option<TreeId>) {
        if let Some(old) = old {
            if let Some(hosts) = self.child_tree_hosts.get_mut(&old) {
                hosts.remove(&host);
            }
        }
        if let Some(new) = new {
            self.child_tree_hosts.entry(new).or_default().insert(host);
        }
    }

    /// Returns the previous tree data if anything changed
    fn replace_tree_data(&mut self, data: &TreeData) -> Option<TreeData> {
        let previous = self.data.clone();
        let mut next = data.clone();
        if next.tree_id != self.data.tree_id {
            if !next.tree_id.is_unknown() && !self.data.tree_id.is_unknown() {
                tracing::warn!(
                    "Ignoring tree id change from {} to {}",
                    self.data.tree_id,
                    next.tree_id
                );
            }
            if self.data.tree_id.is_unknown() {
                self.set_tree_id(next.tree_id);
            }
            next.tree_id = self.data.tree_id;
        }
        if next == previous {
            return None;
        }
        self.data = next;
        Some(previous)
    }

    fn set_tree_id(&mut self, tree_id: TreeId) {
        self.data.tree_id = tree_id;
        for node in self.nodes.values_mut() {
            node.tree_id = tree_id;
        }
    }
}

/// Role and per-attribute callbacks for one changed node
fn notify_data_change(tree: &Tree, node: &Node, old: &NodeData, observer: &mut dyn TreeObserver) {
    let new = node.data();
    observer.on_node_data_changed(tree, node, old);

    if old.role != new.role {
        observer.on_role_changed(tree, node, old.role, new.role);
    }

    let string_keys: BTreeSet<StringAttribute> = old
        .string_attributes
        .keys()
        .chain(new.string_attributes.keys())
        .copied()
        .collect();
    for attr in string_keys {
        let (before, after) = (old.get_string_attribute(attr), new.get_string_attribute(attr));
        if before != after {
            observer.on_string_attribute_changed(tree, node, attr, before, after);
        }
    }

    let bool_keys: BTreeSet<BoolAttribute> = old
        .bool_attributes
        .keys()
        .chain(new.bool_attributes.keys())
        .copied()
        .collect();
    for attr in bool_keys {
        let after = new.get_bool_attribute(attr);
        if old.get_bool_attribute(attr) != after {
            observer.on_bool_attribute_changed(tree, node, attr, after);
        }
    }

    let int_keys: BTreeSet<IntAttribute> = old
        .int_attributes
        .keys()
        .chain(new.int_attributes.keys())
        .copied()
        .collect();
    for attr in int_keys {
        let (before, after) = (old.get_int_attribute(attr), new.get_int_attribute(attr));
        if before != after {
            observer.on_int_attribute_changed(tree, node, attr, before, after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl TreeObserver for Recorder {
        fn on_subtree_will_be_deleted(&mut self, _tree: &Tree, node: &Node) {
            self.log.push(format!("subtree-deleted {}", node.id()));
        }

        fn on_node_will_be_deleted(&mut self, _tree: &Tree, node: &Node) {
            self.log.push(format!("deleted {}", node.id()));
        }

        fn on_string_attribute_changed(
            &mut self,
            _tree: &Tree,
            node: &Node,
            attr: StringAttribute,
            old: &str,
            new: &str,
        ) {
            self.log.push(format!("{} {:?} {:?}->{:?}", node.id(), attr, old, new));
        }

        fn on_tree_data_changed(&mut self, tree: &Tree, old: &TreeData) {
            self.log.push(format!("tree-data {} -> {}", old.tree_id, tree.tree_id()));
        }

        fn on_atomic_update_finished(&mut self, _tree: &Tree, root_changed: bool, changes: &[TreeChange]) {
            self.log.push(format!("finished root_changed={} changes={}", root_changed, changes.len()));
        }
    }

    fn initial() -> TreeUpdate {
        TreeUpdate::new(1, vec![
            NodeData::new(1, Role::RootWebArea).with_children(&[2, 3]),
            NodeData::new(2, Role::StaticText).with_name("One"),
            NodeData::new(3, Role::Group).with_children(&[4]),
            NodeData::new(4, Role::StaticText).with_name("Two"),
        ])
    }

    #[test]
    fn test_build_from_update() {
        let tree = Tree::from_update(&initial()).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root_id(), Some(NodeId(1)));
        let four = tree.get(NodeId(4)).unwrap();
        assert_eq!(four.parent_id(), Some(NodeId(3)));
        assert_eq!(tree.get(NodeId(3)).unwrap().index_in_parent(), 1);
        assert!(!tree.tree_id().is_unknown());
    }

    #[test]
    fn test_change_kinds() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate {
            nodes: vec![
                NodeData::new(3, Role::Group).with_children(&[4, 5]),
                NodeData::new(4, Role::StaticText).with_name("Changed"),
                NodeData::new(5, Role::Group).with_children(&[6]),
                NodeData::new(6, Role::StaticText).with_name("New"),
            ],
            ..Default::default()
        };
        let changes = tree.unserialize(&update).unwrap();
        assert_eq!(
            changes,
            vec![
                TreeChange { node_id: NodeId(3), kind: TreeChangeKind::NodeChanged },
                TreeChange { node_id: NodeId(4), kind: TreeChangeKind::NodeChanged },
                TreeChange { node_id: NodeId(5), kind: TreeChangeKind::SubtreeCreated },
                TreeChange { node_id: NodeId(6), kind: TreeChangeKind::NodeCreated },
            ]
        );
    }

    #[test]
    fn test_unchanged_data_is_not_reported() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let changes = tree.unserialize(&initial()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_deletion_callbacks_in_pre_order() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate {
            nodes: vec![NodeData::new(1, Role::RootWebArea).with_children(&[2])],
            ..Default::default()
        };
        let mut recorder = Recorder::default();
        tree.unserialize_with(&update, &mut recorder).unwrap();
        assert_eq!(
            recorder.log,
            vec![
                "subtree-deleted 3",
                "deleted 3",
                "deleted 4",
                "finished root_changed=false changes=1",
            ]
        );
        assert!(tree.get(NodeId(3)).is_none());
        assert!(tree.get(NodeId(4)).is_none());
    }

    #[test]
    fn test_attribute_callbacks_see_new_structure() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let mut update = initial();
        update.node_mut(2).unwrap().set_name("Uno");
        let mut recorder = Recorder::default();
        tree.unserialize_with(&update, &mut recorder).unwrap();
        assert_eq!(recorder.log[0], "2 Name \"One\"->\"Uno\"");
        assert_eq!(tree.get(NodeId(2)).unwrap().name(), "Uno");
    }

    #[test]
    fn test_reparent() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate {
            nodes: vec![
                NodeData::new(1, Role::RootWebArea).with_children(&[3]),
                NodeData::new(3, Role::Group).with_children(&[4, 2]),
            ],
            ..Default::default()
        };
        let changes = tree.unserialize(&update).unwrap();
        assert!(changes.contains(&TreeChange {
            node_id: NodeId(2),
            kind: TreeChangeKind::SubtreeReparented,
        }));
        let two = tree.get(NodeId(2)).unwrap();
        assert_eq!(two.parent_id(), Some(NodeId(3)));
        assert_eq!(two.index_in_parent(), 1);
    }

    #[test]
    fn test_rejected_updates_leave_tree_untouched() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let before = tree.to_update();

        let missing = TreeUpdate {
            nodes: vec![NodeData::new(3, Role::Group).with_children(&[4, 99])],
            ..Default::default()
        };
        assert!(matches!(
            tree.unserialize(&missing),
            Err(AxError::MissingChild { parent: NodeId(3), child: NodeId(99) })
        ));

        let duplicate = TreeUpdate {
            nodes: vec![NodeData::new(3, Role::Group).with_children(&[4, 2])],
            ..Default::default()
        };
        assert!(matches!(tree.unserialize(&duplicate), Err(AxError::DuplicateChild(NodeId(2)))));

        let cycle = TreeUpdate {
            nodes: vec![NodeData::new(4, Role::Group).with_children(&[1])],
            ..Default::default()
        };
        assert!(matches!(tree.unserialize(&cycle), Err(AxError::DuplicateChild(NodeId(1)))));

        let orphan = TreeUpdate {
            nodes: vec![NodeData::new(42, Role::StaticText)],
            ..Default::default()
        };
        assert!(matches!(tree.unserialize(&orphan), Err(AxError::NodeNotReachable(NodeId(42)))));

        let invalid = TreeUpdate {
            nodes: vec![NodeData::new(0, Role::StaticText)],
            ..Default::default()
        };
        assert!(matches!(tree.unserialize(&invalid), Err(AxError::InvalidNodeId)));

        assert_eq!(tree.to_update(), before);
    }

    #[test]
    fn test_empty_tree_needs_root() {
        let mut tree = Tree::new(TreeId::new());
        assert!(matches!(tree.unserialize(&TreeUpdate::default()), Err(AxError::EmptyTree)));
        let update = TreeUpdate::new(5, vec![]);
        assert!(matches!(tree.unserialize(&update), Err(AxError::RootNotFound(NodeId(5)))));
    }

    #[test]
    fn test_root_change() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate::new(10, vec![NodeData::new(10, Role::RootWebArea)]);
        let mut recorder = Recorder::default();
        tree.unserialize_with(&update, &mut recorder).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(recorder.log[0], "subtree-deleted 1");
        assert_eq!(recorder.log.last().unwrap(), "finished root_changed=true changes=1");
    }

    #[test]
    fn test_node_id_to_clear_recreates_children() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate {
            node_id_to_clear: Some(NodeId(3)),
            nodes: vec![
                NodeData::new(3, Role::Group).with_children(&[4]),
                NodeData::new(4, Role::StaticText).with_name("Two"),
            ],
            ..Default::default()
        };
        let mut recorder = Recorder::default();
        let changes = tree.unserialize_with(&update, &mut recorder).unwrap();
        assert!(recorder.log.contains(&"deleted 4".to_string()));
        assert_eq!(
            changes,
            vec![TreeChange { node_id: NodeId(4), kind: TreeChangeKind::SubtreeCreated }]
        );
    }

    #[test]
    fn test_node_id_to_clear_requires_resent_children() {
        let mut tree = Tree::from_update(&initial()).unwrap();
        let update = TreeUpdate {
            node_id_to_clear: Some(NodeId(3)),
            nodes: vec![],
            ..Default::default()
        };
        assert!(matches!(
            tree.unserialize(&update),
            Err(AxError::MissingChild { parent: NodeId(3), child: NodeId(4) })
        ));
    }

    #[test]
    fn test_tree_id_assignment_is_reported() {
        let mut tree = Tree::new(TreeId::UNKNOWN);
        tree.unserialize(&initial()).unwrap();
        let mut update = initial();
        update.node_mut(2).unwrap().set_name("Uno");
        update.tree_data = Some(TreeData { tree_id: TreeId::from_raw(7), ..Default::default() });

        let mut recorder = Recorder::default();
        tree.unserialize_with(&update, &mut recorder).unwrap();
        assert_eq!(
            recorder.log,
            vec![
                "2 Name \"One\"->\"Uno\"",
                "tree-data tree#0 -> tree#7",
                "finished root_changed=false changes=1",
            ]
        );
        assert_eq!(tree.get(NodeId(4)).unwrap().tree_id(), TreeId::from_raw(7));

        // A known id is never replaced
        update.tree_data = Some(TreeData { tree_id: TreeId::from_raw(8), ..Default::default() });
        recorder.log.clear();
        tree.unserialize_with(&update, &mut recorder).unwrap();
        assert_eq!(recorder.log, vec!["finished root_changed=false changes=0"]);
        assert_eq!(tree.tree_id(), TreeId::from_raw(7));
    }

    #[test]
    fn test_child_tree_hosts() {
        let child = TreeId::new();
        let mut tree = Tree::from_update(&initial()).unwrap();
        let mut update = initial();
        *update.node_mut(2).unwrap() = NodeData::new(2, Role::Iframe).with_child_tree(child);
        tree.unserialize(&update).unwrap();
        assert_eq!(tree.child_tree_hosts(child).collect::<Vec<_>>(), vec![NodeId(2)]);

        tree.unserialize(&initial()).unwrap();
        assert_eq!(tree.child_tree_hosts(child).count(), 0);
    }
}
