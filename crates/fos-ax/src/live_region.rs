//! Live Region Support
//!
//! Tracks which ARIA live region every node belongs to while the tree
//! mutates, buffers the changes made inside live regions during one
//! atomic update, and turns them into the text to announce.
//!
//! Per batch the hooks run strictly in this order: `track_node` /
//! `on_node_will_be_deleted` / `compute_text_for_changed_node` while the
//! update is applied, then `compute_live_region_change_description`,
//! then `on_atomic_update_finished`.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::attributes::{BoolAttribute, StringAttribute};
use crate::{Node, NodeData, NodeId, Role, Tree, TreeId};

/// Token of an aria-relevant value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveRelevant {
    Additions,
    Removals,
    Text,
    All,
}

impl LiveRelevant {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "additions" => Some(Self::Additions),
            "removals" => Some(Self::Removals),
            "text" => Some(Self::Text),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Relevant change flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelevantFlags {
    pub additions: bool,
    pub removals: bool,
    pub text: bool,
}

impl RelevantFlags {
    pub fn all() -> Self {
        Self { additions: true, removals: true, text: true }
    }

    /// ARIA default for aria-relevant
    pub fn additions_text() -> Self {
        Self { additions: true, removals: false, text: true }
    }

    pub fn from_tokens(relevant: &[LiveRelevant]) -> Self {
        let mut flags = Self::default();
        for r in relevant {
            match r {
                LiveRelevant::Additions => flags.additions = true,
                LiveRelevant::Removals => flags.removals = true,
                LiveRelevant::Text => flags.text = true,
                LiveRelevant::All => return Self::all(),
            }
        }
        flags
    }

    /// Parse an aria-relevant string. Unknown tokens are ignored; only an
    /// empty value falls back to "additions text".
    pub fn parse(relevant: &str) -> Self {
        if relevant.trim_ascii().is_empty() {
            return Self::additions_text();
        }
        let tokens: Vec<LiveRelevant> = relevant
            .to_ascii_lowercase()
            .split_ascii_whitespace()
            .filter_map(LiveRelevant::parse)
            .collect();
        Self::from_tokens(&tokens)
    }

    /// Flags of the live region enclosing a node
    pub fn for_node(data: &NodeData) -> Self {
        data.try_get_string_attribute(StringAttribute::ContainerLiveRelevant)
            .map_or_else(Self::additions_text, Self::parse)
    }
}

/// Type of change detected in live region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Node added
    Added,
    /// Node removed
    Removed,
    /// Text content changed
    TextChanged,
}

/// A buffered change, with the node's data as it was when observed
#[derive(Debug, Clone)]
struct LiveRegionChange {
    node_id: NodeId,
    data: NodeData,
    change_type: ChangeType,
}

/// Live region tracker for one tree
#[derive(Debug)]
pub struct LiveRegionTracker {
    tree_id: TreeId,
    /// Live region root of every node inside a live region
    node_to_root: HashMap<NodeId, NodeId>,
    /// Nodes deleted during the current batch
    deleted_node_ids: HashSet<NodeId>,
    /// Buffered changes per live region root, in arrival order
    changes: BTreeMap<NodeId, Vec<LiveRegionChange>>,
}

impl LiveRegionTracker {
    /// Create a tracker and map every node of the tree to its live root
    pub fn new(tree: &Tree) -> Self {
        let mut tracker = Self {
            tree_id: tree.tree_id(),
            node_to_root: HashMap::new(),
            deleted_node_ids: HashSet::new(),
            changes: BTreeMap::new(),
        };
        if let Some(root) = tree.root() {
            tracker.initialize(tree, root, None);
        }
        tracing::debug!(
            "Live region tracker for {}: {} nodes in live regions",
            tracker.tree_id,
            tracker.node_to_root.len()
        );
        tracker
    }

    fn initialize(&mut self, tree: &Tree, node: &Node, mut current_root: Option<NodeId>) {
        if current_root.is_none() && Self::is_live_region_root(node) {
            current_root = Some(node.id());
        }
        if let Some(root) = current_root {
            self.node_to_root.insert(node.id(), root);
        }
        for &child_id in node.children() {
            if let Some(child) = tree.get(child_id) {
                self.initialize(tree, child, current_root);
            }
        }
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// Follow a tree whose id was assigned mid-batch, keeping what is buffered
    pub(crate) fn set_tree_id(&mut self, tree_id: TreeId) {
        self.tree_id = tree_id;
    }

    /// Node carries an aria-live value other than "off"
    pub fn is_live_region_root(node: &Node) -> bool {
        node.live_status().map_or(false, |status| status != "off")
    }

    /// Record the live root of a node that just entered the tree
    pub fn track_node(&mut self, tree: &Tree, node: &Node) {
        if !self.owns(node) {
            return;
        }
        let mut current = Some(node);
        while let Some(candidate) = current {
            if Self::is_live_region_root(candidate) {
                self.node_to_root.insert(node.id(), candidate.id());
                return;
            }
            current = tree.parent_of(candidate);
        }
        self.node_to_root.remove(&node.id());
    }

    /// Re-resolve the live roots of a whole subtree, after it moved or an
    /// aria-live value inside it changed
    pub fn retrack_subtree(&mut self, tree: &Tree, node: &Node) {
        self.track_node(tree, node);
        for &child_id in node.children() {
            if let Some(child) = tree.get(child_id) {
                self.retrack_subtree(tree, child);
            }
        }
    }

    pub fn on_node_will_be_deleted(&mut self, node: &Node) {
        if !self.owns(node) {
            return;
        }
        self.node_to_root.remove(&node.id());
        self.deleted_node_ids.insert(node.id());
    }

    /// End of batch: forget the nodes deleted during it
    pub fn on_atomic_update_finished(&mut self) {
        self.deleted_node_ids.clear();
    }

    /// Live region root enclosing a node, if any
    pub fn live_root<'t>(&self, tree: &'t Tree, node: &Node) -> Option<&'t Node> {
        if node.tree_id() != self.tree_id || self.deleted_node_ids.contains(&node.id()) {
            return None;
        }
        let root_id = self.node_to_root.get(&node.id())?;
        if self.deleted_node_ids.contains(root_id) {
            return None;
        }
        tree.get(*root_id)
    }

    /// Same as [`live_root`](Self::live_root), but `None` while the
    /// region is aria-busy
    pub fn live_root_if_not_busy<'t>(&self, tree: &'t Tree, node: &Node) -> Option<&'t Node> {
        self.live_root(tree, node).filter(|root| !root.is_busy())
    }

    /// Buffer a change if the node is inside a live region
    pub fn compute_text_for_changed_node(&mut self, tree: &Tree, node: &Node, change_type: ChangeType) {
        let Some(root) = self.live_root(tree, node) else {
            return;
        };
        tracing::trace!("Live region {}: {:?} on node {}", root.id(), change_type, node.id());
        self.changes.entry(root.id()).or_default().push(LiveRegionChange {
            node_id: node.id(),
            data: node.data().clone(),
            change_type,
        });
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Turn the buffered changes into one announcement per live region
    /// root. The buffers are empty afterwards, whether or not any root
    /// produced text.
    pub fn compute_live_region_change_description(
        &mut self,
        tree: &Tree,
        descriptions: &mut BTreeMap<NodeId, String>,
    ) {
        let changes = std::mem::take(&mut self.changes);
        for (root_id, root_changes) in changes {
            if let Some(description) = self.describe_root(tree, &root_changes) {
                tracing::trace!("Live region {} announces {:?}", root_id, description);
                descriptions.insert(root_id, description);
            }
        }
    }

    fn describe_root(&self, tree: &Tree, changes: &[LiveRegionChange]) -> Option<String> {
        let mut already_handled = HashSet::new();
        let mut additions = Vec::new();
        let mut removals = Vec::new();

        for change in changes {
            let is_deleted = self.deleted_node_ids.contains(&change.node_id);
            let (node_id, data, live_node) = if is_deleted {
                (change.node_id, &change.data, None)
            } else {
                let Some(node) = tree.get(change.node_id) else {
                    continue;
                };
                let node = atomic_container_of(tree, node);
                (node.id(), node.data(), Some(node))
            };

            // First change seen for a node wins
            if !already_handled.insert(node_id) {
                continue;
            }

            let relevant = RelevantFlags::for_node(data);
            let live_text = match live_node {
                Some(node) if data.get_bool_attribute(BoolAttribute::LiveAtomic) => {
                    text_from_subtree(tree, node)
                }
                _ => data.name().to_string(),
            };
            if live_text.is_empty() {
                continue;
            }

            match change.change_type {
                ChangeType::Added if relevant.additions => additions.push(live_text),
                ChangeType::TextChanged if relevant.text => additions.push(live_text),
                ChangeType::Removed if relevant.removals => removals.push(live_text),
                _ => {}
            }
        }

        if additions.is_empty() && removals.is_empty() {
            return None;
        }

        let mut description = additions.join(" ");
        if !additions.is_empty() && !removals.is_empty() {
            description.push_str(", ");
        }
        if !removals.is_empty() {
            description.push_str(&removals.join(" "));
            description.push_str(" removed");
        }
        Some(description)
    }

    fn owns(&self, node: &Node) -> bool {
        if node.tree_id() == self.tree_id {
            return true;
        }
        tracing::warn!(
            "Live region tracker for {} ignoring node {} of {}",
            self.tree_id,
            node.id(),
            node.tree_id()
        );
        false
    }
}

/// Nearest aria-atomic ancestor of a node inside an atomic container.
/// A node whose atomic ancestor cannot be found reports for itself.
fn atomic_container_of<'t>(tree: &'t Tree, node: &'t Node) -> &'t Node {
    let mut current = node;
    loop {
        let data = current.data();
        if !data.get_bool_attribute(BoolAttribute::ContainerLiveAtomic)
            || data.get_bool_attribute(BoolAttribute::LiveAtomic)
        {
            return current;
        }
        match tree.parent_of(current) {
            Some(parent) => current = parent,
            None => return node,
        }
    }
}

/// Names in a subtree joined by single spaces. Inline text boxes repeat
/// their static text parent and are skipped.
fn text_from_subtree(tree: &Tree, node: &Node) -> String {
    let mut strings = Vec::new();
    collect_subtree_text(tree, node, &mut strings);
    strings.join(" ")
}

fn collect_subtree_text<'t>(tree: &'t Tree, node: &'t Node, strings: &mut Vec<&'t str>) {
    if node.role() == Role::InlineTextBox {
        return;
    }
    let name = node.name();
    if !name.is_empty() {
        strings.push(name);
    }
    for &child_id in node.children() {
        if let Some(child) = tree.get(child_id) {
            collect_subtree_text(tree, child, strings);
        }
    }
}
