//! Event Generator
//!
//! Observes tree updates and turns them into accessibility events,
//! including live region announcements built by the
//! [`LiveRegionTracker`].

use std::collections::{BTreeMap, BTreeSet};

use crate::attributes::{BoolAttribute, StringAttribute};
use crate::live_region::{ChangeType, LiveRegionTracker};
use crate::{Node, NodeData, NodeId, Role, Tree, TreeChange, TreeChangeKind, TreeData, TreeObserver};

/// Accessibility event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Event {
    Alert,
    AtomicChanged,
    BusyChanged,
    ChildrenChanged,
    LiveRegionChanged,
    LiveRegionCreated,
    LiveRegionNodeChanged,
    LiveRelevantChanged,
    LiveStatusChanged,
    NameChanged,
    RoleChanged,
    SubtreeCreated,
    ValueChanged,
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParams {
    pub event: Event,
    /// Text to announce, only on [`Event::LiveRegionChanged`]
    pub live_region_change_description: Option<String>,
}

impl EventParams {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            live_region_change_description: None,
        }
    }
}

/// Event together with the node it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetedEvent {
    pub node_id: NodeId,
    pub params: EventParams,
}

/// Event generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Attach announcement text to live region changed events
    pub compute_live_region_descriptions: bool,
    /// Re-resolve live roots below a node whose aria-live changed
    pub retrack_on_live_status_change: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            compute_live_region_descriptions: true,
            retrack_on_live_status_change: true,
        }
    }
}

impl GeneratorConfig {
    pub fn with_compute_live_region_descriptions(mut self, enabled: bool) -> Self {
        self.compute_live_region_descriptions = enabled;
        self
    }

    pub fn with_retrack_on_live_status_change(mut self, enabled: bool) -> Self {
        self.retrack_on_live_status_change = enabled;
        self
    }
}

/// Collects events for one tree across update batches until cleared
#[derive(Debug)]
pub struct EventGenerator {
    config: GeneratorConfig,
    tracker: LiveRegionTracker,
    events: BTreeMap<NodeId, BTreeMap<Event, EventParams>>,
    /// Live roots flagged during the current batch
    changed_roots: BTreeSet<NodeId>,
    /// Tree id changed during the current batch
    tree_id_changed: bool,
}

impl EventGenerator {
    pub fn new(tree: &Tree) -> Self {
        Self::with_config(tree, GeneratorConfig::default())
    }

    pub fn with_config(tree: &Tree, config: GeneratorConfig) -> Self {
        Self {
            config,
            tracker: LiveRegionTracker::new(tree),
            events: BTreeMap::new(),
            changed_roots: BTreeSet::new(),
            tree_id_changed: false,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn set_compute_live_region_descriptions(&mut self, enabled: bool) {
        self.config.compute_live_region_descriptions = enabled;
    }

    pub fn live_region_tracker(&self) -> &LiveRegionTracker {
        &self.tracker
    }

    /// Pending events, ordered by target node and then by event
    pub fn events(&self) -> Vec<TargetedEvent> {
        self.events
            .iter()
            .flat_map(|(&node_id, events)| {
                events.values().map(move |params| TargetedEvent {
                    node_id,
                    params: params.clone(),
                })
            })
            .collect()
    }

    pub fn has_event(&self, node_id: NodeId, event: Event) -> bool {
        self.events
            .get(&node_id)
            .map_or(false, |events| events.contains_key(&event))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn add_event(&mut self, node_id: NodeId, event: Event) -> &mut EventParams {
        self.events
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_insert_with(|| EventParams::new(event))
    }

    fn flag_live_region_changed(&mut self, root_id: NodeId) {
        self.changed_roots.insert(root_id);
        self.add_event(root_id, Event::LiveRegionChanged);
    }

    /// Live region changed on the enclosing root, plus node changed on
    /// the node itself when it has a name
    fn fire_live_region_events(&mut self, tree: &Tree, node: &Node) {
        let Some(root) = self.tracker.live_root_if_not_busy(tree, node) else {
            return;
        };
        if !node.name().is_empty() {
            self.add_event(node.id(), Event::LiveRegionNodeChanged);
        }
        self.flag_live_region_changed(root.id());
    }

    /// Buffer a live region change and flag its root
    fn record_live_change(&mut self, tree: &Tree, node: &Node, change_type: ChangeType) {
        let Some(root) = self.tracker.live_root_if_not_busy(tree, node) else {
            return;
        };
        let root_id = root.id();
        self.tracker.compute_text_for_changed_node(tree, node, change_type);
        self.flag_live_region_changed(root_id);
    }

    fn on_node_created(&mut self, tree: &Tree, node: &Node, kind: TreeChangeKind) {
        self.tracker.track_node(tree, node);
        if node.role() == Role::Alert {
            self.add_event(node.id(), Event::Alert);
        } else if LiveRegionTracker::is_live_region_root(node) {
            self.add_event(node.id(), Event::LiveRegionCreated);
        }
        if kind == TreeChangeKind::SubtreeCreated {
            self.add_event(node.id(), Event::SubtreeCreated);
            if let Some(parent) = node.parent_id() {
                self.add_event(parent, Event::ChildrenChanged);
            }
        }
        self.record_live_change(tree, node, ChangeType::Added);
    }

    /// A moved subtree reads as added at its new place
    fn on_node_moved(&mut self, tree: &Tree, node: &Node, kind: TreeChangeKind) {
        self.tracker.retrack_subtree(tree, node);
        if kind == TreeChangeKind::SubtreeReparented {
            if let Some(parent) = node.parent_id() {
                self.add_event(parent, Event::ChildrenChanged);
            }
        }
        self.record_moved_subtree(tree, node);
    }

    fn record_moved_subtree(&mut self, tree: &Tree, node: &Node) {
        self.record_live_change(tree, node, ChangeType::Added);
        for &child_id in node.children() {
            if let Some(child) = tree.get(child_id) {
                self.record_moved_subtree(tree, child);
            }
        }
    }
}

impl TreeObserver for EventGenerator {
    fn on_subtree_will_be_deleted(&mut self, _tree: &Tree, node: &Node) {
        if let Some(parent) = node.parent_id() {
            self.add_event(parent, Event::ChildrenChanged);
        }
    }

    fn on_node_will_be_deleted(&mut self, tree: &Tree, node: &Node) {
        self.record_live_change(tree, node, ChangeType::Removed);
        self.tracker.on_node_will_be_deleted(node);
        self.events.remove(&node.id());
    }

    fn on_node_data_changed(&mut self, tree: &Tree, node: &Node, old: &NodeData) {
        // Structure is final here, so the mapping can be refreshed
        self.tracker.track_node(tree, node);
        if old.child_ids != node.data().child_ids {
            self.add_event(node.id(), Event::ChildrenChanged);
        }
    }

    fn on_role_changed(&mut self, _tree: &Tree, node: &Node, _old: Role, _new: Role) {
        self.add_event(node.id(), Event::RoleChanged);
    }

    fn on_string_attribute_changed(
        &mut self,
        tree: &Tree,
        node: &Node,
        attr: StringAttribute,
        old: &str,
        new: &str,
    ) {
        match attr {
            StringAttribute::Name => {
                self.add_event(node.id(), Event::NameChanged);
                self.fire_live_region_events(tree, node);
                self.record_live_change(tree, node, ChangeType::TextChanged);
            }
            StringAttribute::Value => {
                self.add_event(node.id(), Event::ValueChanged);
            }
            StringAttribute::LiveStatus => {
                if node.role() != Role::Alert {
                    self.add_event(node.id(), Event::LiveStatusChanged);
                    let was_live = !old.is_empty() && old != "off";
                    let is_live = !new.is_empty() && new != "off";
                    if !was_live && is_live {
                        self.add_event(node.id(), Event::LiveRegionCreated);
                    }
                }
                if self.config.retrack_on_live_status_change {
                    self.tracker.retrack_subtree(tree, node);
                }
            }
            StringAttribute::LiveRelevant => {
                self.add_event(node.id(), Event::LiveRelevantChanged);
            }
            _ => {}
        }
    }

    fn on_bool_attribute_changed(
        &mut self,
        tree: &Tree,
        node: &Node,
        attr: BoolAttribute,
        new: bool,
    ) {
        match attr {
            BoolAttribute::Busy => {
                self.add_event(node.id(), Event::BusyChanged);
                // A region that stops being busy announces its settled content
                if !new && LiveRegionTracker::is_live_region_root(node) {
                    self.flag_live_region_changed(node.id());
                }
            }
            BoolAttribute::LiveAtomic => {
                self.add_event(node.id(), Event::AtomicChanged);
            }
            _ => {}
        }
    }

    fn on_tree_data_changed(&mut self, tree: &Tree, _old: &TreeData) {
        // Buffers of this batch move over; the tracker is rebuilt once it ends
        if tree.tree_id() != self.tracker.tree_id() {
            self.tracker.set_tree_id(tree.tree_id());
            self.tree_id_changed = true;
        }
    }

    fn on_atomic_update_finished(&mut self, tree: &Tree, root_changed: bool, changes: &[TreeChange]) {
        for change in changes {
            let Some(node) = tree.get(change.node_id) else {
                continue;
            };
            match change.kind {
                TreeChangeKind::NodeCreated | TreeChangeKind::SubtreeCreated => {
                    self.on_node_created(tree, node, change.kind)
                }
                TreeChangeKind::NodeReparented | TreeChangeKind::SubtreeReparented => {
                    self.on_node_moved(tree, node, change.kind)
                }
                TreeChangeKind::NodeChanged => {}
            }
        }

        let mut descriptions = BTreeMap::new();
        self.tracker.compute_live_region_change_description(tree, &mut descriptions);
        if !self.config.compute_live_region_descriptions {
            descriptions.clear();
        }
        // A root flagged again without new text must not repeat an older announcement
        for root_id in std::mem::take(&mut self.changed_roots) {
            if let Some(params) = self
                .events
                .get_mut(&root_id)
                .and_then(|events| events.get_mut(&Event::LiveRegionChanged))
            {
                params.live_region_change_description = descriptions.remove(&root_id);
            }
        }
        for (root_id, description) in descriptions {
            if tree.get(root_id).is_none() {
                continue;
            }
            self.add_event(root_id, Event::LiveRegionChanged)
                .live_region_change_description = Some(description);
        }
        self.tracker.on_atomic_update_finished();

        if root_changed || std::mem::take(&mut self.tree_id_changed) {
            self.tracker = LiveRegionTracker::new(tree);
        }

        tracing::debug!(
            "Batch finished for {}: {} changes, {} nodes with events",
            tree.tree_id(),
            changes.len(),
            self.events.len()
        );
    }
}
