//! fOS Accessibility Tree
//!
//! Accessibility tree model for the fOS browser engine, with atomic
//! updates, ARIA live region change tracking and text positions.
//!
//! Features:
//! - Accessibility tree with atomic, validated batch updates
//! - Multi-tree registry for embedded frames
//! - Live region change descriptions (aria-live, aria-relevant, aria-atomic)
//! - Node positions for text navigation (text, length, word boundaries)
//! - Event generation from tree diffs

pub mod role;
pub mod attributes;
pub mod node_data;
pub mod node;
pub mod tree;
pub mod registry;
pub mod live_region;
pub mod position;
pub mod event_generator;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub use role::Role;
pub use attributes::{
    BoolAttribute, IntAttribute, IntListAttribute, StringAttribute, TextStyles,
};
pub use node_data::{NodeData, TreeData, TreeUpdate};
pub use node::Node;
pub use tree::{Tree, TreeChange, TreeChangeKind, TreeObserver};
pub use registry::{EmbeddedObjectBehavior, TreeLookup, TreeRegistry};
pub use live_region::{ChangeType, LiveRegionTracker, LiveRelevant, RelevantFlags};
pub use position::{NodePosition, PositionKind, TextAffinity, EMBEDDED_CHARACTER, INVALID_INDEX, INVALID_OFFSET};
pub use event_generator::{Event, EventGenerator, EventParams, GeneratorConfig, TargetedEvent};

/// Node identifier, unique within one tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i32);

impl NodeId {
    /// Sentinel for "no node"
    pub const INVALID: NodeId = NodeId(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tree identifier, unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(pub u64);

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

impl TreeId {
    /// Sentinel for a tree that is not known to any registry
    pub const UNKNOWN: TreeId = TreeId(0);

    /// Allocate a fresh process-unique tree id
    pub fn new() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// Accessibility tree error
#[derive(Debug, thiserror::Error)]
pub enum AxError {
    #[error("Update names the invalid node id 0")]
    InvalidNodeId,

    #[error("Root node {0} is not part of the tree or the update")]
    RootNotFound(NodeId),

    #[error("Node {parent} lists child {child}, which is neither in the tree nor in the update")]
    MissingChild { parent: NodeId, child: NodeId },

    #[error("Node {0} appears more than once in the tree (duplicate child or cycle)")]
    DuplicateChild(NodeId),

    #[error("Updated node {0} is not reachable from the root")]
    NodeNotReachable(NodeId),

    #[error("Update has no root and the tree is empty")]
    EmptyTree,

    #[error("Invalid tree update JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AxResult<T> = Result<T, AxError>;
