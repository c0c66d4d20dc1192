//! Node Positions
//!
//! A position is a plain value naming a point in accessible content: a
//! child slot of a node (tree position) or a character offset inside a
//! node's text (text position). Positions hold ids only; every query
//! resolves the anchor through a [`TreeLookup`] at call time, so a
//! position that outlived its node simply resolves to nothing.
//!
//! Text lengths and offsets count UTF-16 code units.

use std::collections::HashSet;
use std::fmt;

use crate::attributes::{BoolAttribute, IntAttribute, IntListAttribute, StringAttribute, TextStyles};
use crate::{EmbeddedObjectBehavior, Node, NodeId, Role, Tree, TreeId, TreeLookup};

/// Offset returned when no text offset applies
pub const INVALID_OFFSET: i32 = -1;

/// Child index returned when no child index applies
pub const INVALID_INDEX: i32 = -1;

/// Placeholder exposed for empty embedded objects
pub const EMBEDDED_CHARACTER: char = '\u{FFFC}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionKind {
    #[default]
    Null,
    Tree,
    Text,
}

/// Side of a soft line break a text offset sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAffinity {
    Upstream,
    #[default]
    Downstream,
}

/// Position in an accessibility tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePosition {
    kind: PositionKind,
    tree_id: TreeId,
    anchor_id: NodeId,
    /// Child index for tree positions, text offset for text positions
    child_index_or_text_offset: i32,
    affinity: TextAffinity,
}

impl NodePosition {
    pub fn create_null_position() -> Self {
        Self::default()
    }

    pub fn create_tree_position(tree_id: TreeId, anchor_id: NodeId, child_index: i32) -> Self {
        if tree_id.is_unknown() || !anchor_id.is_valid() {
            return Self::create_null_position();
        }
        Self {
            kind: PositionKind::Tree,
            tree_id,
            anchor_id,
            child_index_or_text_offset: child_index,
            affinity: TextAffinity::Downstream,
        }
    }

    pub fn create_text_position(
        tree_id: TreeId,
        anchor_id: NodeId,
        text_offset: i32,
        affinity: TextAffinity,
    ) -> Self {
        if tree_id.is_unknown() || !anchor_id.is_valid() {
            return Self::create_null_position();
        }
        Self {
            kind: PositionKind::Text,
            tree_id,
            anchor_id,
            child_index_or_text_offset: text_offset,
            affinity,
        }
    }

    /// Text position on text nodes, tree position everywhere else. A node
    /// that does not belong to a known tree yields a null position.
    pub fn create_position(node: &Node, offset: i32, affinity: TextAffinity) -> Self {
        if node.tree_id().is_unknown() {
            return Self::create_null_position();
        }
        if node.is_text() {
            Self::create_text_position(node.tree_id(), node.id(), offset, affinity)
        } else {
            Self::create_tree_position(node.tree_id(), node.id(), offset)
        }
    }

    pub fn kind(&self) -> PositionKind {
        self.kind
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    pub fn anchor_id(&self) -> NodeId {
        self.anchor_id
    }

    /// Child index of a tree position, [`INVALID_INDEX`] otherwise
    pub fn child_index(&self) -> i32 {
        match self.kind {
            PositionKind::Tree => self.child_index_or_text_offset,
            _ => INVALID_INDEX,
        }
    }

    /// Offset of a text position, [`INVALID_OFFSET`] otherwise
    pub fn text_offset(&self) -> i32 {
        match self.kind {
            PositionKind::Text => self.child_index_or_text_offset,
            _ => INVALID_OFFSET,
        }
    }

    pub fn affinity(&self) -> TextAffinity {
        self.affinity
    }

    pub fn is_null(&self) -> bool {
        self.kind == PositionKind::Null
    }

    pub fn is_tree_position(&self) -> bool {
        self.kind == PositionKind::Tree
    }

    pub fn is_text_position(&self) -> bool {
        self.kind == PositionKind::Text
    }

    /// Resolve the anchor node, if it still exists
    pub fn anchor<'a>(&self, trees: &'a dyn TreeLookup) -> Option<&'a Node> {
        if self.is_null() {
            return None;
        }
        trees.node(self.tree_id, self.anchor_id)
    }

    fn anchor_with_tree<'a>(&self, trees: &'a dyn TreeLookup) -> Option<(&'a Tree, &'a Node)> {
        if self.is_null() {
            return None;
        }
        let tree = trees.tree(self.tree_id)?;
        Some((tree, tree.get(self.anchor_id)?))
    }

    // === Structure ===

    /// Tree id and node id of the anchor's nth child. A node hosting a
    /// child tree has exactly one child: that tree's root.
    pub fn anchor_child(&self, trees: &dyn TreeLookup, index: i32) -> (TreeId, NodeId) {
        let Some(anchor) = self.anchor(trees) else {
            return (TreeId::UNKNOWN, NodeId::INVALID);
        };
        if let Some(child_tree) = trees.child_tree_of(anchor) {
            return match (index, child_tree.root_id()) {
                (0, Some(root)) => (child_tree.tree_id(), root),
                _ => (TreeId::UNKNOWN, NodeId::INVALID),
            };
        }
        usize::try_from(index)
            .ok()
            .and_then(|i| anchor.children().get(i))
            .map_or((TreeId::UNKNOWN, NodeId::INVALID), |&child| (self.tree_id, child))
    }

    pub fn anchor_child_count(&self, trees: &dyn TreeLookup) -> i32 {
        match self.anchor(trees) {
            Some(anchor) => child_anchors(trees, anchor).len() as i32,
            None => 0,
        }
    }

    /// Index of the anchor among its parent's children. The root of an
    /// embedded tree is child 0 of its host.
    pub fn anchor_index_in_parent(&self, trees: &dyn TreeLookup) -> i32 {
        match self.anchor(trees) {
            Some(anchor) => anchor.index_in_parent() as i32,
            None => INVALID_INDEX,
        }
    }

    /// Tree id and node id of the anchor's parent, crossing out of an
    /// embedded tree into its host
    pub fn anchor_parent(&self, trees: &dyn TreeLookup) -> (TreeId, NodeId) {
        match self.anchor(trees) {
            Some(anchor) => parent_anchor(trees, anchor),
            None => (TreeId::UNKNOWN, NodeId::INVALID),
        }
    }

    /// The anchor followed by all of its ancestors, across tree
    /// boundaries, ending with the outermost root
    pub fn ancestor_anchors(&self, trees: &dyn TreeLookup) -> Vec<(TreeId, NodeId)> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.anchor(trees);
        while let Some(node) = current {
            let key = (node.tree_id(), node.id());
            if !seen.insert(key) {
                tracing::warn!("Tree embedding cycle at node {} of {}", key.1, key.0);
                break;
            }
            ancestors.push(key);
            let (tree_id, parent_id) = parent_anchor(trees, node);
            current = trees.node(tree_id, parent_id);
        }
        ancestors
    }

    /// Position at the start of the anchor's nth child, of the same kind
    pub fn create_child_position_at(&self, trees: &dyn TreeLookup, index: i32) -> Self {
        let (tree_id, child_id) = self.anchor_child(trees, index);
        match self.kind {
            PositionKind::Null => Self::create_null_position(),
            PositionKind::Tree => Self::create_tree_position(tree_id, child_id, 0),
            PositionKind::Text => {
                Self::create_text_position(tree_id, child_id, 0, TextAffinity::Downstream)
            }
        }
    }

    /// Equivalent position on the anchor's parent. Text offsets are shifted
    /// by the text of the preceding siblings.
    pub fn create_parent_position(&self, trees: &dyn TreeLookup) -> Self {
        let Some(anchor) = self.anchor(trees) else {
            return Self::create_null_position();
        };
        let (tree_id, parent_id) = parent_anchor(trees, anchor);
        let Some(parent) = trees.node(tree_id, parent_id) else {
            return Self::create_null_position();
        };
        let same_tree = tree_id == self.tree_id;

        match self.kind {
            PositionKind::Null => Self::create_null_position(),
            PositionKind::Tree => {
                let index = if same_tree { anchor.index_in_parent() as i32 } else { 0 };
                Self::create_tree_position(tree_id, parent_id, index)
            }
            PositionKind::Text => {
                let mut offset = self.child_index_or_text_offset;
                if same_tree {
                    offset += parent
                        .children()
                        .iter()
                        .take(anchor.index_in_parent())
                        .filter_map(|&id| trees.node(tree_id, id))
                        .map(|sibling| text_length(trees, sibling))
                        .sum::<i32>();
                }
                Self::create_text_position(tree_id, parent_id, offset, self.affinity)
            }
        }
    }

    // === Text ===

    /// Text of the anchor and its whole subtree
    pub fn text(&self, trees: &dyn TreeLookup) -> String {
        let mut text = String::new();
        if let Some(anchor) = self.anchor(trees) {
            append_text(trees, anchor, &mut text);
        }
        text
    }

    /// Length of [`text`](Self::text), computed without building the string
    pub fn max_text_offset(&self, trees: &dyn TreeLookup) -> i32 {
        match self.anchor(trees) {
            Some(anchor) => text_length(trees, anchor),
            None => INVALID_OFFSET,
        }
    }

    /// Anchor is a childless object exposed as a single U+FFFC
    pub fn is_empty_object_replaced_by_character(&self, trees: &dyn TreeLookup) -> bool {
        self.anchor(trees)
            .map_or(false, |anchor| is_empty_object(trees, anchor))
    }

    pub fn is_in_line_break(&self, trees: &dyn TreeLookup) -> bool {
        self.anchor_with_tree(trees)
            .map_or(false, |(tree, anchor)| anchor.is_line_break(tree))
    }

    pub fn is_in_text_object(&self, trees: &dyn TreeLookup) -> bool {
        self.anchor(trees).map_or(false, Node::is_text)
    }

    /// Line break, or text made of whitespace only
    pub fn is_in_white_space(&self, trees: &dyn TreeLookup) -> bool {
        if self.anchor(trees).is_none() {
            return false;
        }
        self.is_in_line_break(trees) || self.text(trees).chars().all(char::is_whitespace)
    }

    pub fn is_in_line_breaking_object(&self, trees: &dyn TreeLookup) -> bool {
        self.anchor_with_tree(trees).map_or(false, |(tree, anchor)| {
            anchor.data().get_bool_attribute(BoolAttribute::IsLineBreakingObject)
                && !anchor.is_in_list_marker(tree)
        })
    }

    pub fn role(&self, trees: &dyn TreeLookup) -> Role {
        self.anchor(trees).map_or(Role::Unknown, Node::role)
    }

    /// Anchor styles, or the parent's when the anchor sets none
    pub fn text_styles(&self, trees: &dyn TreeLookup) -> TextStyles {
        let Some(anchor) = self.anchor(trees) else {
            return TextStyles::default();
        };
        let styles = anchor.data().text_styles();
        if !styles.is_unset() {
            return styles;
        }
        let (tree_id, parent_id) = parent_anchor(trees, anchor);
        trees
            .node(tree_id, parent_id)
            .map_or(styles, |parent| parent.data().text_styles())
    }

    pub fn word_start_offsets(&self, trees: &dyn TreeLookup) -> Vec<i32> {
        self.word_offsets(trees, IntListAttribute::WordStarts, |_| 0, 0)
    }

    pub fn word_end_offsets(&self, trees: &dyn TreeLookup) -> Vec<i32> {
        self.word_offsets(trees, IntListAttribute::WordEnds, |length| length, 1)
    }

    /// Precomputed word offsets; text with character offsets but no word
    /// data counts as one word
    fn word_offsets(
        &self,
        trees: &dyn TreeLookup,
        attr: IntListAttribute,
        whole_word: impl Fn(i32) -> i32,
        embedded: i32,
    ) -> Vec<i32> {
        let Some(anchor) = self.anchor(trees) else {
            return Vec::new();
        };
        if is_empty_object(trees, anchor) {
            return vec![embedded];
        }
        let offsets = anchor.data().get_int_list_attribute(attr);
        let has_characters = !anchor
            .data()
            .get_int_list_attribute(IntListAttribute::CharacterOffsets)
            .is_empty();
        if offsets.is_empty() && has_characters && !self.is_in_white_space(trees) {
            return vec![whole_word(text_length(trees, anchor))];
        }
        offsets.to_vec()
    }

    // === Line Links ===

    /// Node that follows `node_id` on the same line
    pub fn next_on_line_id(&self, trees: &dyn TreeLookup, node_id: NodeId) -> NodeId {
        self.line_link(trees, node_id, IntAttribute::NextOnLineId)
    }

    /// Node that precedes `node_id` on the same line
    pub fn previous_on_line_id(&self, trees: &dyn TreeLookup, node_id: NodeId) -> NodeId {
        self.line_link(trees, node_id, IntAttribute::PreviousOnLineId)
    }

    fn line_link(&self, trees: &dyn TreeLookup, node_id: NodeId, attr: IntAttribute) -> NodeId {
        if self.is_null() {
            return NodeId::INVALID;
        }
        trees
            .node(self.tree_id, node_id)
            .and_then(|node| node.data().try_get_int_attribute(attr))
            .map_or(NodeId::INVALID, NodeId)
    }
}

impl fmt::Display for NodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PositionKind::Null => write!(f, "NullPosition"),
            PositionKind::Tree => write!(
                f,
                "TreePosition {} anchor={} child_index={}",
                self.tree_id, self.anchor_id, self.child_index_or_text_offset
            ),
            PositionKind::Text => write!(
                f,
                "TextPosition {} anchor={} text_offset={} affinity={:?}",
                self.tree_id, self.anchor_id, self.child_index_or_text_offset, self.affinity
            ),
        }
    }
}

/// Children of a node, or the root of the tree it hosts
fn child_anchors<'a>(trees: &'a dyn TreeLookup, node: &Node) -> Vec<&'a Node> {
    if let Some(root) = trees.child_tree_of(node).and_then(Tree::root) {
        return vec![root];
    }
    node.children()
        .iter()
        .filter_map(|&id| trees.node(node.tree_id(), id))
        .collect()
}

fn parent_anchor(trees: &dyn TreeLookup, node: &Node) -> (TreeId, NodeId) {
    if let Some(parent) = node.parent_id() {
        return (node.tree_id(), parent);
    }
    trees
        .parent_host_of(node.tree_id())
        .unwrap_or((TreeId::UNKNOWN, NodeId::INVALID))
}

fn is_empty_object(trees: &dyn TreeLookup, node: &Node) -> bool {
    trees.embedded_object_behavior() == EmbeddedObjectBehavior::ExposeCharacter
        && !node.is_text()
        && child_anchors(trees, node).is_empty()
        && node.data().get_string_attribute(StringAttribute::Value).is_empty()
}

/// Leaf value, text node name, or the children's text in order
fn append_text(trees: &dyn TreeLookup, node: &Node, out: &mut String) {
    if is_empty_object(trees, node) {
        out.push(EMBEDDED_CHARACTER);
        return;
    }
    let children = child_anchors(trees, node);
    let value = node.data().try_get_string_attribute(StringAttribute::Value);
    match value {
        Some(value) if children.is_empty() && !value.is_empty() => out.push_str(value),
        _ if node.is_text() => out.push_str(node.name()),
        _ => {
            for child in children {
                append_text(trees, child, out);
            }
        }
    }
}

/// Mirrors [`append_text`], summing lengths instead of copying strings
fn text_length(trees: &dyn TreeLookup, node: &Node) -> i32 {
    if is_empty_object(trees, node) {
        return EMBEDDED_CHARACTER.len_utf16() as i32;
    }
    let children = child_anchors(trees, node);
    let value = node.data().try_get_string_attribute(StringAttribute::Value);
    match value {
        Some(value) if children.is_empty() && !value.is_empty() => utf16_len(value),
        _ if node.is_text() => utf16_len(node.name()),
        _ => children.into_iter().map(|child| text_length(trees, child)).sum(),
    }
}

fn utf16_len(s: &str) -> i32 {
    s.encode_utf16().count() as i32
}
