//! Node Data and Tree Updates
//!
//! Plain, serializable snapshots of accessibility nodes and the atomic
//! update batches that carry them into a [`Tree`](crate::Tree).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attributes::{BoolAttribute, IntAttribute, IntListAttribute, StringAttribute, TextStyles};
use crate::{AxResult, NodeId, Role, TreeId};

/// Attribute snapshot of one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    pub id: NodeId,
    pub role: Role,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub string_attributes: BTreeMap<StringAttribute, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bool_attributes: BTreeMap<BoolAttribute, bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub int_attributes: BTreeMap<IntAttribute, i32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub int_list_attributes: BTreeMap<IntListAttribute, Vec<i32>>,
    /// Tree embedded at this node (iframes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_tree_id: Option<TreeId>,
}

impl NodeData {
    pub fn new(id: i32, role: Role) -> Self {
        Self {
            id: NodeId(id),
            role,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_children(mut self, ids: &[i32]) -> Self {
        self.child_ids = ids.iter().copied().map(NodeId).collect();
        self
    }

    pub fn with_string(mut self, attr: StringAttribute, value: impl Into<String>) -> Self {
        self.add_string_attribute(attr, value);
        self
    }

    pub fn with_bool(mut self, attr: BoolAttribute, value: bool) -> Self {
        self.add_bool_attribute(attr, value);
        self
    }

    pub fn with_int(mut self, attr: IntAttribute, value: i32) -> Self {
        self.add_int_attribute(attr, value);
        self
    }

    pub fn with_int_list(mut self, attr: IntListAttribute, value: Vec<i32>) -> Self {
        self.add_int_list_attribute(attr, value);
        self
    }

    pub fn with_child_tree(mut self, tree_id: TreeId) -> Self {
        self.child_tree_id = Some(tree_id);
        self
    }

    /// Set accessible name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.add_string_attribute(StringAttribute::Name, name);
    }

    pub fn add_string_attribute(&mut self, attr: StringAttribute, value: impl Into<String>) {
        self.string_attributes.insert(attr, value.into());
    }

    pub fn add_bool_attribute(&mut self, attr: BoolAttribute, value: bool) {
        self.bool_attributes.insert(attr, value);
    }

    pub fn add_int_attribute(&mut self, attr: IntAttribute, value: i32) {
        self.int_attributes.insert(attr, value);
    }

    pub fn add_int_list_attribute(&mut self, attr: IntListAttribute, value: Vec<i32>) {
        self.int_list_attributes.insert(attr, value);
    }

    pub fn remove_string_attribute(&mut self, attr: StringAttribute) {
        self.string_attributes.remove(&attr);
    }

    pub fn has_string_attribute(&self, attr: StringAttribute) -> bool {
        self.string_attributes.contains_key(&attr)
    }

    /// Value of a string attribute, or "" when absent
    pub fn get_string_attribute(&self, attr: StringAttribute) -> &str {
        self.try_get_string_attribute(attr).unwrap_or("")
    }

    pub fn try_get_string_attribute(&self, attr: StringAttribute) -> Option<&str> {
        self.string_attributes.get(&attr).map(String::as_str)
    }

    pub fn has_bool_attribute(&self, attr: BoolAttribute) -> bool {
        self.bool_attributes.contains_key(&attr)
    }

    /// Value of a bool attribute, or false when absent
    pub fn get_bool_attribute(&self, attr: BoolAttribute) -> bool {
        self.bool_attributes.get(&attr).copied().unwrap_or(false)
    }

    pub fn has_int_attribute(&self, attr: IntAttribute) -> bool {
        self.int_attributes.contains_key(&attr)
    }

    /// Value of an int attribute, or 0 when absent
    pub fn get_int_attribute(&self, attr: IntAttribute) -> i32 {
        self.try_get_int_attribute(attr).unwrap_or(0)
    }

    pub fn try_get_int_attribute(&self, attr: IntAttribute) -> Option<i32> {
        self.int_attributes.get(&attr).copied()
    }

    pub fn has_int_list_attribute(&self, attr: IntListAttribute) -> bool {
        self.int_list_attributes.contains_key(&attr)
    }

    /// Value of an int list attribute, or an empty slice when absent
    pub fn get_int_list_attribute(&self, attr: IntListAttribute) -> &[i32] {
        self.int_list_attributes.get(&attr).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn name(&self) -> &str {
        self.get_string_attribute(StringAttribute::Name)
    }

    pub fn text_styles(&self) -> TextStyles {
        TextStyles {
            color: self.try_get_int_attribute(IntAttribute::Color),
            background_color: self.try_get_int_attribute(IntAttribute::BackgroundColor),
            text_style: self.try_get_int_attribute(IntAttribute::TextStyle),
            font_weight: self.try_get_int_attribute(IntAttribute::FontWeight),
            font_family: self
                .try_get_string_attribute(StringAttribute::FontFamily)
                .map(str::to_string),
        }
    }
}

/// Tree-wide data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeData {
    pub tree_id: TreeId,
    /// Tree hosting this one, for embedded frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_tree_id: Option<TreeId>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
}

/// One atomic batch of node additions, removals and changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeUpdate {
    /// New root, if the root changes (required for the first update)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<NodeId>,
    /// Node whose descendants are discarded before the update is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id_to_clear: Option<NodeId>,
    pub nodes: Vec<NodeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_data: Option<TreeData>,
}

impl TreeUpdate {
    pub fn new(root_id: i32, nodes: Vec<NodeData>) -> Self {
        Self {
            root_id: Some(NodeId(root_id)),
            nodes,
            ..Default::default()
        }
    }

    /// Parse an update from JSON
    pub fn from_json(json: &str) -> AxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the update to pretty-printed JSON
    pub fn to_json(&self) -> AxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Mutable access to the node with the given id, if the update carries it
    pub fn node_mut(&mut self, id: i32) -> Option<&mut NodeData> {
        self.nodes.iter_mut().find(|n| n.id == NodeId(id))
    }
}
