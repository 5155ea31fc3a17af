//! Tree and replay data shapes.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a tree-grid node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Id returned by the resolver when nothing matched (the tree-grid root).
    pub const NOT_FOUND: &'static str = "1";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn not_found() -> Self {
        Self(Self::NOT_FOUND.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.0 == Self::NOT_FOUND
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// YANG statement kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Module,
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    #[default]
    #[serde(other)]
    Other,
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        match s {
            "module" => NodeType::Module,
            "container" => NodeType::Container,
            "list" => NodeType::List,
            "leaf" => NodeType::Leaf,
            "leaf-list" | "leaflist" => NodeType::LeafList,
            "choice" => NodeType::Choice,
            "case" => NodeType::Case,
            _ => NodeType::Other,
        }
    }
}

/// NETCONF `edit-config` operation attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOp {
    Merge,
    Delete,
    Replace,
    Create,
    Remove,
}

impl EditOp {
    pub fn as_str(self) -> &'static str {
        match self {
            EditOp::Merge => "merge",
            EditOp::Delete => "delete",
            EditOp::Replace => "replace",
            EditOp::Create => "create",
            EditOp::Remove => "remove",
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown edit operation: {0}")]
pub struct UnknownEditOp(pub String);

impl FromStr for EditOp {
    type Err = UnknownEditOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "merge" => Ok(EditOp::Merge),
            "delete" => Ok(EditOp::Delete),
            "replace" => Ok(EditOp::Replace),
            "create" => Ok(EditOp::Create),
            "remove" => Ok(EditOp::Remove),
            other => Err(UnknownEditOp(other.to_string())),
        }
    }
}

/// One node of a flattened tree-grid, in document order.
///
/// `xpath_prefix` is the node's XPath as currently rendered, list predicates
/// included. Key leaves may carry the XPath of their list instead of their
/// own; see [`effective_xpath`](crate::effective_xpath).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub parent_id: NodeId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_prefix: Option<String>,
    #[serde(default)]
    pub xpath_prefix: String,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub is_key: bool,
}

impl TreeNode {
    pub fn new(
        id: impl Into<NodeId>,
        parent_id: impl Into<NodeId>,
        text: impl Into<String>,
        node_type: NodeType,
        xpath_prefix: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            text: text.into(),
            namespace_prefix: None,
            xpath_prefix: xpath_prefix.into(),
            node_type,
            is_key: false,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = Some(prefix.into());
        self
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }
}

/// One recorded configuration edit.
///
/// Field names follow the recorded replay JSON: `xpath`, `value`,
/// `edit-op` and `nodetype`. An empty `edit-op` means no operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfigEntry {
    pub xpath: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "value_as_string"
    )]
    pub value: Option<String>,
    #[serde(
        rename = "edit-op",
        alias = "editOp",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_edit_op"
    )]
    pub edit_op: Option<EditOp>,
    #[serde(
        rename = "nodetype",
        alias = "nodeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<String>,
}

impl ReplayConfigEntry {
    pub fn new(xpath: impl Into<String>) -> Self {
        Self {
            xpath: xpath.into(),
            value: None,
            edit_op: None,
            node_type: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_edit_op(mut self, op: EditOp) -> Self {
        self.edit_op = Some(op);
        self
    }

    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }
}

fn value_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn optional_edit_op<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<EditOp>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}
