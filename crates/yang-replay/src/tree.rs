//! Mutable tree-grid abstraction and an in-memory implementation.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::types::{EditOp, NodeId, NodeType, TreeNode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown tree node {0}")]
    UnknownNode(NodeId),
    #[error("tree node {0} is not a list entry")]
    NotListEntry(NodeId),
    #[error("duplicate tree node {0}")]
    DuplicateNode(NodeId),
}

/// A tree-grid that replay plans can be applied to.
///
/// Node ids handed out stay valid across [`add_list_entry`](Self::add_list_entry).
pub trait ReplayTree {
    /// All nodes in document order.
    fn flatten(&self) -> Vec<TreeNode>;
    /// The node and its descendants in document order.
    fn flatten_subtree(&self, id: &NodeId) -> Result<Vec<TreeNode>, TreeError>;
    fn node(&self, id: &NodeId) -> Option<&TreeNode>;
    /// Adds a new, empty sibling of list entry `entry_id` and returns its id.
    fn add_list_entry(&mut self, entry_id: &NodeId) -> Result<NodeId, TreeError>;
    fn set_value(&mut self, id: &NodeId, value: &str) -> Result<(), TreeError>;
    fn set_edit_op(&mut self, id: &NodeId, op: EditOp) -> Result<(), TreeError>;
}

#[derive(Debug, Clone)]
struct MemNode {
    node: TreeNode,
    children: Vec<NodeId>,
    value: Option<String>,
    edit_op: Option<EditOp>,
}

/// A node together with what has been set on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    #[serde(flatten)]
    pub node: TreeNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "edit-op", skip_serializing_if = "Option::is_none")]
    pub edit_op: Option<EditOp>,
}

/// Arena-backed tree-grid.
///
/// New list entries are deep copies of the entry they are added next to,
/// with fresh numeric ids and no values.
#[derive(Debug, Clone, Default)]
pub struct MemTree {
    nodes: IndexMap<NodeId, MemNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl MemTree {
    /// Builds a tree from nodes in document order. Nodes whose parent is not
    /// in `nodes` become roots.
    pub fn from_flat(nodes: Vec<TreeNode>) -> Result<Self, TreeError> {
        let mut tree = MemTree::default();
        for node in nodes {
            let id = node.id.clone();
            if tree.nodes.contains_key(&id) {
                return Err(TreeError::DuplicateNode(id));
            }
            if let Ok(n) = id.as_str().parse::<u64>() {
                tree.next_id = tree.next_id.max(n.saturating_add(1));
            }
            match tree.nodes.get_mut(&node.parent_id) {
                Some(parent) => parent.children.push(id.clone()),
                None => tree.roots.push(id.clone()),
            }
            tree.nodes.insert(
                id,
                MemNode {
                    node,
                    children: Vec::new(),
                    value: None,
                    edit_op: None,
                },
            );
        }
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn value(&self, id: &NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.value.as_deref())
    }

    pub fn edit_op(&self, id: &NodeId) -> Option<EditOp> {
        self.nodes.get(id).and_then(|n| n.edit_op)
    }

    pub fn children(&self, id: &NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id).map(|n| n.children.as_slice())
    }

    /// All nodes in document order with their values and edit operations.
    pub fn snapshot(&self) -> Vec<NodeState> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.walk(root, &mut |n| {
                out.push(NodeState {
                    node: n.node.clone(),
                    value: n.value.clone(),
                    edit_op: n.edit_op,
                })
            });
        }
        out
    }

    fn walk(&self, id: &NodeId, visit: &mut impl FnMut(&MemNode)) {
        let Some(n) = self.nodes.get(id) else {
            return;
        };
        visit(n);
        for child in &n.children {
            self.walk(child, visit);
        }
    }

    fn get_mut(&mut self, id: &NodeId) -> Result<&mut MemNode, TreeError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::new(self.next_id.to_string());
            // Past the largest id, free ids are searched from zero.
            self.next_id = self.next_id.wrapping_add(1);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn copy_subtree(&mut self, id: &NodeId, parent: NodeId) -> Result<NodeId, TreeError> {
        let source = self
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))?;
        let new_id = self.fresh_id();
        let mut node = source.node;
        node.id = new_id.clone();
        node.parent_id = parent;
        self.nodes.insert(
            new_id.clone(),
            MemNode {
                node,
                children: Vec::new(),
                value: None,
                edit_op: None,
            },
        );
        for child in &source.children {
            let child_id = self.copy_subtree(child, new_id.clone())?;
            self.get_mut(&new_id)?.children.push(child_id);
        }
        Ok(new_id)
    }
}

impl ReplayTree for MemTree {
    fn flatten(&self) -> Vec<TreeNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.walk(root, &mut |n| out.push(n.node.clone()));
        }
        out
    }

    fn flatten_subtree(&self, id: &NodeId) -> Result<Vec<TreeNode>, TreeError> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::UnknownNode(id.clone()));
        }
        let mut out = Vec::new();
        self.walk(id, &mut |n| out.push(n.node.clone()));
        Ok(out)
    }

    fn node(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.get(id).map(|n| &n.node)
    }

    fn add_list_entry(&mut self, entry_id: &NodeId) -> Result<NodeId, TreeError> {
        let entry = self
            .nodes
            .get(entry_id)
            .ok_or_else(|| TreeError::UnknownNode(entry_id.clone()))?;
        if entry.node.node_type != NodeType::List {
            return Err(TreeError::NotListEntry(entry_id.clone()));
        }
        let parent = entry.node.parent_id.clone();
        let text = entry.node.text.clone();

        let new_id = self.copy_subtree(entry_id, parent.clone())?;

        let siblings = match self.nodes.get(&parent) {
            Some(p) => &p.children,
            None => &self.roots,
        };
        // After the last entry of the same list.
        let at = siblings
            .iter()
            .rposition(|id| self.nodes.get(id).is_some_and(|n| n.node.text == text))
            .map_or(siblings.len(), |pos| pos + 1);
        match self.nodes.get_mut(&parent) {
            Some(p) => p.children.insert(at, new_id.clone()),
            None => self.roots.insert(at, new_id.clone()),
        }
        Ok(new_id)
    }

    fn set_value(&mut self, id: &NodeId, value: &str) -> Result<(), TreeError> {
        self.get_mut(id)?.value = Some(value.to_string());
        Ok(())
    }

    fn set_edit_op(&mut self, id: &NodeId, op: EditOp) -> Result<(), TreeError> {
        self.get_mut(id)?.edit_op = Some(op);
        Ok(())
    }
}
