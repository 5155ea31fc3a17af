//! Reading tree-grids exported by jstree.
//!
//! `get_json(node, {flat: true})` yields an array of objects with `id`,
//! `parent`, `text` and a `data` object carrying the YANG details
//! (`nodetype`, `xpath_pfx`, `prefix`, `key`).

use serde_json::Value;

use crate::task::ReplayError;
use crate::types::{NodeId, NodeType, TreeNode};

/// Converts a jstree flat export into tree nodes, keeping document order.
pub fn tree_from_jstree_json(json: &Value) -> Result<Vec<TreeNode>, ReplayError> {
    let Value::Array(items) = json else {
        return Err(ReplayError::InvalidTree("expected an array of nodes".into()));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| jstree_node(index, item))
        .collect()
}

/// Reads a tree given either as jstree flat JSON or as serialized
/// [`TreeNode`]s.
pub fn parse_tree(json: Value) -> Result<Vec<TreeNode>, ReplayError> {
    let is_jstree = match &json {
        Value::Array(items) => items
            .first()
            .is_some_and(|first| first.get("parent").is_some() || first.get("data").is_some()),
        _ => false,
    };
    if is_jstree {
        tree_from_jstree_json(&json)
    } else {
        Ok(serde_json::from_value(json)?)
    }
}

fn jstree_node(index: usize, item: &Value) -> Result<TreeNode, ReplayError> {
    let id = id_field(item, "id").ok_or_else(|| missing(index, "id"))?;
    let parent = id_field(item, "parent").unwrap_or_else(|| NodeId::from("#"));
    let text = item
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| missing(index, "text"))?;
    let data = item.get("data");

    let mut node = TreeNode::new(
        id,
        parent,
        text,
        data_str(data, "nodetype").map(NodeType::from).unwrap_or_default(),
        data_str(data, "xpath_pfx").unwrap_or_default(),
    );
    node.namespace_prefix = data_str(data, "prefix")
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string);
    node.is_key = match data.and_then(|d| d.get("key")) {
        Some(Value::Bool(key)) => *key,
        Some(Value::String(key)) => key == "true",
        _ => false,
    };
    Ok(node)
}

fn data_str<'a>(data: Option<&'a Value>, field: &str) -> Option<&'a str> {
    data?.get(field)?.as_str()
}

fn id_field(item: &Value, field: &str) -> Option<NodeId> {
    match item.get(field)? {
        Value::String(id) => Some(NodeId::new(id.as_str())),
        Value::Number(id) => Some(NodeId::new(id.to_string())),
        _ => None,
    }
}

fn missing(index: usize, field: &str) -> ReplayError {
    ReplayError::InvalidTree(format!("node {index} has no {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_flat_export() {
        let tree = tree_from_jstree_json(&json!([
            {"id": 1, "parent": "#", "text": "root", "data": {}},
            {"id": "2", "parent": "1", "text": "m", "data": {"nodetype": "module"}},
            {"id": "3", "parent": "2", "text": "name", "data": {
                "nodetype": "leaf", "xpath_pfx": "/m:iface", "prefix": "m", "key": "true"
            }},
            {"id": "4", "parent": "2", "text": "up", "data": {"nodetype": "leaf", "key": false}},
        ]))
        .unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree[0].id.as_str(), "1");
        assert_eq!(tree[0].node_type, NodeType::Other);
        assert_eq!(tree[1].node_type, NodeType::Module);
        assert!(tree[2].is_key);
        assert_eq!(tree[2].namespace_prefix.as_deref(), Some("m"));
        assert_eq!(tree[2].xpath_prefix, "/m:iface");
        assert!(!tree[3].is_key);
        assert_eq!(tree[3].namespace_prefix, None);
    }

    #[test]
    fn rejects_nodes_without_id() {
        let err = tree_from_jstree_json(&json!([{"text": "x"}])).unwrap_err();
        assert_eq!(err.to_string(), "invalid tree JSON: node 0 has no id");
        assert!(tree_from_jstree_json(&json!({"id": 1})).is_err());
    }

    #[test]
    fn detects_format() {
        let native = parse_tree(json!([
            {"id": "2", "parentId": "1", "text": "m", "nodeType": "module"}
        ]))
        .unwrap();
        assert_eq!(native[0].node_type, NodeType::Module);

        let exported = parse_tree(json!([
            {"id": "2", "parent": "1", "text": "m", "data": {"nodetype": "module"}}
        ]))
        .unwrap();
        assert_eq!(exported, native);
        assert!(parse_tree(json!([])).unwrap().is_empty());
    }
}
