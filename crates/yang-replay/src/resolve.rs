//! Resolution of XPaths to tree-grid nodes.

use std::collections::HashSet;

use tracing::trace;
use yang_xpath::{append_step, local_name, strip_predicates, xpath_steps};

use crate::types::{NodeId, NodeType, TreeNode};

/// The structural XPath of a node: its `xpath_prefix` with predicates
/// stripped, plus `/prefix:text` for key leaves whose prefix is the XPath of
/// their list.
pub fn effective_xpath(node: &TreeNode) -> String {
    let mut xpath = strip_predicates(&node.xpath_prefix);
    let names_self = xpath_steps(&xpath)
        .last()
        .is_some_and(|step| local_name(step) == node.text);
    if node.is_key && (!names_self || node.xpath_prefix.ends_with(']')) {
        append_step(&mut xpath, node.namespace_prefix.as_deref(), &node.text);
    }
    xpath
}

fn matches_step(node: &TreeNode, step: &str, local: &str) -> bool {
    node.node_type != NodeType::Case && (node.text == step || node.text == local)
}

/// Walks `path_steps` through `flat_tree` and returns the node of the last
/// step.
///
/// Each step is looked up from the node matched by the previous step onward.
/// Nodes in `already_used` are skipped for the final step only, so sibling
/// list entries with identical content bind to distinct nodes. Every step has
/// to match; a step with no node means the path is not in the tree.
pub fn find_node<'a, S: AsRef<str>>(
    flat_tree: &'a [TreeNode],
    path_steps: &[S],
    already_used: &HashSet<NodeId>,
) -> Option<&'a TreeNode> {
    let steps: Vec<&str> = path_steps
        .iter()
        .map(AsRef::as_ref)
        .filter(|step| !step.is_empty())
        .collect();

    let mut view = flat_tree;
    let mut found = None;
    let mut xpath_so_far = String::new();
    for (i, step) in steps.iter().enumerate() {
        xpath_so_far.push('/');
        xpath_so_far.push_str(step);
        let local = local_name(step);
        let binding = i + 1 == steps.len();
        let Some(pos) = view.iter().position(|node| {
            matches_step(node, step, local)
                && !(binding && already_used.contains(&node.id))
                && effective_xpath(node) == xpath_so_far
        }) else {
            trace!(step = %step, xpath = %xpath_so_far, "no tree node for step");
            return None;
        };
        trace!(step = %step, node = %view[pos].id, "matched step");
        found = Some(&view[pos]);
        view = &view[pos..];
    }
    found
}

/// Like [`find_node`], returning the node id or the
/// [not-found sentinel](NodeId::not_found).
pub fn resolve_node_id<S: AsRef<str>>(
    flat_tree: &[TreeNode],
    path_steps: &[S],
    already_used: &HashSet<NodeId>,
) -> NodeId {
    find_node(flat_tree, path_steps, already_used)
        .map(|node| node.id.clone())
        .unwrap_or_else(NodeId::not_found)
}

/// Resolves a full XPath, predicates included.
pub fn resolve_xpath<'a>(
    flat_tree: &'a [TreeNode],
    xpath: &str,
    already_used: &HashSet<NodeId>,
) -> Option<&'a TreeNode> {
    let stripped = strip_predicates(xpath);
    find_node(flat_tree, &xpath_steps(&stripped), already_used)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<TreeNode> {
        vec![
            TreeNode::new("1", "#", "root", NodeType::Other, ""),
            TreeNode::new("2", "1", "m", NodeType::Module, ""),
            TreeNode::new("3", "2", "system", NodeType::Container, "/m:system").with_prefix("m"),
            TreeNode::new("4", "3", "mode", NodeType::Choice, "/m:system").with_prefix("m"),
            TreeNode::new("5", "4", "static", NodeType::Case, "/m:system").with_prefix("m"),
            TreeNode::new("6", "5", "addr", NodeType::Leaf, "/m:system/m:addr").with_prefix("m"),
            TreeNode::new("7", "3", "server", NodeType::List, "/m:system/m:server").with_prefix("m"),
            TreeNode::new("8", "7", "name", NodeType::Leaf, "/m:system/m:server")
                .with_prefix("m")
                .key(),
            TreeNode::new("9", "7", "port", NodeType::Leaf, "/m:system/m:server/m:port")
                .with_prefix("m"),
        ]
    }

    #[test]
    fn effective_xpath_of_key_leaf() {
        let nodes = tree();
        assert_eq!(effective_xpath(&nodes[7]), "/m:system/m:server/m:name");
        assert_eq!(effective_xpath(&nodes[8]), "/m:system/m:server/m:port");

        let rendered = TreeNode::new("8", "7", "name", NodeType::Leaf, "/m:server[name='a']")
            .with_prefix("m")
            .key();
        assert_eq!(effective_xpath(&rendered), "/m:server/m:name");
    }

    #[test]
    fn key_named_like_the_end_of_its_list() {
        let key = TreeNode::new("4", "3", "name", NodeType::Leaf, "/m:user-name")
            .with_prefix("m")
            .key();
        assert_eq!(effective_xpath(&key), "/m:user-name/m:name");

        let own = TreeNode::new("4", "3", "name", NodeType::Leaf, "/m:user-name/m:name")
            .with_prefix("m")
            .key();
        assert_eq!(effective_xpath(&own), "/m:user-name/m:name");

        let nodes = vec![
            TreeNode::new("2", "1", "m", NodeType::Module, ""),
            TreeNode::new("3", "2", "user-name", NodeType::List, "/m:user-name").with_prefix("m"),
            key,
        ];
        let id = resolve_node_id(&nodes, &["", "m:user-name", "m:name"], &HashSet::new());
        assert_eq!(id, NodeId::from("4"));
    }

    #[test]
    fn resolves_through_case_transparently() {
        let nodes = tree();
        let id = resolve_node_id(&nodes, &["", "m:system", "m:addr"], &HashSet::new());
        assert_eq!(id, NodeId::from("6"));
    }

    #[test]
    fn case_nodes_are_never_matched() {
        let nodes = tree();
        let id = resolve_node_id(&nodes, &["m:system", "m:static"], &HashSet::new());
        assert!(id.is_not_found());
    }

    #[test]
    fn resolves_key_leaf() {
        let nodes = tree();
        let node = resolve_xpath(&nodes, r#"/m:system/m:server[name="a"]/m:name"#, &HashSet::new());
        assert_eq!(node.map(|n| n.id.as_str()), Some("8"));
    }

    #[test]
    fn unprefixed_text_matches_prefixed_step() {
        let nodes = tree();
        let id = resolve_node_id(&nodes, &["m:system", "m:server", "m:port"], &HashSet::new());
        assert_eq!(id.as_str(), "9");
    }

    #[test]
    fn missing_step_is_not_found() {
        let nodes = tree();
        assert!(resolve_node_id(&nodes, &["m:system", "m:bogus"], &HashSet::new()).is_not_found());
        assert!(resolve_node_id(&nodes, &["x:other"], &HashSet::new()).is_not_found());
        assert!(resolve_node_id::<&str>(&nodes, &[], &HashSet::new()).is_not_found());
    }

    #[test]
    fn used_nodes_are_skipped_only_for_the_final_step() {
        let nodes = tree();
        let mut used = HashSet::new();
        used.insert(NodeId::from("7"));
        let id = resolve_node_id(&nodes, &["m:system", "m:server", "m:port"], &used);
        assert_eq!(id.as_str(), "9");
        assert!(resolve_node_id(&nodes, &["m:system", "m:server"], &used).is_not_found());
    }
}
