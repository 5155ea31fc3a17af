use serde_json::json;
use yang_replay::{
    apply_plan, reconstruct_replay, resolve_xpath, tree_from_jstree_json, EditOp, MemTree,
    NodeId, NodeType, ReplayConfigEntry, ReplayTree, TreeNode,
};

fn jstree_iface() -> MemTree {
    let nodes = tree_from_jstree_json(&json!([
        {"id": "1", "parent": "#", "text": "root", "data": {}},
        {"id": "2", "parent": "1", "text": "m", "data": {"nodetype": "module"}},
        {"id": "3", "parent": "2", "text": "system", "data": {"nodetype": "container", "xpath_pfx": "/m:system", "prefix": "m"}},
        {"id": "4", "parent": "3", "text": "mode", "data": {"nodetype": "choice", "xpath_pfx": "/m:system", "prefix": "m"}},
        {"id": "5", "parent": "4", "text": "static", "data": {"nodetype": "case", "xpath_pfx": "/m:system", "prefix": "m"}},
        {"id": "6", "parent": "5", "text": "addr", "data": {"nodetype": "leaf", "xpath_pfx": "/m:system/m:addr", "prefix": "m"}},
        {"id": "7", "parent": "2", "text": "iface", "data": {"nodetype": "list", "xpath_pfx": "/m:iface", "prefix": "m"}},
        {"id": "8", "parent": "7", "text": "name", "data": {"nodetype": "leaf", "xpath_pfx": "/m:iface", "prefix": "m", "key": "true"}},
        {"id": "9", "parent": "7", "text": "mtu", "data": {"nodetype": "leaf", "xpath_pfx": "/m:iface/m:mtu", "prefix": "m"}},
        {"id": "10", "parent": "2", "text": "hostname", "data": {"nodetype": "leaf", "xpath_pfx": "/m:hostname", "prefix": "m"}}
    ]))
    .unwrap();
    MemTree::from_flat(nodes).unwrap()
}

fn mtu(name: &str, value: &str) -> ReplayConfigEntry {
    ReplayConfigEntry::new(format!(r#"/m:iface[name="{name}"]/m:mtu"#)).with_value(value)
}

fn values(tree: &MemTree) -> Vec<(String, String, Option<String>)> {
    tree.snapshot()
        .into_iter()
        .filter(|s| s.value.is_some() || s.edit_op.is_some())
        .map(|s| {
            (
                s.node.id.to_string(),
                s.value.unwrap_or_default(),
                s.edit_op.map(|op| op.to_string()),
            )
        })
        .collect()
}

fn row(id: &str, value: &str, op: Option<&str>) -> (String, String, Option<String>) {
    (id.to_string(), value.to_string(), op.map(str::to_string))
}

#[test]
fn end_to_end_iface_mtu() {
    let mut tree = jstree_iface();
    let replay = vec![mtu("eth0", "1500"), mtu("eth1", "9000")];
    let plan = reconstruct_replay(&tree.flatten(), &replay);
    let report = apply_plan(&mut tree, &plan).unwrap();

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.created_entries, vec![NodeId::from("11")]);
    assert_eq!(report.assigned, 4);
    assert_eq!(
        values(&tree),
        vec![
            row("8", "eth0", None),
            row("9", "1500", None),
            row("12", "eth1", None),
            row("13", "9000", None),
        ]
    );

    let flat = tree.flatten();
    let order: Vec<&str> = flat.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        order,
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "11", "12", "13", "10"]
    );
}

#[test]
fn new_entries_are_resolvable_after_apply() {
    let mut tree = jstree_iface();
    let plan = reconstruct_replay(&tree.flatten(), &[mtu("eth0", "1"), mtu("eth1", "2")]);
    apply_plan(&mut tree, &plan).unwrap();

    let flat = tree.flatten();
    let mut used = std::collections::HashSet::new();
    let first = resolve_xpath(&flat, "/m:iface/m:mtu", &used).unwrap().id.clone();
    used.insert(first.clone());
    let second = resolve_xpath(&flat, "/m:iface/m:mtu", &used).unwrap().id.clone();
    assert_eq!((first.as_str(), second.as_str()), ("9", "13"));
}

#[test]
fn edit_ops_land_on_entries_and_leaves() {
    let mut tree = jstree_iface();
    let replay = vec![
        ReplayConfigEntry::new("/m:system/m:addr").with_value("10.0.0.1").with_edit_op(EditOp::Replace),
        ReplayConfigEntry::new(r#"/m:iface[name="eth0"]"#).with_edit_op(EditOp::Merge),
        ReplayConfigEntry::new(r#"/m:iface[name="eth1"]/m:name"#)
            .with_value("eth1")
            .with_edit_op(EditOp::Create),
        ReplayConfigEntry::new(r#"/m:iface[name="eth1"]/m:mtu"#).with_edit_op(EditOp::Remove),
    ];
    let plan = reconstruct_replay(&tree.flatten(), &replay);
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    let report = apply_plan(&mut tree, &plan).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    assert_eq!(
        values(&tree),
        vec![
            row("6", "10.0.0.1", Some("replace")),
            row("7", "", Some("merge")),
            row("8", "eth0", None),
            row("11", "", Some("create")),
            row("12", "eth1", None),
            row("13", "", Some("remove")),
        ]
    );
}

#[test]
fn stale_plan_items_are_warnings() {
    let mut tree = jstree_iface();
    let plan = reconstruct_replay(&tree.flatten(), &[mtu("eth0", "1"), mtu("eth1", "2")]);

    let mut other = MemTree::from_flat(tree.flatten_subtree(&NodeId::from("1")).unwrap()).unwrap();
    let mut drifted = plan.clone();
    drifted
        .value_assignments
        .insert("404".into(), ReplayConfigEntry::new("/m:gone").with_value("x"));
    let report = apply_plan(&mut other, &drifted).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.created_entries.len(), 1);

    let report = apply_plan(&mut tree, &plan).unwrap();
    assert!(report.warnings.is_empty());
}

fn route_tree() -> MemTree {
    MemTree::from_flat(vec![
        TreeNode::new("1", "#", "root", NodeType::Other, ""),
        TreeNode::new("2", "1", "m", NodeType::Module, ""),
        TreeNode::new("3", "2", "route", NodeType::List, "/m:route").with_prefix("m"),
        TreeNode::new("4", "3", "dest", NodeType::Leaf, "/m:route").with_prefix("m").key(),
        TreeNode::new("5", "3", "hop", NodeType::Leaf, "/m:route").with_prefix("m").key(),
        TreeNode::new("6", "3", "metric", NodeType::Leaf, "/m:route/m:metric").with_prefix("m"),
    ])
    .unwrap()
}

fn metric(dest: &str, hop: &str, value: &str) -> ReplayConfigEntry {
    ReplayConfigEntry::new(format!(r#"/m:route[dest="{dest}"][hop="{hop}"]/m:metric"#))
        .with_value(value)
}

fn apply_routes(replay: &[ReplayConfigEntry]) -> (MemTree, Vec<NodeId>) {
    let mut tree = route_tree();
    let plan = reconstruct_replay(&tree.flatten(), replay);
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    let report = apply_plan(&mut tree, &plan).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    (tree, report.created_entries)
}

#[test]
fn shared_key_is_set_in_every_new_entry() {
    let (tree, created) = apply_routes(&[
        metric("a", "1", "10"),
        metric("a", "2", "20"),
        metric("a", "3", "30"),
    ]);
    assert_eq!(created, vec![NodeId::from("7"), NodeId::from("11")]);
    assert_eq!(
        values(&tree),
        vec![
            row("4", "a", None),
            row("5", "1", None),
            row("6", "10", None),
            row("8", "a", None),
            row("9", "2", None),
            row("10", "20", None),
            row("12", "a", None),
            row("13", "3", None),
            row("14", "30", None),
        ]
    );
}

#[test]
fn each_key_tuple_gets_its_own_entry() {
    let (tree, created) = apply_routes(&[
        metric("a", "1", "10"),
        metric("b", "1", "20"),
        metric("b", "2", "30"),
    ]);
    assert_eq!(created.len(), 2);
    assert_eq!(
        values(&tree),
        vec![
            row("4", "a", None),
            row("5", "1", None),
            row("6", "10", None),
            row("8", "b", None),
            row("9", "1", None),
            row("10", "20", None),
            row("12", "b", None),
            row("13", "2", None),
            row("14", "30", None),
        ]
    );

    let flat = tree.flatten();
    let order: Vec<&str> = flat.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        order,
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14"]
    );
}

#[test]
fn nested_multi_key_entries_open_per_tuple() {
    let mut tree = MemTree::from_flat(vec![
        TreeNode::new("1", "#", "root", NodeType::Other, ""),
        TreeNode::new("2", "1", "m", NodeType::Module, ""),
        TreeNode::new("3", "2", "vrf", NodeType::List, "/m:vrf").with_prefix("m"),
        TreeNode::new("4", "3", "name", NodeType::Leaf, "/m:vrf").with_prefix("m").key(),
        TreeNode::new("5", "3", "route", NodeType::List, "/m:vrf/m:route").with_prefix("m"),
        TreeNode::new("6", "5", "dest", NodeType::Leaf, "/m:vrf/m:route").with_prefix("m").key(),
        TreeNode::new("7", "5", "hop", NodeType::Leaf, "/m:vrf/m:route").with_prefix("m").key(),
    ])
    .unwrap();
    let route = |vrf: &str, dest: &str, hop: &str| {
        ReplayConfigEntry::new(format!(
            r#"/m:vrf[name="{vrf}"]/m:route[dest="{dest}"][hop="{hop}"]"#
        ))
        .with_edit_op(EditOp::Create)
    };
    let replay = vec![route("a", "x", "1"), route("b", "x", "1"), route("b", "x", "2")];
    let plan = reconstruct_replay(&tree.flatten(), &replay);
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    let report = apply_plan(&mut tree, &plan).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.created_entries, vec![NodeId::from("8"), NodeId::from("13")]);

    assert_eq!(
        values(&tree),
        vec![
            row("4", "a", None),
            row("5", "", Some("create")),
            row("6", "x", None),
            row("7", "1", None),
            row("9", "b", None),
            row("10", "", Some("create")),
            row("11", "x", None),
            row("12", "1", None),
            row("13", "", Some("create")),
            row("14", "x", None),
            row("15", "2", None),
        ]
    );
}
