//! Replaying recorded NETCONF configurations onto a YANG tree-grid.
//!
//! A replay is a list of config entries, each an XPath such as
//! `/m:iface[name="eth1"]/m:mtu` with a value and an optional edit operation.
//! The tree-grid renders one entry per list; replaying means binding the
//! first key values to those entries, creating sibling entries for further
//! key values and putting every value on its node.
//!
//! Planning is pure: [`reconstruct_replay`] reads a flattened tree and
//! produces a [`ReplayPlan`]. [`apply_plan`] carries a plan out on anything
//! implementing [`ReplayTree`], such as the in-memory [`MemTree`].
//!
//! # Example
//!
//! ```
//! use yang_replay::{
//!     apply_plan, reconstruct_replay, MemTree, NodeId, NodeType, ReplayConfigEntry, ReplayTree,
//!     TreeNode,
//! };
//!
//! let nodes = vec![
//!     TreeNode::new("2", "1", "m", NodeType::Module, ""),
//!     TreeNode::new("3", "2", "iface", NodeType::List, "/m:iface").with_prefix("m"),
//!     TreeNode::new("4", "3", "name", NodeType::Leaf, "/m:iface").with_prefix("m").key(),
//!     TreeNode::new("5", "3", "mtu", NodeType::Leaf, "/m:iface/m:mtu").with_prefix("m"),
//! ];
//! let replay = vec![
//!     ReplayConfigEntry::new(r#"/m:iface[name="eth0"]/m:mtu"#).with_value("1500"),
//!     ReplayConfigEntry::new(r#"/m:iface[name="eth1"]/m:mtu"#).with_value("9000"),
//! ];
//!
//! let plan = reconstruct_replay(&nodes, &replay);
//! assert_eq!(plan.new_entry_count(), 1);
//!
//! let mut tree = MemTree::from_flat(nodes).unwrap();
//! let report = apply_plan(&mut tree, &plan).unwrap();
//! let entry = &report.created_entries[0];
//! let mtu = &tree.children(entry).unwrap()[1];
//! assert_eq!(tree.value(mtu), Some("9000"));
//! assert_eq!(tree.value(&NodeId::from("5")), Some("1500"));
//! assert_eq!(tree.flatten().len(), 7);
//! ```

mod types;
pub use types::{EditOp, NodeId, NodeType, ReplayConfigEntry, TreeNode, UnknownEditOp};

mod resolve;
pub use resolve::{effective_xpath, find_node, resolve_node_id, resolve_xpath};

mod plan;
pub use plan::{EntryRole, PlannedEntry, ReplayPlan, ReplayWarning};

mod reconstruct;
pub use reconstruct::reconstruct_replay;

mod tree;
pub use tree::{MemTree, NodeState, ReplayTree, TreeError};

mod apply;
pub use apply::{apply_plan, ApplyReport};

mod jstree;
pub use jstree::{parse_tree, tree_from_jstree_json};

mod task;
pub use task::{
    plan_task, ModuleReplay, ReplayError, ReplaySegment, ReplayTask, SegmentYang, TaskOptions,
    TaskPlan,
};

pub mod cli;
