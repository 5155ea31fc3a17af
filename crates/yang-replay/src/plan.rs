//! Replay plan types.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::types::{NodeId, ReplayConfigEntry};

/// What a planned list-entry item does once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryRole {
    /// Create a new sibling entry of the anchor list entry and set its first
    /// key.
    NewEntry,
    /// Set a key inside the current new entry, either a further key of the
    /// same list or a key of a list nested in it.
    NestedKey,
    /// Set a non-key node inside the current new entry.
    Member,
}

/// One item of a list-entry addition group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedEntry {
    pub role: EntryRole,
    pub entry: ReplayConfigEntry,
    pub is_leaf_predicate: bool,
    /// Which new entry of the group this item belongs to, counting
    /// [`EntryRole::NewEntry`] items from zero.
    pub entry_index: usize,
    /// For a [`EntryRole::NestedKey`], open a further sibling of the nested
    /// entry last filled for this list instead of filling it.
    #[serde(skip_serializing_if = "is_false")]
    pub opens_entry: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A replay entry that was skipped or needs attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReplayWarning {
    InvalidXPath { xpath: String, message: String },
    NodeNotFound { xpath: String },
    MultipleSegments { count: usize, used: usize },
}

impl fmt::Display for ReplayWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayWarning::InvalidXPath { message, .. } => f.write_str(message),
            ReplayWarning::NodeNotFound { xpath } => write!(f, "no tree node for {xpath}"),
            ReplayWarning::MultipleSegments { count, used } => write!(
                f,
                "replay contains {count} segments, populating segment {used}"
            ),
        }
    }
}

/// The mutations a replay implies for a tree-grid.
///
/// `value_assignments` target nodes that already exist.
/// `list_entry_additions` are grouped by anchor, the list entry the new
/// entries are siblings of, in the order the anchors were first
/// established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPlan {
    pub value_assignments: IndexMap<NodeId, ReplayConfigEntry>,
    pub list_entry_additions: IndexMap<NodeId, Vec<PlannedEntry>>,
    pub warnings: Vec<ReplayWarning>,
}

impl ReplayPlan {
    /// True when the plan has nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.value_assignments.is_empty() && self.list_entry_additions.is_empty()
    }

    /// Number of new list entries the plan creates at anchor level.
    pub fn new_entry_count(&self) -> usize {
        self.list_entry_additions
            .values()
            .flatten()
            .filter(|planned| planned.role == EntryRole::NewEntry)
            .count()
    }
}
