//! Applying a [`ReplayPlan`] to a [`ReplayTree`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};
use yang_xpath::{decompose_xpath_list_keys, strip_predicates};

use crate::plan::{EntryRole, PlannedEntry, ReplayPlan, ReplayWarning};
use crate::resolve::resolve_xpath;
use crate::tree::{ReplayTree, TreeError};
use crate::types::{NodeId, ReplayConfigEntry, TreeNode};

/// What [`apply_plan`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Ids of list entries created, outer entries and nested ones.
    pub created_entries: Vec<NodeId>,
    /// Number of nodes that received a value or edit operation.
    pub assigned: usize,
    pub warnings: Vec<ReplayWarning>,
}

/// One new list entry being filled in.
struct EntryScope {
    node: NodeId,
    /// Last list entry filled per list path, the new entry itself included.
    current: HashMap<String, NodeId>,
    /// Nested entries by key (xpath, value).
    nested: HashMap<(String, String), NodeId>,
}

impl EntryScope {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            current: HashMap::new(),
            nested: HashMap::new(),
        }
    }

    /// The entry a key of the list at `list` is set in: the entry last
    /// filled for that list, or else the innermost filled entry above it.
    fn base(&self, list: &str) -> NodeId {
        if let Some(entry) = self.current.get(list) {
            return entry.clone();
        }
        self.current
            .iter()
            .filter(|(path, _)| list.starts_with(path.as_str()) && list[path.len()..].starts_with('/'))
            .max_by_key(|(path, _)| path.len())
            .map_or_else(|| self.node.clone(), |(_, entry)| entry.clone())
    }
}

/// Applies `plan` to `tree`.
///
/// List entry additions are created first, anchor by anchor, then the value
/// assignments are applied to the nodes that already existed. Items whose
/// target cannot be found are reported as warnings. Errors are only returned
/// when the tree rejects an operation on a node it handed out.
pub fn apply_plan<T: ReplayTree + ?Sized>(
    tree: &mut T,
    plan: &ReplayPlan,
) -> Result<ApplyReport, TreeError> {
    let mut report = ApplyReport::default();
    for (anchor, group) in &plan.list_entry_additions {
        apply_group(tree, anchor, group, &mut report)?;
    }
    for (id, entry) in &plan.value_assignments {
        if tree.node(id).is_none() {
            miss(&mut report, &entry.xpath);
            continue;
        }
        assign(tree, id, entry, &mut report)?;
    }
    debug!(
        created = report.created_entries.len(),
        assigned = report.assigned,
        warnings = report.warnings.len(),
        "applied replay plan"
    );
    Ok(report)
}

fn apply_group<T: ReplayTree + ?Sized>(
    tree: &mut T,
    anchor: &NodeId,
    group: &[PlannedEntry],
    report: &mut ApplyReport,
) -> Result<(), TreeError> {
    if tree.node(anchor).is_none() {
        for planned in group {
            miss(report, &planned.entry.xpath);
        }
        return Ok(());
    }

    let mut scopes: Vec<EntryScope> = Vec::new();
    let mut used = HashSet::new();
    for planned in group {
        match planned.role {
            EntryRole::NewEntry => {
                let entry = tree.add_list_entry(anchor)?;
                debug!(anchor = %anchor, entry = %entry, "created list entry");
                report.created_entries.push(entry.clone());
                let mut scope = EntryScope::new(entry.clone());
                if set_key(tree, &entry, planned, report)?.is_some() {
                    scope.current.insert(list_path(&planned.entry.xpath), entry);
                }
                scopes.push(scope);
            }
            EntryRole::NestedKey => {
                let Some(scope) = scopes.get_mut(planned.entry_index) else {
                    miss(report, &planned.entry.xpath);
                    continue;
                };
                let list = list_path(&planned.entry.xpath);
                let base = match scope.current.get(&list) {
                    Some(previous) if planned.opens_entry => {
                        let entry = tree.add_list_entry(previous)?;
                        debug!(entry = %entry, xpath = %planned.entry.xpath, "created nested list entry");
                        report.created_entries.push(entry.clone());
                        entry
                    }
                    _ => scope.base(&list),
                };
                let Some(entry) = set_key(tree, &base, planned, report)? else {
                    continue;
                };
                if let Some(value) = &planned.entry.value {
                    scope
                        .nested
                        .insert((planned.entry.xpath.clone(), value.clone()), entry.clone());
                }
                scope.current.insert(list, entry);
            }
            EntryRole::Member => {
                let Some(scope) = scopes.get(planned.entry_index) else {
                    miss(report, &planned.entry.xpath);
                    continue;
                };
                let base = member_scope(scope, &planned.entry.xpath);
                let view = scoped_view(tree, &base)?;
                let Some(node) = resolve_xpath(&view, &planned.entry.xpath, &used) else {
                    miss(report, &planned.entry.xpath);
                    continue;
                };
                let id = node.id.clone();
                used.insert(id.clone());
                assign(tree, &id, &planned.entry, report)?;
            }
        }
    }
    Ok(())
}

/// Sets the key of a planned entry inside `base` and returns the list entry
/// holding it. A leaf-predicate edit operation goes on that list entry.
fn set_key<T: ReplayTree + ?Sized>(
    tree: &mut T,
    base: &NodeId,
    planned: &PlannedEntry,
    report: &mut ApplyReport,
) -> Result<Option<NodeId>, TreeError> {
    let view = scoped_view(tree, base)?;
    let Some(key) = resolve_xpath(&view, &planned.entry.xpath, &HashSet::new()) else {
        miss(report, &planned.entry.xpath);
        return Ok(None);
    };
    let (key_id, entry_id) = (key.id.clone(), key.parent_id.clone());
    if let Some(value) = &planned.entry.value {
        tree.set_value(&key_id, value)?;
        report.assigned += 1;
    }
    if planned.is_leaf_predicate {
        if let Some(op) = planned.entry.edit_op {
            tree.set_edit_op(&entry_id, op)?;
        }
    }
    Ok(Some(entry_id))
}

fn assign<T: ReplayTree + ?Sized>(
    tree: &mut T,
    id: &NodeId,
    entry: &ReplayConfigEntry,
    report: &mut ApplyReport,
) -> Result<(), TreeError> {
    if let Some(value) = &entry.value {
        tree.set_value(id, value)?;
    }
    if let Some(op) = entry.edit_op {
        tree.set_edit_op(id, op)?;
    }
    report.assigned += 1;
    Ok(())
}

/// The stripped path of the list a key XPath belongs to.
fn list_path(key_xpath: &str) -> String {
    let mut stripped = strip_predicates(key_xpath);
    if let Some(pos) = stripped.rfind('/') {
        stripped.truncate(pos);
    }
    stripped
}

/// The nested entry a member belongs to: the one keyed by the innermost of
/// its predicates, or the new entry itself.
fn member_scope(scope: &EntryScope, xpath: &str) -> NodeId {
    let Ok(segments) = decompose_xpath_list_keys(xpath) else {
        return scope.node.clone();
    };
    segments
        .iter()
        .rev()
        .find_map(|segment| {
            scope
                .nested
                .get(&(segment.xpath.clone(), segment.value.clone()))
        })
        .cloned()
        .unwrap_or_else(|| scope.node.clone())
}

/// The ancestors of `id` followed by its subtree, so full XPaths resolve
/// inside the subtree only.
fn scoped_view<T: ReplayTree + ?Sized>(tree: &T, id: &NodeId) -> Result<Vec<TreeNode>, TreeError> {
    let mut ancestors = Vec::new();
    let mut current = tree
        .node(id)
        .ok_or_else(|| TreeError::UnknownNode(id.clone()))?
        .parent_id
        .clone();
    while let Some(node) = tree.node(&current) {
        ancestors.push(node.clone());
        if node.parent_id == current {
            break;
        }
        current = node.parent_id.clone();
    }
    ancestors.reverse();
    ancestors.extend(tree.flatten_subtree(id)?);
    Ok(ancestors)
}

fn miss(report: &mut ApplyReport, xpath: &str) {
    warn!(xpath = %xpath, "no tree node for planned replay entry");
    report.warnings.push(ReplayWarning::NodeNotFound {
        xpath: xpath.to_string(),
    });
}
