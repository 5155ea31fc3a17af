//! Planning a recorded replay onto a flattened tree-grid.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use yang_xpath::{decompose_xpath_list_keys, local_name, strip_predicates, xpath_steps, XPathSegment};

use crate::plan::{EntryRole, PlannedEntry, ReplayPlan, ReplayWarning};
use crate::resolve::resolve_xpath;
use crate::types::{NodeId, ReplayConfigEntry, TreeNode};

/// The list entry a list step was first bound to.
struct ListBinding {
    /// The rendered list entry holding the keys.
    anchor: NodeId,
    values: Vec<String>,
}

/// The new list entry the rest of a replay entry belongs to.
struct Anchor {
    id: NodeId,
    entry_index: usize,
}

struct Planner<'a> {
    flat_tree: &'a [TreeNode],
    /// Bound list steps by the XPath text before their first predicate.
    lists: HashMap<String, ListBinding>,
    /// Resolved key leaves by segment XPath.
    key_nodes: HashMap<String, NodeId>,
    /// New entries by anchor and key values.
    new_entries: HashMap<(NodeId, Vec<String>), usize>,
    /// Key values seen per list step inside each new entry.
    nested: HashMap<(NodeId, usize, String), Vec<Vec<String>>>,
    used: HashSet<NodeId>,
    plan: ReplayPlan,
}

/// Plans how `replay` is applied to the tree flattened in `flat_tree`.
///
/// The key values of a list step identify a list entry. The first values
/// seen for a list bind to the entry already rendered in the tree; other
/// values are new sibling entries and go to `list_entry_additions`, together
/// with the keys and nodes of the replay entries that live inside them.
/// Everything else is a `value_assignments` item against an existing node.
///
/// Entries with an unparseable XPath or with no matching node are skipped
/// and reported in `warnings`. Inputs are not modified, so planning the same
/// input twice gives the same plan.
pub fn reconstruct_replay(flat_tree: &[TreeNode], replay: &[ReplayConfigEntry]) -> ReplayPlan {
    let mut planner = Planner {
        flat_tree,
        lists: HashMap::new(),
        key_nodes: HashMap::new(),
        new_entries: HashMap::new(),
        nested: HashMap::new(),
        used: HashSet::new(),
        plan: ReplayPlan::default(),
    };
    for entry in replay {
        planner.plan_entry(entry);
    }
    debug!(
        assignments = planner.plan.value_assignments.len(),
        anchors = planner.plan.list_entry_additions.len(),
        warnings = planner.plan.warnings.len(),
        "planned replay"
    );
    planner.plan
}

impl Planner<'_> {
    fn plan_entry(&mut self, entry: &ReplayConfigEntry) {
        let segments = match decompose_xpath_list_keys(&entry.xpath) {
            Ok(segments) => segments,
            Err(err) => {
                warn!(xpath = %entry.xpath, error = %err, "skipping replay entry with invalid XPath");
                self.plan.warnings.push(ReplayWarning::InvalidXPath {
                    xpath: entry.xpath.clone(),
                    message: err.to_string(),
                });
                return;
            }
        };

        let own_path = local_path(&entry.xpath);
        let own_key = segments
            .iter()
            .find(|segment| local_path(&segment.xpath) == own_path);
        let mut anchor: Option<Anchor> = None;

        for step in list_steps(&segments) {
            let context = step_context(step[0]);
            let values: Vec<String> = step.iter().map(|s| s.value.clone()).collect();

            if let Some(current) = &anchor {
                self.plan_nested(current, context, &values, &step, entry);
                continue;
            }

            let bound = self
                .lists
                .get(context)
                .map(|list| (list.anchor.clone(), list.values.len(), same_entry(&list.values, &values)));
            match bound {
                Some((_, len, true)) if len >= values.len() => {}
                Some((_, len, true)) => {
                    // A longer key tuple for the bound entry: bind the rest.
                    if self.bind_step(&step[len..]).is_none() {
                        self.not_found(&entry.xpath);
                        return;
                    }
                    if let Some(list) = self.lists.get_mut(context) {
                        list.values = values;
                    }
                }
                Some((list_anchor, _, false)) => {
                    anchor = Some(self.new_entry(list_anchor, values, &step, entry));
                }
                None => match self.bind_step(&step) {
                    Some(list_anchor) => {
                        self.lists.insert(
                            context.to_string(),
                            ListBinding {
                                anchor: list_anchor,
                                values,
                            },
                        );
                    }
                    None => {
                        self.not_found(&entry.xpath);
                        return;
                    }
                },
            }
        }

        if let Some(current) = anchor {
            // Keys were planned above; a list node itself needs nothing more.
            if own_key.is_some() || entry.xpath.ends_with(']') {
                return;
            }
            debug!(xpath = %entry.xpath, anchor = %current.id, "member of new list entry");
            self.plan
                .list_entry_additions
                .entry(current.id)
                .or_default()
                .push(PlannedEntry {
                    role: EntryRole::Member,
                    entry: entry.clone(),
                    is_leaf_predicate: false,
                    entry_index: current.entry_index,
                    opens_entry: false,
                });
            return;
        }

        if let Some(segment) = own_key {
            if let (Some(op), Some(node_id)) = (entry.edit_op, self.key_nodes.get(&segment.xpath)) {
                if let Some(assignment) = self.plan.value_assignments.get_mut(node_id) {
                    assignment.edit_op = Some(op);
                }
            }
            return;
        }

        if entry.xpath.ends_with(']') && entry.edit_op.is_none() {
            return;
        }

        match resolve_xpath(self.flat_tree, &entry.xpath, &self.used) {
            Some(node) => {
                let id = node.id.clone();
                self.used.insert(id.clone());
                self.plan.value_assignments.insert(id, entry.clone());
            }
            None => self.not_found(&entry.xpath),
        }
    }

    /// Resolves the key leaves of a list step seen for the first time and
    /// records their values. Returns the list entry holding them, or `None`
    /// when the tree has no such key.
    fn bind_step(&mut self, step: &[&XPathSegment]) -> Option<NodeId> {
        let mut anchor = None;
        for segment in step {
            let node = resolve_xpath(self.flat_tree, &segment.xpath, &self.used)?;
            let node_id = node.id.clone();
            anchor.get_or_insert_with(|| node.parent_id.clone());
            self.used.insert(node_id.clone());
            self.plan
                .value_assignments
                .entry(node_id.clone())
                .or_insert_with(|| {
                    ReplayConfigEntry::new(segment.xpath.clone()).with_value(segment.value.clone())
                });
            self.key_nodes.insert(segment.xpath.clone(), node_id);
        }
        anchor
    }

    /// Plans a new sibling of `anchor` keyed by `values`, or returns the one
    /// already planned for them.
    fn new_entry(
        &mut self,
        anchor: NodeId,
        values: Vec<String>,
        step: &[&XPathSegment],
        entry: &ReplayConfigEntry,
    ) -> Anchor {
        if let Some(&entry_index) = self.new_entries.get(&(anchor.clone(), values.clone())) {
            self.merge_edit_op(&anchor, entry_index, step, entry);
            return Anchor {
                id: anchor,
                entry_index,
            };
        }

        let group = self.plan.list_entry_additions.entry(anchor.clone()).or_default();
        let entry_index = group
            .iter()
            .filter(|planned| planned.role == EntryRole::NewEntry)
            .count();
        for (i, segment) in step.iter().enumerate() {
            let role = if i == 0 {
                EntryRole::NewEntry
            } else {
                EntryRole::NestedKey
            };
            debug!(xpath = %segment.xpath, value = %segment.value, anchor = %anchor, ?role, "planned list entry key");
            group.push(planned_key(role, segment, entry, entry_index, false));
        }
        self.new_entries.insert((anchor.clone(), values), entry_index);
        Anchor {
            id: anchor,
            entry_index,
        }
    }

    /// Plans the keys of a list step inside the new entry `current`. The
    /// first key values seen for the list fill the entry copied with it,
    /// later ones open further sibling entries.
    fn plan_nested(
        &mut self,
        current: &Anchor,
        context: &str,
        values: &[String],
        step: &[&XPathSegment],
        entry: &ReplayConfigEntry,
    ) {
        let seen = self
            .nested
            .entry((current.id.clone(), current.entry_index, context.to_string()))
            .or_default();
        if seen.iter().any(|other| same_entry(other, values)) {
            self.merge_edit_op(&current.id, current.entry_index, step, entry);
            return;
        }
        let opens = !seen.is_empty();
        seen.push(values.to_vec());

        let group = self.plan.list_entry_additions.entry(current.id.clone()).or_default();
        for (i, segment) in step.iter().enumerate() {
            debug!(xpath = %segment.xpath, value = %segment.value, anchor = %current.id, "planned nested list key");
            group.push(planned_key(
                EntryRole::NestedKey,
                segment,
                entry,
                current.entry_index,
                i == 0 && opens,
            ));
        }
    }

    /// Puts the entry's edit operation on an already planned leaf-predicate
    /// key that has none yet.
    fn merge_edit_op(
        &mut self,
        anchor: &NodeId,
        entry_index: usize,
        step: &[&XPathSegment],
        entry: &ReplayConfigEntry,
    ) {
        let (Some(op), Some(segment)) = (entry.edit_op, step.last()) else {
            return;
        };
        if !segment.is_leaf_predicate {
            return;
        }
        let Some(group) = self.plan.list_entry_additions.get_mut(anchor) else {
            return;
        };
        if let Some(planned) = group.iter_mut().find(|planned| {
            planned.role != EntryRole::Member
                && planned.entry_index == entry_index
                && planned.entry.xpath == segment.xpath
                && planned.entry.value.as_deref() == Some(segment.value.as_str())
        }) {
            planned.entry.edit_op.get_or_insert(op);
        }
    }

    fn not_found(&mut self, xpath: &str) {
        warn!(xpath = %xpath, "skipping replay entry with no matching tree node");
        self.plan.warnings.push(ReplayWarning::NodeNotFound {
            xpath: xpath.to_string(),
        });
    }
}

fn planned_key(
    role: EntryRole,
    segment: &XPathSegment,
    entry: &ReplayConfigEntry,
    entry_index: usize,
    opens_entry: bool,
) -> PlannedEntry {
    let mut key = ReplayConfigEntry::new(segment.xpath.clone()).with_value(segment.value.clone());
    if segment.is_leaf_predicate {
        key.edit_op = entry.edit_op;
    }
    PlannedEntry {
        role,
        entry: key,
        is_leaf_predicate: segment.is_leaf_predicate,
        entry_index,
        opens_entry,
    }
}

/// Groups segments by the list step they key, in path order.
fn list_steps(segments: &[XPathSegment]) -> Vec<Vec<&XPathSegment>> {
    let mut steps: Vec<(Vec<String>, Vec<&XPathSegment>)> = Vec::new();
    for segment in segments {
        let mut list = local_path(&segment.xpath);
        list.pop();
        match steps.last_mut() {
            Some((last, keys)) if *last == list => keys.push(segment),
            _ => steps.push((list, vec![segment])),
        }
    }
    steps.into_iter().map(|(_, keys)| keys).collect()
}

/// The XPath text before a list step's first predicate.
fn step_context(first_key: &XPathSegment) -> &str {
    first_key
        .xpath
        .rfind('/')
        .map_or("", |pos| &first_key.xpath[..pos])
}

/// True when the shorter key tuple is a prefix of the longer one.
fn same_entry(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b).all(|(x, y)| x == y)
}

/// The local names of an XPath's steps, predicates stripped.
fn local_path(xpath: &str) -> Vec<String> {
    let stripped = strip_predicates(xpath);
    xpath_steps(&stripped)
        .into_iter()
        .map(|step| local_name(step).to_string())
        .collect()
}
