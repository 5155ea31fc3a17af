//! Logic behind the `yang-replay` binary.
//!
//! - `keys`: decompose an XPath's list-key predicates
//! - `strip`: remove list-key predicates from an XPath
//! - `plan`: plan a replay against a tree (JSON on stdin)
//! - `apply`: plan a replay and apply it to an in-memory tree

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use yang_xpath::{decompose_xpath_list_keys, strip_predicates, InvalidXPathError};

use crate::apply::apply_plan;
use crate::jstree::parse_tree;
use crate::plan::ReplayPlan;
use crate::reconstruct::reconstruct_replay;
use crate::task::{plan_task, ReplayError, ReplayTask, TaskOptions, TaskPlan};
use crate::tree::{MemTree, TreeError};
use crate::types::{ReplayConfigEntry, TreeNode};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Json(serde_json::Error),
    XPath(InvalidXPathError),
    Replay(ReplayError),
    Tree(TreeError),
    Usage(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e)     => write!(f, "cannot read input: {e}"),
            CliError::Json(e)   => write!(f, "{e}"),
            CliError::XPath(e)  => write!(f, "{e}"),
            CliError::Replay(e) => write!(f, "{e}"),
            CliError::Tree(e)   => write!(f, "{e}"),
            CliError::Usage(e)  => write!(f, "Usage: {e}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self { CliError::Io(e) }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<InvalidXPathError> for CliError {
    fn from(e: InvalidXPathError) -> Self { CliError::XPath(e) }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self { CliError::Replay(e) }
}

impl From<TreeError> for CliError {
    fn from(e: TreeError) -> Self { CliError::Tree(e) }
}

// ── Logging ───────────────────────────────────────────────────────────────

/// Installs a compact stderr subscriber when `RUST_LOG` is set to a
/// non-empty value. Without it nothing is logged.
pub fn init_logging() {
    let Ok(rustlog) = std::env::var("RUST_LOG") else {
        return;
    };
    if rustlog.is_empty() {
        return;
    }
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .compact()
        .try_init();
}

// ── keys / strip ──────────────────────────────────────────────────────────

/// Decomposes `xpath` and returns the segments as pretty JSON.
pub fn keys(xpath: &str) -> Result<String, CliError> {
    let segments = decompose_xpath_list_keys(xpath)?;
    Ok(serde_json::to_string_pretty(&segments)?)
}

/// Returns `xpath` without list-key predicates.
pub fn strip(xpath: &str) -> String {
    strip_predicates(xpath)
}

// ── plan / apply ──────────────────────────────────────────────────────────

/// Input document of `plan` and `apply`.
///
/// `tree` is jstree flat JSON or serialized tree nodes. Either `task` (a
/// recorded replay task, with optional `options`) or `replay` (a plain list
/// of config entries) is planned against it.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInput {
    pub tree: Value,
    #[serde(default)]
    pub replay: Option<Vec<ReplayConfigEntry>>,
    #[serde(default)]
    pub task: Option<ReplayTask>,
    #[serde(default)]
    pub options: TaskOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Planned {
    Task(TaskPlan),
    Replay(ReplayPlan),
}

impl Planned {
    fn plan(&self) -> &ReplayPlan {
        match self {
            Planned::Task(task) => &task.plan,
            Planned::Replay(plan) => plan,
        }
    }
}

fn plan_input(input: &str) -> Result<(Vec<TreeNode>, Planned), CliError> {
    let input: PlanInput = serde_json::from_str(input)?;
    let tree = parse_tree(input.tree)?;
    let planned = match (&input.task, &input.replay) {
        (Some(task), _) => Planned::Task(plan_task(&tree, task, &input.options)?),
        (None, Some(replay)) => Planned::Replay(reconstruct_replay(&tree, replay)),
        (None, None) => {
            return Err(CliError::Usage(
                "input needs a \"task\" or a \"replay\" next to \"tree\"".to_string(),
            ))
        }
    };
    Ok((tree, planned))
}

/// Plans the replay in `input` and returns the plan as pretty JSON.
pub fn plan(input: &str) -> Result<String, CliError> {
    let (_, planned) = plan_input(input)?;
    Ok(serde_json::to_string_pretty(&planned)?)
}

/// Plans the replay in `input`, applies it to the tree and returns the
/// resulting nodes with their values and the apply report as pretty JSON.
pub fn apply(input: &str) -> Result<String, CliError> {
    let (nodes, planned) = plan_input(input)?;
    let mut tree = MemTree::from_flat(nodes)?;
    let report = apply_plan(&mut tree, planned.plan())?;
    let out = json!({
        "warnings": planned.plan().warnings,
        "report": report,
        "tree": tree.snapshot(),
    });
    Ok(serde_json::to_string_pretty(&out)?)
}
