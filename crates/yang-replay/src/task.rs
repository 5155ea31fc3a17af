//! Recorded replay tasks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::plan::{ReplayPlan, ReplayWarning};
use crate::reconstruct::reconstruct_replay;
use crate::tree::TreeError;
use crate::types::{ReplayConfigEntry, TreeNode};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay has no segments")]
    EmptyTask,
    #[error("replay segment {index} out of range, replay has {count}")]
    SegmentOutOfRange { index: usize, count: usize },
    #[error("custom RPC replays cannot be populated into the tree")]
    CustomRpc,
    #[error("module \"{0}\" is not part of the replay segment")]
    ModuleNotInReplay(String),
    #[error("module \"{0}\" not found in tree")]
    ModuleNotFound(String),
    #[error("invalid tree JSON: {0}")]
    InvalidTree(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A recorded replay: one segment per RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayTask {
    #[serde(default)]
    pub segments: Vec<ReplaySegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySegment {
    #[serde(default)]
    pub yang: SegmentYang,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentYang {
    #[serde(rename = "proto-op", default, skip_serializing_if = "Option::is_none")]
    pub proto_op: Option<String>,
    /// Absent for custom RPCs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<IndexMap<String, ModuleReplay>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReplay {
    #[serde(default)]
    pub configs: Vec<ReplayConfigEntry>,
}

/// Which part of a task to plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    /// Segment index; the last segment when unset.
    pub segment: Option<usize>,
    /// Module name; the segment's first module when unset.
    pub module: Option<String>,
}

/// The plan for one module of one task segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPlan {
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto_op: Option<String>,
    pub plan: ReplayPlan,
}

/// Plans a segment of `task` against the tree flattened in `flat_tree`.
///
/// Only the module's branch of the tree is searched, starting at the first
/// node whose text is the module name.
pub fn plan_task(
    flat_tree: &[TreeNode],
    task: &ReplayTask,
    options: &TaskOptions,
) -> Result<TaskPlan, ReplayError> {
    let count = task.segments.len();
    if count == 0 {
        return Err(ReplayError::EmptyTask);
    }
    let index = options.segment.unwrap_or(count - 1);
    let segment = task
        .segments
        .get(index)
        .ok_or(ReplayError::SegmentOutOfRange { index, count })?;

    let modules = segment.yang.modules.as_ref().ok_or(ReplayError::CustomRpc)?;
    let (module, replay) = match &options.module {
        Some(name) => modules
            .get_key_value(name)
            .ok_or_else(|| ReplayError::ModuleNotInReplay(name.clone()))?,
        None => modules
            .first()
            .ok_or_else(|| ReplayError::ModuleNotInReplay(String::new()))?,
    };

    let start = flat_tree
        .iter()
        .position(|node| node.text == *module)
        .ok_or_else(|| ReplayError::ModuleNotFound(module.clone()))?;

    info!(module = %module, segment = index, configs = replay.configs.len(), "planning replay");
    let mut plan = reconstruct_replay(&flat_tree[start..], &replay.configs);
    if count > 1 && options.segment.is_none() {
        warn!(count, "replay contains several segments, using the last one");
        plan.warnings.insert(0, ReplayWarning::MultipleSegments { count, used: index });
    }
    Ok(TaskPlan {
        module: module.clone(),
        proto_op: segment.yang.proto_op.clone(),
        plan,
    })
}
