//! Pipeline domain model

use crate::core::step::{Step, StepId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Closed set of pipeline kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Regular processing pipeline
    Standard,
    /// Runs before standard pipelines
    Preprocess,
    /// Runs after standard pipelines
    Postprocess,
    /// Not eligible for production traffic
    Experimental,
}

/// Pipeline metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMeta {
    /// Pipeline kind
    #[serde(rename = "type")]
    pub kind: PipelineKind,

    /// Categories the whole pipeline is scoped to
    #[serde(default)]
    pub categories: Vec<String>,

    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Optional one-line summary
    #[serde(default)]
    pub summary: Option<String>,
}

/// The persisted root object: metadata plus a forest of steps.
///
/// The step forest is authoritative; flow nodes and edges are derived from
/// it and never persisted. Snapshots of a pipeline are immutable once
/// written, and only the snapshot with `is_latest == true` is editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name (stable across versions)
    pub name: String,

    /// Pipeline metadata
    pub meta: PipelineMeta,

    /// Top-level steps (the forest roots)
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Snapshot version, starting at 1
    #[serde(default = "default_version")]
    pub version: u32,

    /// Whether this snapshot is the latest one
    #[serde(default)]
    pub is_latest: bool,
}

fn default_version() -> u32 {
    1
}

impl Pipeline {
    /// Create a new empty pipeline at version 1
    pub fn new(name: impl Into<String>, kind: PipelineKind) -> Self {
        Pipeline {
            name: name.into(),
            meta: PipelineMeta {
                kind,
                categories: Vec::new(),
                description: None,
                summary: None,
            },
            steps: Vec::new(),
            version: 1,
            is_latest: true,
        }
    }

    /// Parse a pipeline snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse pipeline JSON")
    }

    /// Load a pipeline snapshot from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Serialize the pipeline as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline")
    }

    /// Total number of steps in the forest
    pub fn step_count(&self) -> usize {
        fn count(steps: &[Step]) -> usize {
            steps.iter().map(|s| 1 + count(&s.steps)).sum()
        }
        count(&self.steps)
    }

    /// Whether the given id occurs anywhere in the forest
    pub fn contains_id(&self, id: &StepId) -> bool {
        self.find_step(id).is_some()
    }

    /// Find a step by id anywhere in the forest
    pub fn find_step(&self, id: &StepId) -> Option<&Step> {
        find_in(&self.steps, id)
    }

    /// Ids that occur more than once in the forest.
    ///
    /// The forest invariant guarantees this is empty for trees built through
    /// the edit engine; this is a diagnostic for externally supplied data.
    pub fn duplicate_ids(&self) -> Vec<StepId> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        fn walk(steps: &[Step], seen: &mut HashSet<StepId>, dupes: &mut Vec<StepId>) {
            for step in steps {
                if !seen.insert(step.id.clone()) && !dupes.contains(&step.id) {
                    dupes.push(step.id.clone());
                }
                walk(&step.steps, seen, dupes);
            }
        }
        walk(&self.steps, &mut seen, &mut dupes);
        dupes
    }

    /// Steps whose model reference is empty (malformed but not rejected)
    pub fn steps_without_model(&self) -> Vec<StepId> {
        let mut out = Vec::new();
        fn walk(steps: &[Step], out: &mut Vec<StepId>) {
            for step in steps {
                if step.model.is_empty() {
                    out.push(step.id.clone());
                }
                walk(&step.steps, out);
            }
        }
        walk(&self.steps, &mut out);
        out
    }
}

fn find_in<'a>(steps: &'a [Step], id: &StepId) -> Option<&'a Step> {
    for step in steps {
        if step.id == *id {
            return Some(step);
        }
        if let Some(found) = find_in(&step.steps, id) {
            return Some(found);
        }
    }
    None
}
