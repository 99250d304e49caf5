//! Step domain model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque unique identifier of a step.
///
/// Fresh ids are generated with [`StepId::generate`]; ids are assigned at
/// creation time and never reused. The `From` impls exist for deserialized
/// data and test fixtures, not for inserting new steps (insertion always
/// generates internally, see [`Step::new`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Generate a fresh random id, disjoint from every id in any tree
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single step in a pipeline step tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique step identifier
    pub id: StepId,

    /// Name of the model this step invokes. A missing model is tolerated
    /// (it surfaces as an empty node label), not rejected.
    #[serde(default)]
    pub model: String,

    /// Version of the model this step invokes
    #[serde(default)]
    pub version: String,

    /// Category identifiers this step is scoped to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Argument name -> string value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,

    /// Ordered child steps; empty means leaf
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

impl Step {
    /// Build a step with a freshly generated id from form values
    pub fn new(draft: StepDraft) -> Self {
        Step {
            id: StepId::generate(),
            model: draft.model,
            version: draft.version,
            categories: draft.categories,
            args: draft.args,
            steps: Vec::new(),
        }
    }

    /// Whether this step has no child steps
    pub fn is_leaf(&self) -> bool {
        self.steps.is_empty()
    }

    /// Return a copy with the patch shallow-merged in.
    ///
    /// Id and child steps are always preserved; only fields present in the
    /// patch change.
    pub fn patched(&self, patch: &StepPatch) -> Step {
        Step {
            id: self.id.clone(),
            model: patch.model.clone().unwrap_or_else(|| self.model.clone()),
            version: patch.version.clone().unwrap_or_else(|| self.version.clone()),
            categories: patch
                .categories
                .clone()
                .unwrap_or_else(|| self.categories.clone()),
            args: patch.args.clone().unwrap_or_else(|| self.args.clone()),
            steps: self.steps.clone(),
        }
    }
}

/// Form payload for creating a new step.
///
/// Deliberately carries no id: fresh ids are generated by [`Step::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDraft {
    /// Name of the model to invoke
    pub model: String,

    /// Version of the model to invoke
    #[serde(default)]
    pub version: String,

    /// Category identifiers for the new step
    #[serde(default)]
    pub categories: Vec<String>,

    /// Argument name -> string value
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

impl StepDraft {
    /// Create a draft for the given model/version
    pub fn new(model: impl Into<String>, version: impl Into<String>) -> Self {
        StepDraft {
            model: model.into(),
            version: version.into(),
            categories: Vec::new(),
            args: BTreeMap::new(),
        }
    }
}

/// Shallow-merge payload for updating an existing step.
///
/// `None` fields are left untouched; the patch can never change a step's id
/// or its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepPatch {
    /// Replacement model name
    #[serde(default)]
    pub model: Option<String>,

    /// Replacement model version
    #[serde(default)]
    pub version: Option<String>,

    /// Replacement category set
    #[serde(default)]
    pub categories: Option<Vec<String>>,

    /// Replacement argument map
    #[serde(default)]
    pub args: Option<BTreeMap<String, String>>,
}

impl StepPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.version.is_none()
            && self.categories.is_none()
            && self.args.is_none()
    }
}
