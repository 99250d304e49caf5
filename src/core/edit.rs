//! Pure structural edits on a step forest.
//!
//! Every operation takes the current forest by reference and returns a new
//! one; nothing is ever mutated in place. All operations are total: a target
//! id that occurs nowhere in the forest yields a result equal to the input
//! (a defined no-op, never an error).

use crate::core::step::{Step, StepId, StepPatch};

/// Depth-first locate-and-transform.
///
/// The node whose id equals `target` is replaced by `transform(node)`;
/// recursion continues into every node's children regardless of match, so
/// the vector is rebuilt at each level. Trees are expected to hold tens of
/// steps, so full cloning is fine here.
pub fn map_step<F>(steps: &[Step], target: &StepId, transform: &F) -> Vec<Step>
where
    F: Fn(&Step) -> Step,
{
    steps
        .iter()
        .map(|step| {
            let mut node = if step.id == *target {
                transform(step)
            } else {
                step.clone()
            };
            node.steps = map_step(&node.steps, target, transform);
            node
        })
        .collect()
}

/// Append `new_step` to the children of `parent_id`.
///
/// `parent_id = None` appends to the top-level roots instead. The new step
/// must carry a freshly generated id (see [`Step::new`]); this function
/// never invents or checks ids itself.
pub fn insert_child(steps: &[Step], parent_id: Option<&StepId>, new_step: Step) -> Vec<Step> {
    match parent_id {
        None => {
            let mut roots = steps.to_vec();
            roots.push(new_step);
            roots
        }
        Some(pid) => map_step(steps, pid, &|parent: &Step| {
            let mut parent = parent.clone();
            parent.steps.push(new_step.clone());
            parent
        }),
    }
}

/// Shallow-merge `patch` into the step whose id equals `target`,
/// preserving its id and existing children.
pub fn update_step(steps: &[Step], target: &StepId, patch: &StepPatch) -> Vec<Step> {
    map_step(steps, target, &|step| step.patched(patch))
}

/// Drop the child whose id equals `target` from `parent_id`'s children
/// (or from the top-level roots when `parent_id = None`).
///
/// Removing a non-leaf removes its entire subtree. This cascade is the
/// documented contract of the engine; callers that want leaf-only deletion
/// must gate it themselves (the interaction layer does).
pub fn remove_step(steps: &[Step], parent_id: Option<&StepId>, target: &StepId) -> Vec<Step> {
    match parent_id {
        None => steps
            .iter()
            .filter(|step| step.id != *target)
            .cloned()
            .collect(),
        Some(pid) => map_step(steps, pid, &|parent: &Step| {
            let mut parent = parent.clone();
            parent.steps.retain(|child| child.id != *target);
            parent
        }),
    }
}
