//! Interaction state machine for one editing session.
//!
//! The controller owns the latest committed step forest and applies every
//! structural edit to it sequentially, so an edit can never be computed
//! against a stale snapshot. Hosts receive the brand-new forest in each
//! [`EditOutcome`] and decide whether/when to persist it.

use crate::core::edit::{insert_child, remove_step, update_step};
use crate::core::pipeline::Pipeline;
use crate::core::step::{Step, StepDraft, StepId, StepPatch};
use crate::graph::flow::{FlowGraph, NodeId, Point};
use crate::graph::layout::layout;
use crate::graph::mapper::map_pipeline;
use crate::interaction::surface::{RenderSurface, SurfaceEvent, Viewport};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a user action was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("no node is selected")]
    NothingSelected,

    #[error("the pipeline root cannot be edited or deleted")]
    RootNotEditable,

    #[error("the pipeline is read-only")]
    ReadOnly,

    #[error("step {0} still has child steps")]
    HasChildren(StepId),

    #[error("no matching form is open")]
    NoFormOpen,

    #[error("node {0} does not exist in the current tree")]
    UnknownNode(NodeId),
}

/// Session state: at most one add/edit form is open at a time, so
/// structural edits are serialized by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected
    Idle,
    /// A node is selected; contextual actions are available
    NodeSelected(NodeId),
    /// The add-child form is open for the selected node
    AddOpen(NodeId),
    /// The edit form is open for the selected node
    EditOpen(NodeId),
}

impl SessionState {
    /// The selected node, in any state that has one
    pub fn selection(&self) -> Option<&NodeId> {
        match self {
            SessionState::Idle => None,
            SessionState::NodeSelected(id)
            | SessionState::AddOpen(id)
            | SessionState::EditOpen(id) => Some(id),
        }
    }

    /// Whether an add or edit form is open
    pub fn form_open(&self) -> bool {
        matches!(self, SessionState::AddOpen(_) | SessionState::EditOpen(_))
    }
}

/// What a committed structural edit did
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// A step was appended under `parent_id` (`None` = top level)
    Added {
        step: Step,
        parent_id: Option<StepId>,
    },
    /// A step's fields were replaced
    Updated { step: Step },
    /// A step (and, for non-leaves, its subtree) was removed
    Removed {
        step: Step,
        parent_id: Option<StepId>,
    },
}

/// Result of a committed structural edit, handed to the host
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// What happened
    pub event: EditEvent,
    /// The brand-new top-level step forest
    pub steps: Vec<Step>,
    /// Tree generation after this commit
    pub epoch: u64,
}

/// Tracks selection, viewport, and form state for one editing session and
/// routes add/edit/delete actions through the edit engine.
pub struct InteractionController {
    pipeline: Pipeline,
    state: SessionState,
    viewport: Viewport,
    selected_position: Option<Point>,
    dragging: Option<NodeId>,
    read_only: bool,
    render_epoch: u64,
    graph: Option<FlowGraph>,
}

impl InteractionController {
    /// Start a session over the given pipeline snapshot.
    ///
    /// Non-latest snapshots are always read-only, regardless of the flag.
    pub fn new(pipeline: Pipeline, read_only: bool) -> Self {
        let read_only = read_only || !pipeline.is_latest;
        InteractionController {
            pipeline,
            state: SessionState::Idle,
            viewport: Viewport::default(),
            selected_position: None,
            dragging: None,
            read_only,
            render_epoch: 0,
            graph: None,
        }
    }

    /// The latest committed step forest
    pub fn steps(&self) -> &[Step] {
        &self.pipeline.steps
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Node currently being dragged, if any
    pub fn dragging(&self) -> Option<&NodeId> {
        self.dragging.as_ref()
    }

    /// Monotonic counter identifying the committed tree generation.
    ///
    /// Bumped on every committed edit and on every wholesale tree
    /// replacement; surfaces use it as their remount trigger.
    pub fn render_epoch(&self) -> u64 {
        self.render_epoch
    }

    /// The current flow graph, mapping and laying out on demand.
    ///
    /// The graph is cached until the next committed edit or tree
    /// replacement; repeated calls between commits do no work.
    pub fn graph(&mut self) -> &FlowGraph {
        if self.graph.is_none() {
            let mut graph = map_pipeline(&self.pipeline);
            layout(&mut graph);
            self.graph = Some(graph);
        }
        self.graph.as_ref().unwrap()
    }

    /// Push the current graph to a rendering surface
    pub fn present(&mut self, surface: &mut dyn RenderSurface) {
        let epoch = self.render_epoch;
        self.graph();
        if let Some(graph) = &self.graph {
            surface.apply(graph, epoch);
        }
    }

    /// Screen-space anchor for contextual action controls, tracking the
    /// selected node through the current pan/zoom transform
    pub fn action_anchor(&self) -> Option<Point> {
        let position = self.selected_position?;
        Some(Point {
            x: position.x * self.viewport.zoom + self.viewport.x,
            y: position.y * self.viewport.zoom + self.viewport.y,
        })
    }

    /// Feed one surface event into the session
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::SelectionChanged(None) => {
                self.state = SessionState::Idle;
                self.selected_position = None;
            }
            SurfaceEvent::SelectionChanged(Some(id)) => {
                let position = self.graph().node(&id).map(|n| n.position);
                if position.is_none() {
                    warn!(node = %id, "selection event for unknown node ignored");
                    return;
                }
                self.state = SessionState::NodeSelected(id);
                self.selected_position = position;
            }
            SurfaceEvent::DragStart(id) => {
                self.dragging = Some(id);
            }
            SurfaceEvent::DragStop { node, position } => {
                if let Some(flow_node) = self
                    .graph
                    .as_mut()
                    .and_then(|graph| graph.node_mut(&node))
                {
                    flow_node.position = position;
                }
                if self.state.selection() == Some(&node) {
                    self.selected_position = Some(position);
                }
                self.dragging = None;
            }
            SurfaceEvent::ViewportChanged(viewport) => {
                self.viewport = viewport;
            }
        }
    }

    /// Models offered to the add/edit form: only models already used along
    /// the path from the root to the parent of the affected step. An empty
    /// list means unrestricted choice (adding directly under the root).
    pub fn available_models(&mut self) -> Vec<String> {
        let state = self.state.clone();
        let graph = self.graph();
        match state {
            SessionState::Idle => Vec::new(),
            // the selected node is the parent of the step being added
            SessionState::NodeSelected(id) | SessionState::AddOpen(id) => graph
                .node(&id)
                .map(|n| n.ancestor_models.clone())
                .unwrap_or_default(),
            // for edits the parent chain excludes the edited step itself
            SessionState::EditOpen(id) => {
                let mut models = graph
                    .node(&id)
                    .map(|n| n.ancestor_models.clone())
                    .unwrap_or_default();
                models.pop();
                models
            }
        }
    }

    /// Open the add-child form for the selected node.
    ///
    /// Any open edit form is force-closed.
    pub fn open_add(&mut self) -> Result<(), ActionError> {
        if self.read_only {
            return Err(ActionError::ReadOnly);
        }
        match self.state.selection().cloned() {
            Some(id) => {
                self.state = SessionState::AddOpen(id);
                Ok(())
            }
            None => Err(ActionError::NothingSelected),
        }
    }

    /// Open the edit form for the selected node.
    ///
    /// Unavailable for the synthetic root; any open add form is
    /// force-closed.
    pub fn open_edit(&mut self) -> Result<(), ActionError> {
        if self.read_only {
            return Err(ActionError::ReadOnly);
        }
        match self.state.selection().cloned() {
            Some(id) if id.is_root() => Err(ActionError::RootNotEditable),
            Some(id) => {
                self.state = SessionState::EditOpen(id);
                Ok(())
            }
            None => Err(ActionError::NothingSelected),
        }
    }

    /// Close any open form without touching the tree
    pub fn cancel(&mut self) {
        if let Some(id) = self.state.selection().cloned() {
            if self.state.form_open() {
                self.state = SessionState::NodeSelected(id);
            }
        }
    }

    /// Submit the add form: build a fresh-id step from the draft and append
    /// it under the selected node (top level when the root is selected).
    pub fn submit_add(&mut self, draft: StepDraft) -> Result<EditOutcome, ActionError> {
        let selected = match &self.state {
            SessionState::AddOpen(id) => id.clone(),
            _ => return Err(ActionError::NoFormOpen),
        };

        let parent_id = selected.as_step_id();
        if let Some(pid) = &parent_id {
            if !self.pipeline.contains_id(pid) {
                return Err(ActionError::UnknownNode(selected));
            }
        }

        let step = Step::new(draft);
        self.pipeline.steps = insert_child(&self.pipeline.steps, parent_id.as_ref(), step.clone());
        self.state = SessionState::NodeSelected(selected);
        self.commit("add");

        Ok(EditOutcome {
            event: EditEvent::Added { step, parent_id },
            steps: self.pipeline.steps.clone(),
            epoch: self.render_epoch,
        })
    }

    /// Submit the edit form: shallow-merge the patch into the selected
    /// step, preserving its children.
    pub fn submit_edit(&mut self, patch: StepPatch) -> Result<EditOutcome, ActionError> {
        let selected = match &self.state {
            SessionState::EditOpen(id) => id.clone(),
            _ => return Err(ActionError::NoFormOpen),
        };
        let target = match selected.as_step_id() {
            Some(id) => id,
            None => return Err(ActionError::RootNotEditable),
        };
        if !self.pipeline.contains_id(&target) {
            return Err(ActionError::UnknownNode(selected));
        }

        self.pipeline.steps = update_step(&self.pipeline.steps, &target, &patch);
        let step = match self.pipeline.find_step(&target) {
            Some(step) => step.clone(),
            None => return Err(ActionError::UnknownNode(selected)),
        };
        self.state = SessionState::NodeSelected(selected);
        self.commit("edit");

        Ok(EditOutcome {
            event: EditEvent::Updated { step },
            steps: self.pipeline.steps.clone(),
            epoch: self.render_epoch,
        })
    }

    /// Delete the selected step.
    ///
    /// Leaf-only by policy: the edit engine itself would cascade, but the
    /// controller refuses to delete a step that still has children. The
    /// selection is cleared on success.
    pub fn delete_selected(&mut self) -> Result<EditOutcome, ActionError> {
        if self.read_only {
            return Err(ActionError::ReadOnly);
        }
        let selected = match self.state.selection().cloned() {
            Some(id) => id,
            None => return Err(ActionError::NothingSelected),
        };
        let target = match selected.as_step_id() {
            Some(id) => id,
            None => return Err(ActionError::RootNotEditable),
        };
        let step = match self.pipeline.find_step(&target) {
            Some(step) => step.clone(),
            None => return Err(ActionError::UnknownNode(selected)),
        };
        if !step.is_leaf() {
            return Err(ActionError::HasChildren(target));
        }

        let parent_id = self
            .graph()
            .parent_of(&selected)
            .and_then(|parent| parent.as_step_id());

        self.pipeline.steps = remove_step(&self.pipeline.steps, parent_id.as_ref(), &target);
        self.state = SessionState::Idle;
        self.selected_position = None;
        self.commit("delete");

        Ok(EditOutcome {
            event: EditEvent::Removed { step, parent_id },
            steps: self.pipeline.steps.clone(),
            epoch: self.render_epoch,
        })
    }

    /// Replace the tree wholesale (version switch or external reload).
    ///
    /// Resets selection and form state; read-only follows the snapshot's
    /// `is_latest` flag.
    pub fn replace_pipeline(&mut self, pipeline: Pipeline) {
        info!(
            pipeline = %pipeline.name,
            version = pipeline.version,
            "replacing step tree wholesale"
        );
        self.read_only = !pipeline.is_latest;
        self.pipeline = pipeline;
        self.state = SessionState::Idle;
        self.selected_position = None;
        self.dragging = None;
        self.graph = None;
        self.render_epoch += 1;
    }

    fn commit(&mut self, operation: &str) {
        self.render_epoch += 1;
        self.graph = None;
        debug!(
            operation,
            epoch = self.render_epoch,
            steps = self.pipeline.step_count(),
            "committed structural edit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::PipelineKind;

    fn controller() -> InteractionController {
        let mut a = Step::new(StepDraft::new("m1", "1"));
        a.id = StepId::from("a");
        let mut b = Step::new(StepDraft::new("m2", "1"));
        b.id = StepId::from("b");
        a.steps.push(b);

        let mut pipeline = Pipeline::new("demo", PipelineKind::Standard);
        pipeline.steps.push(a);
        InteractionController::new(pipeline, false)
    }

    fn select(controller: &mut InteractionController, id: &str) {
        controller.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::from(
            &StepId::from(id),
        ))));
    }

    #[test]
    fn test_selection_state_transitions() {
        let mut c = controller();
        assert_eq!(*c.state(), SessionState::Idle);

        select(&mut c, "a");
        assert_eq!(
            *c.state(),
            SessionState::NodeSelected(NodeId::from(&StepId::from("a")))
        );

        c.handle_event(SurfaceEvent::SelectionChanged(None));
        assert_eq!(*c.state(), SessionState::Idle);
    }

    #[test]
    fn test_unknown_selection_ignored() {
        let mut c = controller();
        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::from(
            &StepId::from("zzz"),
        ))));
        assert_eq!(*c.state(), SessionState::Idle);
    }

    #[test]
    fn test_forms_are_mutually_exclusive() {
        let mut c = controller();
        select(&mut c, "a");

        c.open_edit().unwrap();
        assert!(matches!(c.state(), SessionState::EditOpen(_)));

        // opening add force-closes the edit form
        c.open_add().unwrap();
        assert!(matches!(c.state(), SessionState::AddOpen(_)));

        c.cancel();
        assert!(matches!(c.state(), SessionState::NodeSelected(_)));
    }

    #[test]
    fn test_add_requires_selection() {
        let mut c = controller();
        assert_eq!(c.open_add(), Err(ActionError::NothingSelected));
    }

    #[test]
    fn test_edit_root_rejected() {
        let mut c = controller();
        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::root())));
        assert_eq!(c.open_edit(), Err(ActionError::RootNotEditable));
    }

    #[test]
    fn test_add_under_selected_node() {
        let mut c = controller();
        select(&mut c, "b");
        c.open_add().unwrap();

        let outcome = c.submit_add(StepDraft::new("m3", "1")).unwrap();
        match &outcome.event {
            EditEvent::Added { step, parent_id } => {
                assert_eq!(step.model, "m3");
                assert_eq!(*parent_id, Some(StepId::from("b")));
            }
            other => panic!("expected Added, got {:?}", other),
        }
        assert_eq!(outcome.epoch, 1);
        assert_eq!(c.steps()[0].steps[0].steps.len(), 1);
        // form is closed again
        assert!(matches!(c.state(), SessionState::NodeSelected(_)));
    }

    #[test]
    fn test_add_under_root_appends_top_level() {
        let mut c = controller();
        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::root())));
        c.open_add().unwrap();

        let outcome = c.submit_add(StepDraft::new("m9", "1")).unwrap();
        match &outcome.event {
            EditEvent::Added { parent_id, .. } => assert_eq!(*parent_id, None),
            other => panic!("expected Added, got {:?}", other),
        }
        assert_eq!(c.steps().len(), 2);
    }

    #[test]
    fn test_submit_without_form_rejected() {
        let mut c = controller();
        select(&mut c, "a");
        assert_eq!(
            c.submit_add(StepDraft::new("m3", "1")),
            Err(ActionError::NoFormOpen)
        );
        assert_eq!(
            c.submit_edit(StepPatch::default()),
            Err(ActionError::NoFormOpen)
        );
    }

    #[test]
    fn test_edit_merges_and_preserves_children() {
        let mut c = controller();
        select(&mut c, "a");
        c.open_edit().unwrap();

        let patch = StepPatch {
            model: Some("m1b".to_string()),
            ..Default::default()
        };
        let outcome = c.submit_edit(patch).unwrap();
        match &outcome.event {
            EditEvent::Updated { step } => {
                assert_eq!(step.model, "m1b");
                assert_eq!(step.steps.len(), 1);
            }
            other => panic!("expected Updated, got {:?}", other),
        }
        assert_eq!(c.steps()[0].model, "m1b");
    }

    #[test]
    fn test_delete_leaf_only_gate() {
        let mut c = controller();
        select(&mut c, "a");
        assert_eq!(
            c.delete_selected(),
            Err(ActionError::HasChildren(StepId::from("a")))
        );

        select(&mut c, "b");
        let outcome = c.delete_selected().unwrap();
        match &outcome.event {
            EditEvent::Removed { step, parent_id } => {
                assert_eq!(step.id, StepId::from("b"));
                assert_eq!(*parent_id, Some(StepId::from("a")));
            }
            other => panic!("expected Removed, got {:?}", other),
        }
        assert!(c.steps()[0].steps.is_empty());
        // selection cleared: the node no longer exists
        assert_eq!(*c.state(), SessionState::Idle);
    }

    #[test]
    fn test_delete_top_level_leaf() {
        let mut c = controller();
        // remove b first so a becomes a leaf
        select(&mut c, "b");
        c.delete_selected().unwrap();

        select(&mut c, "a");
        let outcome = c.delete_selected().unwrap();
        match &outcome.event {
            EditEvent::Removed { parent_id, .. } => assert_eq!(*parent_id, None),
            other => panic!("expected Removed, got {:?}", other),
        }
        assert!(c.steps().is_empty());
    }

    #[test]
    fn test_read_only_blocks_edits() {
        let mut a = Step::new(StepDraft::new("m1", "1"));
        a.id = StepId::from("a");
        let mut pipeline = Pipeline::new("demo", PipelineKind::Standard);
        pipeline.steps.push(a);

        let mut c = InteractionController::new(pipeline, true);
        select(&mut c, "a");
        assert_eq!(c.open_add(), Err(ActionError::ReadOnly));
        assert_eq!(c.open_edit(), Err(ActionError::ReadOnly));
        assert_eq!(c.delete_selected(), Err(ActionError::ReadOnly));
    }

    #[test]
    fn test_non_latest_snapshot_forces_read_only() {
        let mut pipeline = Pipeline::new("demo", PipelineKind::Standard);
        pipeline.version = 2;
        pipeline.is_latest = false;
        let c = InteractionController::new(pipeline, false);
        assert!(c.read_only());
    }

    #[test]
    fn test_epoch_bumps_on_every_commit() {
        let mut c = controller();
        assert_eq!(c.render_epoch(), 0);

        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::root())));
        c.open_add().unwrap();
        c.submit_add(StepDraft::new("x", "1")).unwrap();
        assert_eq!(c.render_epoch(), 1);

        c.open_add().unwrap();
        c.submit_add(StepDraft::new("y", "1")).unwrap();
        assert_eq!(c.render_epoch(), 2);
    }

    #[test]
    fn test_sequential_edits_apply_to_latest_tree() {
        let mut c = controller();
        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::root())));

        c.open_add().unwrap();
        c.submit_add(StepDraft::new("x", "1")).unwrap();
        c.open_add().unwrap();
        c.submit_add(StepDraft::new("y", "1")).unwrap();

        // both edits landed: neither clobbered the other
        assert_eq!(c.steps().len(), 3);
        assert_eq!(c.steps()[1].model, "x");
        assert_eq!(c.steps()[2].model, "y");
    }

    #[test]
    fn test_available_models_scoped_to_ancestors() {
        let mut c = controller();

        select(&mut c, "b");
        c.open_add().unwrap();
        assert_eq!(c.available_models(), vec!["m1", "m2"]);

        c.cancel();
        c.open_edit().unwrap();
        // editing b: only the parent chain is offered
        assert_eq!(c.available_models(), vec!["m1"]);
    }

    #[test]
    fn test_viewport_tracks_anchor() {
        let mut c = controller();
        select(&mut c, "a");
        let unscaled = c.action_anchor().unwrap();

        c.handle_event(SurfaceEvent::ViewportChanged(Viewport {
            x: 10.0,
            y: 20.0,
            zoom: 2.0,
        }));
        let transformed = c.action_anchor().unwrap();
        assert_eq!(transformed.x, unscaled.x * 2.0 + 10.0);
        assert_eq!(transformed.y, unscaled.y * 2.0 + 20.0);
    }

    #[test]
    fn test_drag_stop_moves_node_and_anchor() {
        let mut c = controller();
        select(&mut c, "a");

        c.handle_event(SurfaceEvent::DragStart(NodeId::from(&StepId::from("a"))));
        assert_eq!(c.dragging(), Some(&NodeId::from(&StepId::from("a"))));

        let target = Point { x: 300.0, y: 50.0 };
        c.handle_event(SurfaceEvent::DragStop {
            node: NodeId::from(&StepId::from("a")),
            position: target,
        });

        let node_id = NodeId::from(&StepId::from("a"));
        assert_eq!(c.graph().node(&node_id).unwrap().position, target);
        assert_eq!(c.action_anchor(), Some(target));
    }

    #[test]
    fn test_graph_cache_invalidated_on_commit() {
        let mut c = controller();
        let before = c.graph().node_count();

        c.handle_event(SurfaceEvent::SelectionChanged(Some(NodeId::root())));
        c.open_add().unwrap();
        c.submit_add(StepDraft::new("x", "1")).unwrap();

        assert_eq!(c.graph().node_count(), before + 1);
    }

    #[test]
    fn test_replace_pipeline_resets_session() {
        let mut c = controller();
        select(&mut c, "a");

        let mut replacement = Pipeline::new("demo", PipelineKind::Standard);
        replacement.version = 1;
        replacement.is_latest = false;
        c.replace_pipeline(replacement);

        assert_eq!(*c.state(), SessionState::Idle);
        assert!(c.read_only());
        assert_eq!(c.render_epoch(), 1);
        assert!(c.steps().is_empty());
    }
}
