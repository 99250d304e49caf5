//! pipegraph - pipeline step-tree editing core
//!
//! An operator composes a processing pipeline as a tree of configurable
//! steps; this crate keeps that authoritative step tree consistent with a
//! derived, positioned flow graph through every structural edit.
//!
//! - [`core`] - the persisted data model ([`Pipeline`], [`Step`]) and pure
//!   structural edit operations (insert/replace/remove by id)
//! - [`graph`] - tree-to-graph mapping and layered left-to-right layout
//! - [`interaction`] - a per-session state machine routing selection,
//!   pan/zoom, and add/edit/delete actions through the edit engine
//! - [`version`] - read-only navigation across immutable pipeline snapshots
//! - [`cli`] - the `pipegraph` inspection binary

pub mod cli;
pub mod core;
pub mod graph;
pub mod interaction;
pub mod version;

// Re-export commonly used types
pub use crate::core::{Pipeline, PipelineKind, PipelineMeta, Step, StepDraft, StepId, StepPatch};
pub use graph::{layout, map_pipeline, FlowEdge, FlowGraph, FlowNode, NodeId, Point};
pub use interaction::{
    ActionError, EditEvent, EditOutcome, InteractionController, RenderSurface, SessionState,
    SurfaceEvent, Viewport,
};
pub use version::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore, VersionError, VersionNavigator};
