//! Derived flow-graph types.
//!
//! Flow nodes and edges are ephemeral: they are recomputed from scratch
//! whenever the step forest changes or a version switch occurs, and they
//! are never persisted or diffed incrementally.

use crate::core::step::{Step, StepId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Sentinel id of the synthetic pipeline root node
pub const ROOT_NODE_ID: &str = "root";

/// Identifier of a flow node: mirrors a step id, or the root sentinel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// The synthetic root node's id
    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_NODE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The step id this node mirrors, if it is not the root
    pub fn as_step_id(&self) -> Option<StepId> {
        if self.is_root() {
            None
        } else {
            Some(StepId::from(self.0.as_str()))
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&StepId> for NodeId {
    fn from(id: &StepId) -> Self {
        Self(id.as_str().to_string())
    }
}

/// A screen position, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };
}

/// One node of the derived flow graph.
///
/// `step` holds a copy of the originating step taken at mapping time (the
/// whole subtree, matching the source forest). The graph is rebuilt after
/// every committed edit, so the copy can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    /// Mirrors a step id, or the root sentinel
    pub id: NodeId,

    /// Display label (the step's model name; pipeline name for the root)
    pub label: String,

    /// Model names along the path from the root to this node, in order.
    /// Used to scope model choices for descendants; empty means
    /// unrestricted (the root).
    pub ancestor_models: Vec<String>,

    /// Categories of the backing step (or the whole pipeline for the root)
    pub categories: Vec<String>,

    /// The originating step; `None` for the synthetic root
    pub step: Option<Step>,

    /// Assigned by the layout pass; zero until then
    pub position: Point,
}

/// One parent -> child relation of the derived flow graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    /// Unique edge id, derived from the endpoint ids
    pub id: String,

    /// Parent node id
    pub source: NodeId,

    /// Child node id
    pub target: NodeId,

    /// The child step's categories joined for display
    pub label: String,
}

/// The full derived graph: nodes, edges, and the parent relation.
///
/// The parent relation is a lookup map rather than a back-pointer on the
/// node, so parent and child never reference each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    /// All nodes, in depth-first mapping order (root first)
    pub nodes: Vec<FlowNode>,

    /// One edge per parent -> child relation
    pub edges: Vec<FlowEdge>,

    /// Child node id -> parent node id
    #[serde(skip)]
    pub parents: HashMap<NodeId, NodeId>,
}

impl FlowGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by id
    pub fn node(&self, id: &NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == *id)
    }

    /// Parent of a node, `None` for the root
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// Child node ids in edge order
    pub fn children_of(&self, id: &NodeId) -> Vec<&NodeId> {
        self.edges
            .iter()
            .filter(|e| e.source == *id)
            .map(|e| &e.target)
            .collect()
    }
}
