//! Flow-graph derivation and layout
//!
//! A pipeline's step forest is mapped to an ephemeral node/edge graph
//! suitable for rendering, then positioned by a layered layout pass.

pub mod flow;
pub mod layout;
pub mod mapper;

pub use flow::{FlowEdge, FlowGraph, FlowNode, NodeId, Point, ROOT_NODE_ID};
pub use layout::{layout, NODE_HEIGHT, NODE_WIDTH};
pub use mapper::map_pipeline;
