//! Derives a flow graph from a pipeline's step forest.

use crate::core::pipeline::Pipeline;
use crate::core::step::Step;
use crate::graph::flow::{FlowEdge, FlowGraph, FlowNode, NodeId, Point};
use tracing::debug;

/// Delimiter used when joining a step's categories into an edge label
const CATEGORY_DELIMITER: &str = ", ";

/// Map a pipeline's step forest to an unlayouted flow graph.
///
/// One synthetic root node is created for the pipeline itself; every step
/// becomes exactly one node, every parent -> child relation exactly one
/// edge. The walk is depth-first with children visited in array order,
/// which fixes node ordering but has no further semantic effect.
pub fn map_pipeline(pipeline: &Pipeline) -> FlowGraph {
    let mut graph = FlowGraph::default();

    graph.nodes.push(FlowNode {
        id: NodeId::root(),
        label: pipeline.name.clone(),
        ancestor_models: Vec::new(),
        categories: pipeline.meta.categories.clone(),
        step: None,
        position: Point::ZERO,
    });

    for step in &pipeline.steps {
        walk(&mut graph, step, &NodeId::root(), &[]);
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        pipeline = %pipeline.name,
        "mapped step forest to flow graph"
    );
    graph
}

fn walk(graph: &mut FlowGraph, step: &Step, parent: &NodeId, parent_models: &[String]) {
    let id = NodeId::from(&step.id);

    let mut ancestor_models = parent_models.to_vec();
    ancestor_models.push(step.model.clone());

    graph.nodes.push(FlowNode {
        id: id.clone(),
        label: step.model.clone(),
        ancestor_models: ancestor_models.clone(),
        categories: step.categories.clone(),
        step: Some(step.clone()),
        position: Point::ZERO,
    });

    graph.edges.push(FlowEdge {
        id: format!("{}->{}", parent, id),
        source: parent.clone(),
        target: id.clone(),
        label: step.categories.join(CATEGORY_DELIMITER),
    });

    graph.parents.insert(id.clone(), parent.clone());

    for child in &step.steps {
        walk(graph, child, &id, &ancestor_models);
    }
}
