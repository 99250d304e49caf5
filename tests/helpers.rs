//! Shared builders for pipegraph tests
#![allow(dead_code)]

use pipegraph::core::{Pipeline, PipelineKind, Step, StepId};
use pipegraph::graph::FlowGraph;
use pipegraph::interaction::RenderSurface;

/// A leaf step with a fixed id
pub fn step(id: &str, model: &str) -> Step {
    Step {
        id: StepId::from(id),
        model: model.to_string(),
        version: "1".to_string(),
        categories: Vec::new(),
        args: Default::default(),
        steps: Vec::new(),
    }
}

/// A step with children
pub fn branch(id: &str, model: &str, children: Vec<Step>) -> Step {
    let mut s = step(id, model);
    s.steps = children;
    s
}

/// A latest-version pipeline over the given forest
pub fn pipeline(steps: Vec<Step>) -> Pipeline {
    let mut p = Pipeline::new("test-pipeline", PipelineKind::Standard);
    p.steps = steps;
    p
}

/// Surface that records every applied graph generation
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub applied: Vec<(u64, usize, usize)>,
}

impl RenderSurface for RecordingSurface {
    fn apply(&mut self, graph: &FlowGraph, epoch: u64) {
        self.applied
            .push((epoch, graph.node_count(), graph.edge_count()));
    }
}
