//! Hierarchical left-to-right layout for flow graphs.
//!
//! Layered layout: every node is assigned a rank (column) equal to its
//! depth below the synthetic root, nodes within a rank keep mapping order,
//! and columns are centered vertically against the tallest rank. Rank and
//! order assignment are deterministic for a fixed graph shape; only the
//! sub-pixel x jitter varies between runs.

use crate::graph::flow::{FlowGraph, NodeId, Point};
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Nominal node width used for rank spacing
pub const NODE_WIDTH: f64 = 172.0;
/// Nominal node height used for row spacing
pub const NODE_HEIGHT: f64 = 36.0;

/// Horizontal gap between ranks
const RANK_GAP: f64 = 80.0;
/// Vertical gap between nodes within a rank
const NODE_GAP: f64 = 24.0;
/// Fixed offset translating the layout away from the origin
const PADDING: f64 = 24.0;

/// Assign positions to every node of the graph, in place.
///
/// A sub-pixel random jitter (strictly less than 0.5) is added to every
/// node's x coordinate on each run, so a rendering surface that compares
/// positions always observes a change after a re-layout, even when the
/// computed layout is numerically identical to the previous one.
pub fn layout(graph: &mut FlowGraph) {
    let ranks = compute_ranks(graph);

    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new(); max_rank + 1];
    // nodes vec is in depth-first mapping order; keep it within each rank
    for node in &graph.nodes {
        if let Some(rank) = ranks.get(&node.id) {
            buckets[*rank].push(node.id.clone());
        }
    }

    let rank_height = |count: usize| -> f64 {
        if count == 0 {
            0.0
        } else {
            count as f64 * NODE_HEIGHT + (count - 1) as f64 * NODE_GAP
        }
    };
    let tallest = buckets.iter().map(|b| rank_height(b.len())).fold(0.0, f64::max);

    let mut rng = rand::rng();
    for (rank, bucket) in buckets.iter().enumerate() {
        let x = PADDING + rank as f64 * (NODE_WIDTH + RANK_GAP);
        let top = PADDING + (tallest - rank_height(bucket.len())) / 2.0;
        for (row, id) in bucket.iter().enumerate() {
            let jitter = rng.random::<f64>() * 0.5;
            if let Some(node) = graph.node_mut(id) {
                node.position = Point {
                    x: x + jitter,
                    y: top + row as f64 * (NODE_HEIGHT + NODE_GAP),
                };
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ranks = max_rank + 1,
        "layout pass complete"
    );
}

/// Rank (column) per node: the longest path distance from the root.
///
/// For the trees produced by the mapper this is simply the depth; the graph
/// is assumed to be a finite DAG (guaranteed structurally by fresh-id,
/// append-only tree construction).
pub fn compute_ranks(graph: &FlowGraph) -> HashMap<NodeId, usize> {
    let mut ranks: HashMap<NodeId, usize> = HashMap::new();
    ranks.insert(NodeId::root(), 0);

    let mut queue = VecDeque::new();
    queue.push_back(NodeId::root());
    while let Some(id) = queue.pop_front() {
        let rank = ranks[&id];
        for edge in graph.edges.iter().filter(|e| e.source == id) {
            let child_rank = ranks.entry(edge.target.clone()).or_insert(0);
            if *child_rank < rank + 1 {
                *child_rank = rank + 1;
                queue.push_back(edge.target.clone());
            }
        }
    }
    ranks
}
