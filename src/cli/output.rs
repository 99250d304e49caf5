//! CLI output formatting

use crate::graph::flow::{FlowGraph, FlowNode};
use crate::interaction::surface::RenderSurface;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static GRAPH: Emoji<'_, '_> = Emoji("🗺️  ", "# ");

/// Format one laid-out node for display
pub fn format_node_line(node: &FlowNode) -> String {
    let label = if node.label.is_empty() {
        style("(no model)").red().to_string()
    } else {
        style(&node.label).bold().to_string()
    };
    let categories = if node.categories.is_empty() {
        String::new()
    } else {
        format!(" [{}]", style(node.categories.join(", ")).cyan())
    };
    format!(
        "  {:<40} {}{} @ ({:.0}, {:.0})",
        style(node.id.as_str()).dim(),
        label,
        categories,
        node.position.x,
        node.position.y,
    )
}

/// Rendering surface that prints the graph to the terminal.
///
/// Exists so the CLI exercises the same surface boundary a real diagramming
/// widget would sit behind.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    /// Epoch of the last applied graph
    pub last_epoch: Option<u64>,
}

impl RenderSurface for ConsoleSurface {
    fn apply(&mut self, graph: &FlowGraph, epoch: u64) {
        if self.last_epoch != Some(epoch) {
            // epoch change = full remount
            self.last_epoch = Some(epoch);
        }
        println!(
            "{} {} nodes, {} edges (epoch {})",
            GRAPH,
            graph.node_count(),
            graph.edge_count(),
            epoch
        );
        for node in &graph.nodes {
            println!("{}", format_node_line(node));
        }
        if !graph.edges.is_empty() {
            println!();
            for edge in &graph.edges {
                let label = if edge.label.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", style(&edge.label).cyan())
                };
                println!(
                    "  {} -> {}{}",
                    style(edge.source.as_str()).dim(),
                    style(edge.target.as_str()).dim(),
                    label
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{Pipeline, PipelineKind};
    use crate::graph::mapper::map_pipeline;

    #[test]
    fn test_console_surface_tracks_epoch() {
        let pipeline = Pipeline::new("demo", PipelineKind::Standard);
        let graph = map_pipeline(&pipeline);

        let mut surface = ConsoleSurface::default();
        surface.apply(&graph, 3);
        assert_eq!(surface.last_epoch, Some(3));
    }
}
