//! Rendering-surface boundary.
//!
//! The editing core has no compile-time dependency on any drawing
//! technology: a surface is anything that can draw a positioned node/edge
//! list and report selection, drag, and pan/zoom events back as
//! [`SurfaceEvent`] values.

use crate::graph::flow::{FlowGraph, NodeId, Point};
use serde::Serialize;

/// Pan/zoom transform of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Horizontal pan offset
    pub x: f64,
    /// Vertical pan offset
    pub y: f64,
    /// Zoom factor, 1.0 = unscaled
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Events a rendering surface reports to the controller.
///
/// Move-start, move, and move-end all report the current transform through
/// `ViewportChanged`; the controller only tracks the latest value.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A single node was selected, or the selection was cleared (`None`)
    SelectionChanged(Option<NodeId>),
    /// A node drag started
    DragStart(NodeId),
    /// A node drag finished at the given position
    DragStop { node: NodeId, position: Point },
    /// The pan/zoom transform changed
    ViewportChanged(Viewport),
}

/// A rendering surface the controller can push graphs to.
///
/// `epoch` identifies the committed tree generation; a surface should treat
/// a changed epoch as a full remount (no selection or viewport state may
/// leak across structurally different graphs).
pub trait RenderSurface {
    fn apply(&mut self, graph: &FlowGraph, epoch: u64);
}
