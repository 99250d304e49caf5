//! Interaction layer: session state machine and rendering boundary

pub mod controller;
pub mod surface;

pub use controller::{ActionError, EditEvent, EditOutcome, InteractionController, SessionState};
pub use surface::{RenderSurface, SurfaceEvent, Viewport};
