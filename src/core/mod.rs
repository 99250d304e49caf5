//! Core domain models for pipeline step trees
//!
//! This module defines the persisted data structures (pipelines and their
//! step forests) and the pure structural edit operations over them.

pub mod edit;
pub mod pipeline;
pub mod step;

pub use pipeline::*;
pub use step::*;
