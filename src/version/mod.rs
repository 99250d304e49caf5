//! Version navigation over immutable pipeline snapshots

pub mod navigator;
pub mod store;

pub use navigator::VersionNavigator;
pub use store::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore, VersionError};
