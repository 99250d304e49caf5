//! Read-only navigation across persisted pipeline versions.

use crate::core::pipeline::Pipeline;
use crate::version::store::{SnapshotStore, VersionError};
use tracing::info;

/// Enumerates and switches between immutable historical snapshots of a
/// persisted pipeline.
///
/// The latest version number becomes known once the latest snapshot has
/// been fetched; after that `versions()` enumerates `1..=latest`. Selecting
/// a version replaces the current pipeline wholesale — there is no edit
/// path through the navigator, and versions are never merged or diffed.
pub struct VersionNavigator<S: SnapshotStore> {
    store: S,
    name: String,
    latest_version: Option<u32>,
    current: Option<Pipeline>,
}

impl<S: SnapshotStore> VersionNavigator<S> {
    pub fn new(store: S, name: impl Into<String>) -> Self {
        VersionNavigator {
            store,
            name: name.into(),
            latest_version: None,
            current: None,
        }
    }

    /// Fetch the latest snapshot and learn the latest version number
    pub fn load_latest(&mut self) -> Result<&Pipeline, VersionError> {
        let pipeline = self.store.fetch(&self.name, None)?;
        if pipeline.is_latest {
            self.latest_version = Some(pipeline.version);
        }
        info!(
            pipeline = %self.name,
            version = pipeline.version,
            "loaded latest snapshot"
        );
        Ok(self.current.insert(pipeline))
    }

    /// Candidate version numbers, `1..=latest`; empty until the latest
    /// snapshot has been fetched once
    pub fn versions(&self) -> Vec<u32> {
        match self.latest_version {
            Some(latest) => (1..=latest).collect(),
            None => Vec::new(),
        }
    }

    /// Switch to a specific immutable snapshot
    pub fn select(&mut self, version: u32) -> Result<&Pipeline, VersionError> {
        let latest = self.latest_version.ok_or(VersionError::LatestUnknown)?;
        if version == 0 || version > latest {
            return Err(VersionError::OutOfRange {
                requested: version,
                latest,
            });
        }

        let pipeline = self.store.fetch(&self.name, Some(version))?;
        info!(
            pipeline = %self.name,
            version,
            "switched to snapshot"
        );
        Ok(self.current.insert(pipeline))
    }

    /// The currently selected snapshot, if any has been fetched
    pub fn current(&self) -> Option<&Pipeline> {
        self.current.as_ref()
    }

    /// Version of the currently selected snapshot
    pub fn selected_version(&self) -> Option<u32> {
        self.current.as_ref().map(|p| p.version)
    }

    /// Latest version number, once known
    pub fn latest_version(&self) -> Option<u32> {
        self.latest_version
    }

    /// Version views are read-only unless the current snapshot is the
    /// latest one
    pub fn read_only(&self) -> bool {
        self.current.as_ref().map_or(true, |p| !p.is_latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::PipelineKind;
    use crate::version::store::InMemorySnapshotStore;

    fn navigator() -> VersionNavigator<InMemorySnapshotStore> {
        let mut store = InMemorySnapshotStore::new();
        for version in 1..=3 {
            let mut p = Pipeline::new("demo", PipelineKind::Standard);
            p.version = version;
            p.is_latest = version == 3;
            store.insert(p);
        }
        VersionNavigator::new(store, "demo")
    }

    #[test]
    fn test_versions_empty_until_latest_fetched() {
        let mut nav = navigator();
        assert!(nav.versions().is_empty());

        nav.load_latest().unwrap();
        assert_eq!(nav.versions(), vec![1, 2, 3]);
        assert_eq!(nav.latest_version(), Some(3));
    }

    #[test]
    fn test_select_replaces_current_wholesale() {
        let mut nav = navigator();
        nav.load_latest().unwrap();
        assert_eq!(nav.selected_version(), Some(3));
        assert!(!nav.read_only());

        nav.select(1).unwrap();
        assert_eq!(nav.selected_version(), Some(1));
        assert!(nav.read_only());
    }

    #[test]
    fn test_select_before_load_rejected() {
        let mut nav = navigator();
        assert!(matches!(nav.select(1), Err(VersionError::LatestUnknown)));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut nav = navigator();
        nav.load_latest().unwrap();
        assert!(matches!(
            nav.select(4),
            Err(VersionError::OutOfRange {
                requested: 4,
                latest: 3
            })
        ));
        assert!(matches!(nav.select(0), Err(VersionError::OutOfRange { .. })));
        // current snapshot is untouched on failure
        assert_eq!(nav.selected_version(), Some(3));
    }

    #[test]
    fn test_read_only_without_snapshot() {
        let nav = navigator();
        assert!(nav.read_only());
        assert!(nav.current().is_none());
    }
}
