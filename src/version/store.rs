//! Snapshot stores for persisted pipeline versions.

use crate::core::pipeline::Pipeline;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving pipeline snapshots
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("pipeline '{name}' version {version:?} not found")]
    NotFound {
        name: String,
        version: Option<u32>,
    },

    #[error("version {requested} is out of range (latest is {latest})")]
    OutOfRange { requested: u32, latest: u32 },

    #[error("latest snapshot has not been fetched yet")]
    LatestUnknown,

    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of immutable pipeline snapshots, keyed by name and version.
///
/// `version = None` means the latest snapshot. Implementations must return
/// each version unchanged on every fetch; snapshots are immutable once
/// written.
pub trait SnapshotStore {
    fn fetch(&self, name: &str, version: Option<u32>) -> Result<Pipeline, VersionError>;
}

/// In-memory snapshot store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: HashMap<String, Vec<Pipeline>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot under its own name and version
    pub fn insert(&mut self, pipeline: Pipeline) {
        self.snapshots
            .entry(pipeline.name.clone())
            .or_default()
            .push(pipeline);
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn fetch(&self, name: &str, version: Option<u32>) -> Result<Pipeline, VersionError> {
        let versions = self
            .snapshots
            .get(name)
            .ok_or_else(|| VersionError::NotFound {
                name: name.to_string(),
                version,
            })?;

        let found = match version {
            Some(v) => versions.iter().find(|p| p.version == v),
            None => versions.iter().max_by_key(|p| p.version),
        };
        found.cloned().ok_or_else(|| VersionError::NotFound {
            name: name.to_string(),
            version,
        })
    }
}

/// Snapshot store backed by a directory of JSON files.
///
/// Snapshots live at `<dir>/<name>.v<version>.json`; the latest version is
/// the highest one present.
#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self, name: &str, version: u32) -> PathBuf {
        self.dir.join(format!("{}.v{}.json", name, version))
    }

    /// Highest version number present for the given pipeline
    fn latest_on_disk(&self, name: &str) -> Result<Option<u32>, VersionError> {
        let prefix = format!("{}.v", name);
        let mut latest = None;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(version) = parse_version(&entry.path(), &prefix) {
                latest = Some(latest.map_or(version, |v: u32| v.max(version)));
            }
        }
        Ok(latest)
    }

    fn read_snapshot(&self, name: &str, version: u32) -> Result<Pipeline, VersionError> {
        let path = self.snapshot_path(name, version);
        if !path.exists() {
            return Err(VersionError::NotFound {
                name: name.to_string(),
                version: Some(version),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

fn parse_version(path: &Path, prefix: &str) -> Option<u32> {
    let file_name = path.file_name()?.to_str()?;
    let rest = file_name.strip_prefix(prefix)?;
    rest.strip_suffix(".json")?.parse().ok()
}

impl SnapshotStore for FileSnapshotStore {
    fn fetch(&self, name: &str, version: Option<u32>) -> Result<Pipeline, VersionError> {
        let version = match version {
            Some(v) => v,
            None => self
                .latest_on_disk(name)?
                .ok_or_else(|| VersionError::NotFound {
                    name: name.to_string(),
                    version: None,
                })?,
        };
        self.read_snapshot(name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::PipelineKind;

    fn snapshot(name: &str, version: u32, is_latest: bool) -> Pipeline {
        let mut p = Pipeline::new(name, PipelineKind::Standard);
        p.version = version;
        p.is_latest = is_latest;
        p
    }

    #[test]
    fn test_in_memory_fetch_specific_version() {
        let mut store = InMemorySnapshotStore::new();
        store.insert(snapshot("demo", 1, false));
        store.insert(snapshot("demo", 2, true));

        let p = store.fetch("demo", Some(1)).unwrap();
        assert_eq!(p.version, 1);
        assert!(!p.is_latest);
    }

    #[test]
    fn test_in_memory_fetch_latest() {
        let mut store = InMemorySnapshotStore::new();
        store.insert(snapshot("demo", 1, false));
        store.insert(snapshot("demo", 3, true));
        store.insert(snapshot("demo", 2, false));

        let p = store.fetch("demo", None).unwrap();
        assert_eq!(p.version, 3);
    }

    #[test]
    fn test_in_memory_unknown_pipeline() {
        let store = InMemorySnapshotStore::new();
        assert!(matches!(
            store.fetch("nope", None),
            Err(VersionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("pipegraph-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let store = FileSnapshotStore::new(&dir);
        for (version, is_latest) in [(1, false), (2, true)] {
            let p = snapshot("demo", version, is_latest);
            std::fs::write(
                dir.join(format!("demo.v{}.json", version)),
                p.to_json_pretty().unwrap(),
            )
            .unwrap();
        }

        assert_eq!(store.fetch("demo", None).unwrap().version, 2);
        assert_eq!(store.fetch("demo", Some(1)).unwrap().version, 1);
        assert!(matches!(
            store.fetch("demo", Some(9)),
            Err(VersionError::NotFound { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
