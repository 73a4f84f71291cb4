//! File-backed baseline snapshot.

use std::path::{Path, PathBuf};

use tracing::debug;

use foreman_core::{Baseline, BaselineStore};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Stores the baseline as `{"root": ..., "paths": [...]}` in a single file.
pub struct FileBaselineStore {
    path: PathBuf,
}

impl FileBaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the state directory.
    pub fn from_default_location() -> Self {
        Self::new(foreman_core::structure_cache_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the baseline; a missing file is an empty baseline.
    pub fn read(&self) -> Result<Baseline> {
        let baseline = read_json_optional(&self.path)?.unwrap_or_default();
        Ok(baseline)
    }

    pub fn write(&self, baseline: &Baseline) -> Result<()> {
        atomic_write_json(&self.path, baseline)?;
        debug!(path = %self.path.display(), paths = baseline.paths.len(), "Baseline saved");
        Ok(())
    }
}

impl BaselineStore for FileBaselineStore {
    fn load(&self) -> foreman_core::Result<Baseline> {
        Ok(self.read()?)
    }

    fn save(&self, baseline: &Baseline) -> foreman_core::Result<()> {
        Ok(self.write(baseline)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_baseline() {
        let dir = tempdir().unwrap();
        let store = FileBaselineStore::new(dir.path().join("structure_cache.json"));

        let baseline = store.load().unwrap();
        assert_eq!(baseline, Baseline::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileBaselineStore::new(dir.path().join("state/structure_cache.json"));
        let baseline = Baseline::new("Школа_65", vec!["Здание".into(), "Здание/Фасады".into()]);

        store.save(&baseline).unwrap();

        assert_eq!(store.load().unwrap(), baseline);
    }

    #[test]
    fn test_reads_hand_written_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("structure_cache.json");
        std::fs::write(&path, r#"{"root": "Project", "paths": ["A", "A/B"]}"#).unwrap();

        let baseline = FileBaselineStore::new(&path).load().unwrap();
        assert_eq!(baseline.root, "Project");
        assert_eq!(baseline.paths, vec!["A", "A/B"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("structure_cache.json");
        std::fs::write(&path, "{}").unwrap();

        assert_eq!(FileBaselineStore::new(&path).load().unwrap(), Baseline::default());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("structure_cache.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = FileBaselineStore::new(&path).load().unwrap_err();
        assert!(matches!(err, foreman_core::CoreError::Storage(_)));
    }
}
