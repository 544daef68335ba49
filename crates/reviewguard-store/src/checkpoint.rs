//! File-backed checkpoint store.
//!
//! Persists a single RFC 3339 timestamp with nanosecond precision marking the
//! newest record already fully processed. Saves go through a temp file and a
//! rename so a crash mid-write cannot leave a torn value behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no checkpoint at {0}")]
    Missing(PathBuf),

    #[error("checkpoint at {path} is not a valid timestamp: {value:?}")]
    Corrupt { path: PathBuf, value: String },

    #[error("failed to read checkpoint at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist checkpoint at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Durable store for the sweep checkpoint.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last persisted checkpoint.
    ///
    /// A missing file is `CheckpointError::Missing`; the caller decides on a
    /// default starting point (first run) or aborts.
    pub fn load(&self) -> Result<DateTime<Utc>, CheckpointError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CheckpointError::Missing(self.path.clone()));
            }
            Err(e) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let trimmed = raw.trim();
        let ts = DateTime::parse_from_rfc3339(trimmed).map_err(|_| CheckpointError::Corrupt {
            path: self.path.clone(),
            value: trimmed.to_string(),
        })?;
        Ok(ts.with_timezone(&Utc))
    }

    /// Persist a new checkpoint atomically (write temp, then rename).
    ///
    /// On failure the previous on-disk value remains authoritative and the
    /// run must be reported as failed.
    pub fn save(&self, checkpoint: DateTime<Utc>) -> Result<(), CheckpointError> {
        let encoded = checkpoint.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let tmp = self.path.with_extension("tmp");

        fs::write(&tmp, &encoded).map_err(|e| CheckpointError::Persist {
            path: self.path.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| CheckpointError::Persist {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), checkpoint = %encoded, "checkpoint saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_in(dir: &tempfile::TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path().join("checkpoint.txt"))
    }

    #[test]
    fn save_then_load_roundtrips_nanoseconds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let ts = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        store.save(ts).unwrap();

        assert_eq!(store.load().unwrap(), ts);
    }

    #[test]
    fn stored_form_is_rfc3339_with_nanos() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let ts = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap();
        store.save(ts).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "2024-01-10T03:00:00.000000000Z");
    }

    #[test]
    fn load_missing_file_is_missing_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(store.load(), Err(CheckpointError::Missing(_))));
    }

    #[test]
    fn load_garbage_is_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "last tuesday").unwrap();
        assert!(matches!(store.load(), Err(CheckpointError::Corrupt { .. })));
    }

    #[test]
    fn save_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let old = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap();
        store.save(old).unwrap();
        store.save(new).unwrap();

        assert_eq!(store.load().unwrap(), new);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap())
            .unwrap();

        let tmp = store.path().with_extension("tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn save_to_unwritable_path_is_persist_error() {
        let store = CheckpointStore::new("/nonexistent-dir/checkpoint.txt");
        let err = store
            .save(Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap())
            .unwrap_err();
        assert!(matches!(err, CheckpointError::Persist { .. }));
    }
}
