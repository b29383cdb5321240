//! Snapshot persistence.
//!
//! A save is one JSON document holding an [`EncounterSnapshot`] plus a
//! small header. Writes go to a temp file first and are renamed into place.

use duskfall_common::DuskfallError;
use duskfall_gameplay::EncounterSnapshot;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Errors that can occur during save operations.
#[derive(Debug, Error)]
pub enum SaveError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Save written by a newer format.
    #[error("Save version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch {
        /// Newest supported version.
        expected: u32,
        /// Version in the file.
        found: u32,
    },
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

impl From<SaveError> for DuskfallError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Io(e) => Self::Io(e),
            SaveError::Json(e) => Self::Serialization(e.to_string()),
            e @ SaveError::VersionMismatch { .. } => Self::Serialization(e.to_string()),
        }
    }
}

/// On-disk save document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Format version
    pub version: u32,
    /// Fixed steps simulated when the save was taken
    pub steps: u64,
    /// Encounter state
    pub snapshot: EncounterSnapshot,
}

impl SaveFile {
    /// Wraps a snapshot taken after `steps` steps.
    #[must_use]
    pub fn new(steps: u64, snapshot: EncounterSnapshot) -> Self {
        Self {
            version: SAVE_VERSION,
            steps,
            snapshot,
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `save` to `path` as pretty JSON (temp file + rename).
pub fn write_save(path: &Path, save: &SaveFile) -> SaveResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    {
        let file = File::create(&temp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, save)?;
        writer.flush()?;
    }

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }

    info!(
        "Saved encounter after {} steps to {}",
        save.steps,
        path.display()
    );
    Ok(())
}

/// Reads a save from `path`.
pub fn read_save(path: &Path) -> SaveResult<SaveFile> {
    let file = File::open(path)?;
    let save: SaveFile = serde_json::from_reader(BufReader::new(file))?;

    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save.version,
        });
    }

    debug!(
        "Loaded save v{} ({} enemies) from {}",
        save.version,
        save.snapshot.enemies.len(),
        path.display()
    );
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duskfall_gameplay::{Encounter, EncounterConfig, EncounterMode, NullEffects, PlayerInput};
    use tempfile::TempDir;

    fn snapshot() -> EncounterSnapshot {
        let mut encounter =
            Encounter::new(EncounterConfig::default(), EncounterMode::Cycle).expect("valid");
        for _ in 0..30 {
            encounter.tick(1.0 / 60.0, PlayerInput::NONE, &mut NullEffects);
        }
        encounter.snapshot()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("runs").join("last.json");
        let save = SaveFile::new(30, snapshot());

        write_save(&path, &save).expect("save");
        assert!(!temp_path(&path).exists());

        let loaded = read_save(&path).expect("load");
        assert_eq!(loaded, save);

        let restored =
            Encounter::from_snapshot(EncounterConfig::default(), &loaded.snapshot).expect("restore");
        assert_eq!(restored.snapshot(), save.snapshot);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("future.json");
        let save = SaveFile {
            version: SAVE_VERSION + 1,
            ..SaveFile::new(0, snapshot())
        };
        write_save(&path, &save).expect("save");

        assert!(matches!(
            read_save(&path),
            Err(SaveError::VersionMismatch { found, .. }) if found == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(read_save(&missing), Err(SaveError::Io(_))));

        let corrupt = temp_dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ \"version\": 1,").expect("write");
        assert!(matches!(read_save(&corrupt), Err(SaveError::Json(_))));

        let top: DuskfallError = read_save(&corrupt).expect_err("corrupt").into();
        assert!(matches!(top, DuskfallError::Serialization(_)));
        let top: DuskfallError = read_save(&missing).expect_err("missing").into();
        assert!(matches!(top, DuskfallError::Io(_)));
    }
}
