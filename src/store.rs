//! Record persistence with file locking.
//!
//! Each collection (goals, trophies, achievements, logs, settings) is saved
//! as one JSON document under a fixed file name in the data directory,
//! mirroring the fixed-key blob model the engine's consumers expect. Writes
//! are atomic: temp file, exclusive lock, fsync, rename.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::achievements::AchievementSet;
use crate::error::{Error, Result};
use crate::goals::GoalSet;
use crate::history::{CardioLog, StrengthLog};
use crate::trophies::TrophyCase;
use crate::types::Settings;

/// Current on-disk schema version for every record type
pub const SCHEMA_VERSION: u32 = 1;

/// A collection persisted as one JSON document under a fixed file name
pub trait Record: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;

    /// Schema version stamped in the stored document
    fn schema_version(&self) -> u32;
}

impl Record for GoalSet {
    const FILE_NAME: &'static str = "goals.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Record for TrophyCase {
    const FILE_NAME: &'static str = "trophies.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Record for AchievementSet {
    const FILE_NAME: &'static str = "achievements.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Record for StrengthLog {
    const FILE_NAME: &'static str = "weightlifting.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Record for CardioLog {
    const FILE_NAME: &'static str = "cardio.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Record for Settings {
    const FILE_NAME: &'static str = "settings.json";
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// Handle to the data directory holding every record file
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Store {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of one record's file
    pub fn path_for<R: Record>(&self) -> PathBuf {
        self.data_dir.join(R::FILE_NAME)
    }

    /// Load a record with shared locking.
    ///
    /// A missing file yields the default record. Unreadable or corrupt JSON
    /// also yields the default with a warning, so corrupted local data
    /// degrades gracefully instead of breaking the dashboard. A schema
    /// version from the future is an error: newer data must never be
    /// silently clobbered by an older build.
    pub fn load<R: Record>(&self) -> Result<R> {
        let path = self.path_for::<R>();
        if !path.exists() {
            tracing::debug!("No record file at {:?}, using default", path);
            return Ok(R::default());
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}. Using default.", path, e);
                return Ok(R::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}. Using default.", path, e);
            return Ok(R::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read {:?}: {}. Using default.", path, e);
            return Ok(R::default());
        }

        file.unlock()?;

        match serde_json::from_str::<R>(&contents) {
            Ok(record) => {
                if record.schema_version() > SCHEMA_VERSION {
                    return Err(Error::Store(format!(
                        "{} has schema version {} but this build supports up to {}",
                        R::FILE_NAME,
                        record.schema_version(),
                        SCHEMA_VERSION
                    )));
                }
                tracing::debug!("Loaded {:?}", path);
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Using default.", path, e);
                Ok(R::default())
            }
        }
    }

    /// Save a record atomically with exclusive locking.
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// over the original so readers never observe a partial document.
    pub fn save<R: Record>(&self, record: &R) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.path_for::<R>();

        let temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(record)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::GoalKind;
    use crate::types::WeightUnit;
    use chrono::{TimeZone, Utc};

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_missing_file_yields_default() {
        let (_dir, store) = test_store();
        let goals: GoalSet = store.load().unwrap();
        assert!(goals.is_empty());
        assert_eq!(goals.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, store) = test_store();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        let mut goals = GoalSet::default();
        goals
            .add(
                crate::types::RecurrencePeriod::Weekly,
                GoalKind::Weightlifting {
                    unit: WeightUnit::Lbs,
                },
                1000.0,
                now,
            )
            .unwrap();
        store.save(&goals).unwrap();

        let loaded: GoalSet = store.load().unwrap();
        assert_eq!(loaded, goals);
    }

    #[test]
    fn test_corrupt_file_yields_default() {
        let (_dir, store) = test_store();
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(store.path_for::<TrophyCase>(), "{ not json }").unwrap();

        let trophies: TrophyCase = store.load().unwrap();
        assert!(trophies.is_empty());
    }

    #[test]
    fn test_future_schema_version_is_an_error() {
        let (_dir, store) = test_store();
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(
            store.path_for::<GoalSet>(),
            format!(r#"{{"schema_version": {}}}"#, SCHEMA_VERSION + 1),
        )
        .unwrap();

        let result: Result<GoalSet> = store.load();
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let (dir, store) = test_store();
        store.save(&GoalSet::default()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "goals.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only goals.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_each_record_has_its_own_file() {
        let (_dir, store) = test_store();
        store.save(&GoalSet::default()).unwrap();
        store.save(&TrophyCase::default()).unwrap();
        store.save(&AchievementSet::default()).unwrap();
        store.save(&StrengthLog::default()).unwrap();
        store.save(&CardioLog::default()).unwrap();
        store.save(&Settings::default()).unwrap();

        for name in [
            "goals.json",
            "trophies.json",
            "achievements.json",
            "weightlifting.json",
            "cardio.json",
            "settings.json",
        ] {
            assert!(store.data_dir().join(name).exists(), "missing {}", name);
        }
    }
}
