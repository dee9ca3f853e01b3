//! Record loading from a data directory.
//!
//! Every record is read from a `.ron` or `.json` file, picked by extension.
//! A data directory looks like this:
//!
//! ```text
//! assets/data/
//! ├── atlas.ron
//! ├── units.ron
//! ├── weapons.ron
//! ├── classes.ron
//! ├── rules.ron        (optional)
//! └── maps/
//!     └── prologue.ron
//! ```
//!
//! Maps name their atlas by a path relative to the data directory. Missing
//! unit, weapon or class files are not fatal: the loader warns and carries
//! on with empty records, which the core then handles with its fallbacks.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use tactics_core::data::{AtlasData, ClassesData, MapData, UnitsData, WeaponsData};
use tactics_core::prelude::*;

/// Errors that can occur while loading records from disk.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a RON file.
    #[error("Failed to parse RON file '{path}': {source}")]
    RonError {
        /// Path to the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Failed to parse a JSON file or protocol line.
    #[error("Failed to parse JSON '{path}': {source}")]
    JsonError {
        /// Path to the file, or the stream the line came from.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// File extension is neither `.ron` nor `.json`.
    #[error("Unsupported record format: '{0}' (expected .ron or .json)")]
    UnsupportedFormat(String),

    /// A map record failed its consistency checks.
    #[error("Validation failed for map '{map}': {errors:?}")]
    ValidationError {
        /// Map that failed validation.
        map: String,
        /// List of validation errors.
        errors: Vec<String>,
    },

    /// A map did not name an atlas.
    #[error("Map '{0}' does not reference an atlas")]
    MissingAtlas(String),

    /// The core rejected the records.
    #[error(transparent)]
    Core(#[from] TacticsError),
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = std::result::Result<T, DataLoadError>;

/// Load one record, picking the parser from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or has an
/// unsupported extension.
pub fn load_record<T: DeserializeOwned>(path: &Path) -> DataLoadResult<T> {
    let path_str = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    // Check the format before touching the file
    if !matches!(extension.as_deref(), Some("ron" | "json")) {
        return Err(DataLoadError::UnsupportedFormat(path_str));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| DataLoadError::IoError {
        path: path_str.clone(),
        source: e,
    })?;

    let record = if extension.as_deref() == Some("json") {
        serde_json::from_str(&contents).map_err(|e| DataLoadError::JsonError {
            path: path_str.clone(),
            source: e,
        })?
    } else {
        ron::from_str(&contents).map_err(|e| DataLoadError::RonError {
            path: path_str.clone(),
            source: e,
        })?
    };

    tracing::debug!("Loaded record from {path_str}");
    Ok(record)
}

/// Find `<stem>.ron` or `<stem>.json` in `dir`, preferring RON.
#[must_use]
pub fn find_record(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["ron", "json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

/// Load `<stem>` from `dir`, or its default if no file exists.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be read or parsed.
pub fn load_or_default<T: DeserializeOwned + Default>(dir: &Path, stem: &str) -> DataLoadResult<T> {
    match find_record(dir, stem) {
        Some(path) => load_record(&path),
        None => {
            tracing::warn!("No {stem} records in {}, continuing without", dir.display());
            Ok(T::default())
        }
    }
}

/// Unit, weapon and class records plus rules shared by every map.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    /// Unit records per faction.
    pub units: UnitsData,
    /// Weapon records per category.
    pub weapons: WeaponsData,
    /// Class records.
    pub classes: ClassesData,
    /// Session rules.
    pub rules: Rules,
    /// Directory the records came from; atlases resolve against it.
    pub root: PathBuf,
}

impl DataSet {
    /// Load the shared records from a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a present file
    /// fails to parse.
    pub fn load(dir: &Path) -> DataLoadResult<Self> {
        if !dir.is_dir() {
            return Err(DataLoadError::IoError {
                path: dir.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let units: UnitsData = load_or_default(dir, "units")?;
        let weapons: WeaponsData = load_or_default(dir, "weapons")?;
        let classes: ClassesData = load_or_default(dir, "classes")?;
        let rules = match find_record(dir, "rules") {
            Some(path) => load_record(&path)?,
            None => {
                tracing::debug!("No rules file in {}, using defaults", dir.display());
                Rules::default()
            }
        };

        tracing::info!(
            "Loaded data from {}: {} unit records, {} weapons, {} classes",
            dir.display(),
            units.values().map(std::collections::BTreeMap::len).sum::<usize>(),
            weapons.len(),
            classes.len()
        );

        Ok(Self {
            units,
            weapons,
            classes,
            rules,
            root: dir.to_path_buf(),
        })
    }

    /// Load a map and the atlas it references.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or malformed, or if the
    /// map fails validation.
    pub fn load_map(&self, map_path: &Path) -> DataLoadResult<LoadedMap> {
        let map: MapData = load_record(map_path)?;

        let errors = map.validate();
        if !errors.is_empty() {
            return Err(DataLoadError::ValidationError {
                map: map.name.clone(),
                errors,
            });
        }

        let atlas_ref = map
            .atlas
            .as_deref()
            .ok_or_else(|| DataLoadError::MissingAtlas(map.name.clone()))?;
        let atlas: AtlasData = load_record(&self.root.join(atlas_ref))?;

        tracing::info!(
            "Loaded map '{}' ({}x{}, {} layers, {} units) with atlas {atlas_ref}",
            map.name,
            map.width,
            map.height,
            map.layers.len(),
            map.units.len()
        );

        Ok(LoadedMap { map, atlas })
    }

    /// Load a map into `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be loaded or the core rejects the
    /// records. The session keeps its previous map in either case.
    pub fn load_into(&self, map_path: &Path, session: &mut MapSession) -> DataLoadResult<()> {
        let loaded = self.load_map(map_path)?;
        session.load(
            &loaded.map,
            &loaded.atlas,
            &self.units,
            &self.weapons,
            &self.classes,
            self.rules.clone(),
        )?;
        Ok(())
    }

    /// A fresh session with the given map loaded.
    ///
    /// # Errors
    ///
    /// See [`DataSet::load_into`].
    pub fn session(&self, map_path: &Path) -> DataLoadResult<MapSession> {
        let mut session = MapSession::new();
        self.load_into(map_path, &mut session)?;
        Ok(session)
    }
}

/// A map record together with its atlas.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    /// Map record.
    pub map: MapData,
    /// Atlas the map references.
    pub atlas: AtlasData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let result: DataLoadResult<Rules> = load_record(Path::new("rules.toml"));
        assert!(matches!(result, Err(DataLoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: DataLoadResult<Rules> = load_record(Path::new("does/not/exist.ron"));
        assert!(matches!(result, Err(DataLoadError::IoError { .. })));
    }

    #[test]
    fn test_ron_preferred_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rules.json"), "{}").unwrap();
        std::fs::write(dir.path().join("rules.ron"), "()").unwrap();
        let found = find_record(dir.path(), "rules").unwrap();
        assert_eq!(found.extension().unwrap(), "ron");
    }

    #[test]
    fn test_empty_directory_gives_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataSet::load(dir.path()).unwrap();
        assert!(data.units.is_empty());
        assert!(data.classes.is_empty());
        assert_eq!(data.rules, Rules::default());
    }

    #[test]
    fn test_missing_directory_is_error() {
        assert!(DataSet::load(Path::new("no/such/data/dir")).is_err());
    }
}
