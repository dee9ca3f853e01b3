//! Data validation utilities.
//!
//! Checks a data directory for problems the core would only surface at map
//! load time, or would silently paper over with fallbacks.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tactics_core::data::{AtlasData, MapData, WeaponsData};
use tactics_core::prelude::*;

use crate::data_loader::{load_record, DataLoadError, DataLoadResult, DataSet};

/// Outcome of validating a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make a map fail to load.
    pub errors: Vec<String>,
    /// Problems the core tolerates with a fallback.
    pub warnings: Vec<String>,
    /// Number of maps checked.
    pub maps_checked: usize,
}

impl ValidationReport {
    /// Whether no errors were found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate all records in a data directory, including every map under
/// `maps/`.
///
/// # Errors
///
/// Returns an error if the shared records cannot be loaded at all. Problems
/// inside individual maps are collected into the report instead.
pub fn validate_data_directory(path: &Path) -> DataLoadResult<ValidationReport> {
    let data = DataSet::load(path)?;
    let mut report = ValidationReport::default();

    check_weapons(&data.weapons, &mut report);
    check_units(&data, &mut report);
    for (class_id, records) in &data.classes {
        if records.is_empty() {
            report
                .warnings
                .push(format!("Class '{class_id}' has no records and is ignored"));
        }
    }

    let maps_dir = path.join("maps");
    if maps_dir.is_dir() {
        let mut map_paths: Vec<_> = std::fs::read_dir(&maps_dir)
            .map_err(|e| DataLoadError::IoError {
                path: maps_dir.display().to_string(),
                source: e,
            })?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext == "ron" || ext == "json")
            })
            .collect();
        map_paths.sort();

        for map_path in map_paths {
            check_map(&data, &map_path, &mut report);
            report.maps_checked += 1;
        }
    } else {
        report
            .warnings
            .push(format!("No maps directory in {}", path.display()));
    }

    tracing::info!(
        "Validated {} maps: {} errors, {} warnings",
        report.maps_checked,
        report.errors.len(),
        report.warnings.len()
    );
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    for error in &report.errors {
        tracing::error!("{error}");
    }

    Ok(report)
}

fn check_weapons(weapons: &WeaponsData, report: &mut ValidationReport) {
    let mut seen = BTreeSet::new();
    let categories = [
        ("generic", &weapons.generic),
        ("prf", &weapons.prf),
        ("attributed", &weapons.attributed),
    ];
    for (category, by_type) in categories {
        for (weapon_type, records) in by_type {
            for weapon in records {
                if !seen.insert(weapon.id.as_str()) {
                    report.warnings.push(format!(
                        "Weapon '{}' ({category}/{weapon_type}) duplicates an earlier id and is shadowed",
                        weapon.id
                    ));
                }
                if category == "prf" && weapon.user.as_deref().map_or(true, str::is_empty) {
                    report.warnings.push(format!(
                        "Personal weapon '{}' has no user and is wieldable by class",
                        weapon.id
                    ));
                }
                if weapon.range.is_empty() {
                    report
                        .warnings
                        .push(format!("Weapon '{}' has an empty range", weapon.id));
                }
            }
        }
    }
}

fn check_units(data: &DataSet, report: &mut ValidationReport) {
    let catalog = EquipmentCatalog::from_data(&data.weapons, &data.classes, data.rules.class_lookup);
    for (faction, units) in &data.units {
        for (unit_id, unit) in units {
            if !catalog.resolves_class(&unit.class) {
                report.warnings.push(format!(
                    "Unit '{faction}/{unit_id}' has unknown class '{}' and cannot wield anything",
                    unit.class
                ));
            }
            for item in &unit.current_inventory {
                if catalog.weapon(item).is_none() {
                    report.warnings.push(format!(
                        "Unit '{faction}/{unit_id}' carries unknown item '{item}'"
                    ));
                }
            }
        }
    }
}

fn check_map(data: &DataSet, map_path: &Path, report: &mut ValidationReport) {
    let label = map_path.display().to_string();
    let map: MapData = match load_record(map_path) {
        Ok(map) => map,
        Err(e) => {
            report.errors.push(e.to_string());
            return;
        }
    };

    report
        .errors
        .extend(map.validate().into_iter().map(|e| format!("{label}: {e}")));

    let atlas: Option<AtlasData> = match map.atlas.as_deref() {
        Some(atlas_ref) => match load_record(&data.root.join(atlas_ref)) {
            Ok(atlas) => Some(atlas),
            Err(e) => {
                report.errors.push(format!("{label}: {e}"));
                None
            }
        },
        None => {
            report
                .errors
                .push(format!("{label}: map does not reference an atlas"));
            None
        }
    };

    let catalog = atlas.as_ref().and_then(|atlas| match TileCatalog::from_atlas(atlas) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            report.errors.push(format!("{label}: {e}"));
            None
        }
    });

    if let Some(catalog) = &catalog {
        let unknown: BTreeSet<TileId> = map
            .layers
            .iter()
            .flat_map(|layer| layer.data.iter().copied())
            .filter(|&id| id >= 0 && !catalog.contains(id))
            .collect();
        if !unknown.is_empty() {
            report.warnings.push(format!(
                "{label}: tile ids {unknown:?} are not in the atlas and render as empty"
            ));
        }
    }

    let mut cells: BTreeMap<(i64, i64), &str> = BTreeMap::new();
    let max_x = i64::from(map.width.max(1)) - 1;
    let max_y = i64::from(map.height.max(1)) - 1;
    for placed in &map.units {
        let known = data
            .units
            .get(placed.faction.as_str())
            .map_or(false, |units| units.contains_key(&placed.unit_id));
        if !known {
            report.warnings.push(format!(
                "{label}: unit '{}' has no {} record and uses fallback stats",
                placed.unit_id, placed.faction
            ));
        }

        let cell = (placed.x.clamp(0, max_x), placed.y.clamp(0, max_y));
        if cell != (placed.x, placed.y) {
            report.warnings.push(format!(
                "{label}: unit '{}' at ({}, {}) is outside the grid and will be clamped",
                placed.unit_id, placed.x, placed.y
            ));
        }
        if let Some(other) = cells.insert(cell, &placed.unit_id) {
            report.errors.push(format!(
                "{label}: units '{other}' and '{}' share cell ({}, {})",
                placed.unit_id, cell.0, cell.1
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_directory_warns_about_maps() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_data_directory(dir.path()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.maps_checked, 0);
        assert!(report.warnings.iter().any(|w| w.contains("No maps directory")));
    }

    #[test]
    fn test_duplicate_weapon_ids_warn() {
        let weapons: WeaponsData = ron::from_str(
            r#"(
                generic: {"sword": [(id: "iron_sword", range: [1])]},
                attributed: {"sword": [(id: "iron_sword", range: [1])]},
                prf: {"lance": [(id: "reginleif", range: [1])]},
            )"#,
        )
        .unwrap();
        let mut report = ValidationReport::default();
        check_weapons(&weapons, &mut report);

        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("'iron_sword' (attributed/sword)")));
        assert!(report.warnings.iter().any(|w| w.contains("'reginleif' has no user")));
    }

    #[test]
    fn test_unit_classes_checked_with_lookup_policy() {
        let mut data = DataSet {
            units: ron::from_str(
                r#"{"player": {"seth": (name: "Seth", class: "Paladin", current_inventory: ["iron_lance"])}}"#,
            )
            .unwrap(),
            weapons: ron::from_str(r#"(generic: {"lance": [(id: "iron_lance", range: [1])]})"#)
                .unwrap(),
            classes: ron::from_str(r#"{"paladin": [(name: "Paladin", weapon_types: ["lance"])]}"#)
                .unwrap(),
            ..DataSet::default()
        };

        let mut report = ValidationReport::default();
        check_units(&data, &mut report);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unknown class 'Paladin'"));

        data.rules.class_lookup = ClassLookup::ByDisplayName;
        let mut report = ValidationReport::default();
        check_units(&data, &mut report);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }
}
