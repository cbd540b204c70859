// ── Building-name resolution ──
//
// The portal reports facility codes; the two CSV exports map them to
// human-readable building names. Rows are kept in load order (primary
// table, then custom table) and lookups scan linearly, so the primary
// table wins whenever both define a code.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BuildingSources;
use crate::error::CoreError;

/// One row of a building table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingEntry {
    #[serde(rename = "FacilityCode", alias = "FDX Code")]
    pub facility_code: String,
    #[serde(rename = "BuildingName", alias = "Building Name")]
    pub building_name: String,
}

/// Ordered facility-code → building-name table.
#[derive(Debug, Clone, Default)]
pub struct BuildingNameMap {
    entries: Vec<BuildingEntry>,
}

impl BuildingNameMap {
    /// Load the primary table, then the custom table. No deduplication.
    pub fn load<A: Read, B: Read>(primary: A, custom: B) -> Result<Self, CoreError> {
        let mut entries = read_table(primary, "primary building table")?;
        entries.extend(read_table(custom, "custom building table")?);
        let map = Self { entries };
        map.report_collisions();
        Ok(map)
    }

    /// Load both tables from disk.
    pub fn load_paths(primary: &Path, custom: &Path) -> Result<Self, CoreError> {
        let mut entries = read_path(primary)?;
        entries.extend(read_path(custom)?);
        let map = Self { entries };
        debug!(
            primary = %primary.display(),
            custom = %custom.display(),
            entries = map.len(),
            "building tables loaded"
        );
        map.report_collisions();
        Ok(map)
    }

    pub fn load_sources(sources: &BuildingSources) -> Result<Self, CoreError> {
        Self::load_paths(&sources.primary, &sources.custom)
    }

    /// Building name for `code`, first match in load order. Unknown codes
    /// come back unchanged.
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|entry| entry.facility_code == code)
            .map_or(code, |entry| entry.building_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codes defined more than once, in first-seen order.
    pub fn collisions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut out = Vec::new();
        for entry in &self.entries {
            let code = entry.facility_code.as_str();
            if !seen.insert(code) && reported.insert(code) {
                out.push(code);
            }
        }
        out
    }

    fn report_collisions(&self) {
        for code in self.collisions() {
            warn!(
                code,
                resolved = self.resolve(code),
                "facility code defined more than once; the first definition wins"
            );
        }
    }
}

fn read_table<R: Read>(source: R, origin: &str) -> Result<Vec<BuildingEntry>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    collect_rows(&mut reader, origin)
}

fn read_path(path: &Path) -> Result<Vec<BuildingEntry>, CoreError> {
    let origin = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CoreError::BuildingTable {
            origin: origin.clone(),
            source,
        })?;
    collect_rows(&mut reader, &origin)
}

fn collect_rows<R: Read>(
    reader: &mut csv::Reader<R>,
    origin: &str,
) -> Result<Vec<BuildingEntry>, CoreError> {
    reader
        .deserialize()
        .collect::<Result<Vec<BuildingEntry>, _>>()
        .map_err(|source| CoreError::BuildingTable {
            origin: origin.to_owned(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const PRIMARY: &str = "FacilityCode,BuildingName\nK05,Kemper Hall\nA12,Academic Surge\n";
    const CUSTOM: &str = "FacilityCode,BuildingName\nK05,Kemper (custom)\nT99,Test Annex\n";

    fn map() -> BuildingNameMap {
        BuildingNameMap::load(PRIMARY.as_bytes(), CUSTOM.as_bytes()).unwrap()
    }

    #[test]
    fn unknown_code_is_returned_unchanged() {
        assert_eq!(map().resolve("ZZ9"), "ZZ9");
        assert_eq!(map().resolve(""), "");
    }

    #[test]
    fn primary_table_wins_on_collision() {
        let map = map();
        assert_eq!(map.resolve("K05"), "Kemper Hall");
        assert_eq!(map.resolve("T99"), "Test Annex");
        assert_eq!(map.len(), 4);
        assert_eq!(map.collisions(), vec!["K05"]);
    }

    #[test]
    fn export_headers_are_accepted() {
        let primary = "FDX Code,Building Name,Campus\n  B01 , Bainer Hall ,Davis\n";
        let custom = "FDX Code,Building Name\n";
        let map = BuildingNameMap::load(primary.as_bytes(), custom.as_bytes()).unwrap();
        assert_eq!(map.resolve("B01"), "Bainer Hall");
        assert!(map.collisions().is_empty());
    }

    #[test]
    fn missing_column_reports_origin() {
        let err = BuildingNameMap::load("Code,Name\nK05,Kemper\n".as_bytes(), CUSTOM.as_bytes())
            .unwrap_err();
        match err {
            CoreError::BuildingTable { origin, .. } => assert_eq!(origin, "primary building table"),
            other => panic!("expected BuildingTable, got: {other:?}"),
        }
    }

    #[test]
    fn loads_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("Buildings.csv");
        let custom = dir.path().join("CustomBuildings.csv");
        std::fs::File::create(&primary)
            .unwrap()
            .write_all(PRIMARY.as_bytes())
            .unwrap();
        std::fs::File::create(&custom)
            .unwrap()
            .write_all(CUSTOM.as_bytes())
            .unwrap();

        let sources = BuildingSources {
            primary,
            custom: custom.clone(),
        };
        let map = BuildingNameMap::load_sources(&sources).unwrap();
        assert_eq!(map.resolve("A12"), "Academic Surge");

        let missing = BuildingNameMap::load_paths(&dir.path().join("nope.csv"), &custom);
        assert!(matches!(missing, Err(CoreError::BuildingTable { .. })));
    }
}
