//! Region catalog loading and lookup
//!
//! The catalog is a JSON object keyed by label text:
//!
//! ```json
//! {
//!   "100": { "name": "Head", "color": { "red": 255, "green": 0, "blue": 0 } },
//!   "110": { "name": "Eye",  "color": { "red": 0, "green": 0, "blue": 255 } }
//! }
//! ```
//!
//! Duplicate keys are rejected rather than silently collapsed, so the object is
//! read entry by entry instead of straight into a map.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use super::hierarchy::is_subregion;
use super::types::{Color, Label, RegionDefinition, RegionError};

/// Region entry as written in the configuration file
#[derive(Debug, Deserialize)]
struct RawRegion {
    name: String,
    color: Color,
}

/// Configuration entries in file order, duplicates kept
struct RawCatalog(Vec<(String, RawRegion)>);

impl<'de> Deserialize<'de> for RawCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping region labels to region definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RawRegion>()? {
                    entries.push(entry);
                }
                Ok(RawCatalog(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a label key, accepting only canonical decimal text
fn parse_label_key(key: &str) -> Option<Label> {
    let label: Label = key.parse().ok()?;
    (label.to_string() == key).then_some(label)
}

/// Read-only table of all known regions
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: IndexMap<Label, RegionDefinition>,
}

impl RegionCatalog {
    /// Load the catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, RegionError> {
        let source_name = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegionError::catalog_load(&source_name, e.to_string()))?;

        let catalog = Self::parse(&text, &source_name)?;
        info!(
            "Loaded region catalog: {} ({} regions)",
            source_name,
            catalog.len()
        );
        Ok(catalog)
    }

    /// Build the catalog from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, RegionError> {
        Self::parse(text, "<inline>")
    }

    /// Build the catalog from already validated definitions
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = RegionDefinition>,
    ) -> Result<Self, RegionError> {
        let mut regions = IndexMap::new();
        for definition in definitions {
            let label = definition.label;
            if regions.insert(label, definition).is_some() {
                return Err(RegionError::catalog_load(
                    "<definitions>",
                    format!("duplicate label {}", label),
                ));
            }
        }
        Ok(Self { regions })
    }

    fn parse(text: &str, source_name: &str) -> Result<Self, RegionError> {
        let RawCatalog(entries) = serde_json::from_str(text)
            .map_err(|e| RegionError::catalog_load(source_name, e.to_string()))?;

        let mut regions = IndexMap::with_capacity(entries.len());
        for (key, raw) in entries {
            let label = parse_label_key(&key).ok_or_else(|| {
                RegionError::catalog_load(source_name, format!("invalid region label '{}'", key))
            })?;

            if regions.contains_key(&label) {
                return Err(RegionError::catalog_load(
                    source_name,
                    format!("duplicate label {}", label),
                ));
            }

            regions.insert(
                label,
                RegionDefinition {
                    label,
                    name: raw.name,
                    color: raw.color,
                },
            );
        }

        debug!("Parsed {} region definitions from {}", regions.len(), source_name);
        Ok(Self { regions })
    }

    /// Look up the definition for `label`
    pub fn lookup(&self, label: Label) -> Result<&RegionDefinition, RegionError> {
        self.regions
            .get(&label)
            .ok_or_else(|| RegionError::unknown_label(label))
    }

    pub fn contains(&self, label: Label) -> bool {
        self.regions.contains_key(&label)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Definitions in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &RegionDefinition> {
        self.regions.values()
    }

    /// All catalog regions contained in `label`'s range, the label itself included
    pub fn subregions_of(&self, label: Label) -> Vec<&RegionDefinition> {
        self.regions
            .values()
            .filter(|definition| is_subregion(label, definition.label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{SAMPLE_CATALOG_JSON, sample_catalog};
    use std::fs;

    #[test]
    fn test_from_json_str() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 5);

        let head = catalog.lookup(100).unwrap();
        assert_eq!(head.name, "Head");
        assert_eq!(head.color, Color::new(255, 0, 0));
    }

    #[test]
    fn test_iteration_keeps_config_order() {
        let catalog = sample_catalog();
        let labels: Vec<Label> = catalog.iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![0, 100, 110, 111, 200]);
    }

    #[test]
    fn test_lookup_unknown_label() {
        let catalog = sample_catalog();
        match catalog.lookup(999) {
            Err(RegionError::UnknownLabel { label, position }) => {
                assert_eq!(label, 999);
                assert!(position.is_none());
            }
            other => panic!("Expected UnknownLabel, got {:?}", other),
        }
        assert!(!catalog.contains(999));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let json = r#"{
            "5": { "name": "A", "color": { "red": 1, "green": 2, "blue": 3 } },
            "5": { "name": "B", "color": { "red": 4, "green": 5, "blue": 6 } }
        }"#;
        let err = RegionCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, RegionError::CatalogLoad { .. }));
        assert!(err.to_string().contains("duplicate label 5"));
    }

    #[test]
    fn test_non_canonical_label_rejected() {
        for key in ["0100", "abc", "-1", " 1", "1.5"] {
            let json = format!(
                r#"{{ "{}": {{ "name": "A", "color": {{ "red": 1, "green": 2, "blue": 3 }} }} }}"#,
                key
            );
            let err = RegionCatalog::from_json_str(&json).unwrap_err();
            assert!(
                matches!(err, RegionError::CatalogLoad { .. }),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_malformed_entries_fail_whole_load() {
        let cases = [
            // Missing color
            r#"{ "1": { "name": "A" } }"#,
            // Channel out of range
            r#"{ "1": { "name": "A", "color": { "red": 256, "green": 0, "blue": 0 } } }"#,
            // Missing channel
            r#"{ "1": { "name": "A", "color": { "red": 1, "green": 0 } } }"#,
            // Not an object
            r#"[1, 2, 3]"#,
            // Truncated
            r#"{ "1": { "name": "A", "#,
        ];
        for json in cases {
            assert!(
                matches!(
                    RegionCatalog::from_json_str(json),
                    Err(RegionError::CatalogLoad { .. })
                ),
                "should fail: {}",
                json
            );
        }
    }

    #[test]
    fn test_extra_fields_ignored() {
        let json = r#"{
            "7": { "name": "A", "level": 2, "color": { "red": 1, "green": 2, "blue": 3, "alpha": 9 } }
        }"#;
        let catalog = RegionCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.lookup(7).unwrap().color, Color::new(1, 2, 3));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("region_annotations_missing_catalog.json");
        let _ = fs::remove_file(&path);

        let err = RegionCatalog::load(&path).unwrap_err();
        assert!(matches!(err, RegionError::CatalogLoad { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = std::env::temp_dir().join("region_annotations_test_catalog_load");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let path = temp_dir.join("regions.json");
        fs::write(&path, SAMPLE_CATALOG_JSON).unwrap();

        let catalog = RegionCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.lookup(111).unwrap().name, "Left antenna");

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_subregions_of() {
        let catalog = sample_catalog();

        let labels: Vec<Label> = catalog.subregions_of(100).iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![100, 110, 111]);

        let labels: Vec<Label> = catalog.subregions_of(110).iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![110, 111]);

        let labels: Vec<Label> = catalog.subregions_of(0).iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn test_from_definitions_rejects_duplicates() {
        let definition = RegionDefinition {
            label: 1,
            name: "A".to_string(),
            color: Color::new(0, 0, 0),
        };
        let result = RegionCatalog::from_definitions(vec![definition.clone(), definition]);
        assert!(matches!(result, Err(RegionError::CatalogLoad { .. })));
    }
}
