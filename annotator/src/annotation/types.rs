//! Annotation document types and error definitions

use thiserror::Error;

use crate::region::{Color, Label, RegionError};

/// Errors that can occur when building or reading an annotation document
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("No region entry for label {0}")]
    RegionNotFound(Label),

    #[error("Annotation document is finalized and can no longer be modified")]
    DocumentFinalized,

    #[error("Invalid measurement name: '{0}'")]
    InvalidMeasurementName(String),

    #[error("Failed to parse annotation document: {0}")]
    ParseError(String),

    #[error("Failed to write annotation document: {0}")]
    WriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Lifecycle of an annotation document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No regions recorded yet
    Empty,
    /// At least one region recorded, still mutable
    Populated,
    /// Serialized; further mutation is rejected
    Finalized,
}

/// A named value computed for one region
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementEntry {
    pub name: String,
    pub value: f64,
}

/// One recorded region within an image
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEntry {
    pub label: Label,
    pub name: String,
    /// Copied from the catalog when the region was added
    pub color: Color,
    pub(crate) measurements: Vec<MeasurementEntry>,
}

impl RegionEntry {
    pub fn new(label: Label, name: impl Into<String>, color: Color) -> Self {
        Self {
            label,
            name: name.into(),
            color,
            measurements: Vec::new(),
        }
    }

    /// Measurements in document order
    pub fn measurements(&self) -> &[MeasurementEntry] {
        &self.measurements
    }

    pub fn measurement(&self, name: &str) -> Option<f64> {
        self.measurements
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }

    /// Detach any measurement called `name`, then append the new one
    pub(crate) fn replace_measurement(&mut self, name: &str, value: f64) {
        if let Some(index) = self.measurements.iter().position(|m| m.name == name) {
            self.measurements.remove(index);
        }
        self.measurements.push(MeasurementEntry {
            name: name.to_string(),
            value,
        });
    }
}

/// Element names used for the fixed fields of a region node
pub mod fields {
    pub const IMAGE: &str = "image";
    pub const REGION: &str = "region";
    pub const NAME: &str = "name";
    pub const IDENTIFIER: &str = "identifier";
    pub const COLOR_R: &str = "colorR";
    pub const COLOR_G: &str = "colorG";
    pub const COLOR_B: &str = "colorB";

    /// Names a measurement may not take, since they would shadow region fields
    pub const RESERVED: &[&str] = &[NAME, IDENTIFIER, COLOR_R, COLOR_G, COLOR_B];
}

/// Whether `name` can be used as a measurement element name
pub fn is_valid_measurement_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return false;
    }
    if name.len() >= 3 && name[..3].eq_ignore_ascii_case("xml") {
        return false;
    }
    !fields::RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_names() {
        for name in ["area", "mean_width", "glcm-asm", "max.feret", "_x1"] {
            assert!(is_valid_measurement_name(name), "{} should be valid", name);
        }
        for name in ["", "1area", "mean width", "a<b", "xmlThing", "name", "identifier", "colorR"] {
            assert!(!is_valid_measurement_name(name), "{} should be invalid", name);
        }
    }

    #[test]
    fn test_replace_measurement_moves_to_end() {
        let mut entry = RegionEntry::new(100, "Head", Color::new(1, 2, 3));
        entry.replace_measurement("area", 10.0);
        entry.replace_measurement("perimeter", 4.0);
        entry.replace_measurement("area", 20.0);

        let names: Vec<&str> = entry.measurements().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["perimeter", "area"]);
        assert_eq!(entry.measurement("area"), Some(20.0));
    }
}
