//! Region-related types and error definitions

use serde::Deserialize;
use thiserror::Error;

/// Numeric region label. Trailing zero digits encode the containment hierarchy.
pub type Label = u32;

/// Errors that can occur when working with the region catalog
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("Failed to load region catalog from {source_name}: {reason}")]
    CatalogLoad { source_name: String, reason: String },

    #[error("Unknown region label {label}{}", position_suffix(.position))]
    UnknownLabel {
        label: Label,
        /// Pixel position (x, y) when the label came from a raster
        position: Option<(u32, u32)>,
    },
}

fn position_suffix(position: &Option<(u32, u32)>) -> String {
    match position {
        Some((x, y)) => format!(" at pixel ({}, {})", x, y),
        None => String::new(),
    }
}

impl RegionError {
    pub(crate) fn catalog_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CatalogLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_label(label: Label) -> Self {
        Self::UnknownLabel {
            label,
            position: None,
        }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Static definition of one region type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDefinition {
    /// Region label (catalog key)
    pub label: Label,
    /// Display name
    pub name: String,
    /// Rendering color
    pub color: Color,
}
