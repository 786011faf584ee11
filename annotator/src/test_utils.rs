//! Test Utilities Module
//!
//! Shared fixtures for the unit tests: a small region catalog and a label
//! raster that uses every label in it.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::path::Path;

use image::{ImageBuffer, Luma};

use crate::region::{LabelRaster, RegionCatalog};

// ============================================================================
// Catalog Fixtures
// ============================================================================

/// Catalog with a background, a head group (100, 110, 111) and a thorax
pub const SAMPLE_CATALOG_JSON: &str = r#"{
    "0":   { "name": "Background",   "color": { "red": 0,   "green": 0,   "blue": 0 } },
    "100": { "name": "Head",         "color": { "red": 255, "green": 0,   "blue": 0 } },
    "110": { "name": "Eye",          "color": { "red": 0,   "green": 0,   "blue": 255 } },
    "111": { "name": "Left antenna", "color": { "red": 0,   "green": 255, "blue": 0 } },
    "200": { "name": "Thorax",       "color": { "red": 255, "green": 255, "blue": 0 } }
}"#;

pub fn sample_catalog() -> RegionCatalog {
    RegionCatalog::from_json_str(SAMPLE_CATALOG_JSON).expect("sample catalog should parse")
}

// ============================================================================
// Raster Fixtures
// ============================================================================

/// 6x4 raster using every sample label
pub fn sample_raster() -> LabelRaster {
    #[rustfmt::skip]
    let labels = vec![
        0,   0,   100, 100, 0,   0,
        0,   110, 100, 111, 0,   0,
        0,   200, 200, 200, 200, 0,
        0,   0,   200, 200, 0,   0,
    ];
    LabelRaster::from_vec(6, 4, labels).expect("sample raster dimensions")
}

/// Save `raster` as a 16-bit grayscale PNG
pub fn write_label_png(raster: &LabelRaster, path: &Path) {
    let mut mask: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::new(raster.width(), raster.height());
    for (x, y, label) in raster.enumerate() {
        let value = u16::try_from(label).expect("test labels fit in 16 bits");
        mask.put_pixel(x, y, Luma([value]));
    }
    mask.save(path).expect("Failed to write label PNG");
}
