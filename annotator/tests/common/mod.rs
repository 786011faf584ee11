//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};
use region_annotations::{LabelRaster, RegionCatalog};

pub const CATALOG_JSON: &str = r#"{
    "0":    { "name": "Background", "color": { "red": 0,   "green": 0,   "blue": 0 } },
    "1000": { "name": "Body",       "color": { "red": 200, "green": 200, "blue": 200 } },
    "1100": { "name": "Head",       "color": { "red": 255, "green": 0,   "blue": 0 } },
    "1110": { "name": "Eye",        "color": { "red": 0,   "green": 0,   "blue": 255 } },
    "1200": { "name": "Thorax",     "color": { "red": 255, "green": 255, "blue": 0 } },
    "1210": { "name": "Leg",        "color": { "red": 0,   "green": 255, "blue": 0 } },
    "2000": { "name": "Label",      "color": { "red": 255, "green": 0,   "blue": 255 } }
}"#;

pub fn test_catalog() -> RegionCatalog {
    RegionCatalog::from_json_str(CATALOG_JSON).expect("test catalog should parse")
}

/// Fresh, empty scratch directory under the system temp dir
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("region_annotations_it_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

/// 8x5 specimen-like raster over the test catalog
pub fn specimen_raster() -> LabelRaster {
    #[rustfmt::skip]
    let labels = vec![
        0, 0,    1100, 1100, 1100, 0,    0,    2000,
        0, 1110, 1100, 1100, 1110, 0,    0,    2000,
        0, 0,    1200, 1200, 1200, 0,    0,    0,
        0, 1210, 1200, 1200, 1200, 1210, 0,    0,
        0, 0,    1000, 1000, 1000, 0,    0,    0,
    ];
    LabelRaster::from_vec(8, 5, labels).expect("specimen raster dimensions")
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
