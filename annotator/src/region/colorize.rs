//! Label raster and mask colorization
//!
//! Segmentation masks store one region label per pixel as an unsigned 16-bit
//! value. Colorizing maps every pixel through the region catalog; a label the
//! catalog does not know stops the render instead of producing a guessed color.

use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use tracing::debug;

use super::catalog::RegionCatalog;
use super::types::{Color, Label, RegionError};

/// Two-dimensional grid of region labels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRaster {
    width: u32,
    height: u32,
    labels: Vec<Label>,
}

impl LabelRaster {
    /// Create a raster filled with a single label
    pub fn filled(width: u32, height: u32, label: Label) -> Self {
        Self {
            width,
            height,
            labels: vec![label; width as usize * height as usize],
        }
    }

    /// Create a raster from row-major labels.
    ///
    /// Returns `None` if `labels.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, labels: Vec<Label>) -> Option<Self> {
        (labels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            labels,
        })
    }

    /// Read a 16-bit grayscale mask image from disk
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let mask = image::open(path)?.into_luma16();
        debug!(
            "Read label raster {} ({}x{})",
            path.display(),
            mask.width(),
            mask.height()
        );
        Ok(Self::from(&mask))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Label> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels.get(self.index(x, y)).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, label: Label) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.labels[index] = label;
        }
    }

    /// Labels in row-major order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Iterate `(x, y, label)` in row-major order
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, Label)> + '_ {
        let width = self.width;
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, &label)| {
                let (x, y) = cell_position(i, width);
                (x, y, label)
            })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// `(x, y)` of the cell at row-major `index`. Computed in `usize` so rasters
/// with more than `u32::MAX` cells do not wrap.
fn cell_position(index: usize, width: u32) -> (u32, u32) {
    let width = width.max(1) as usize;
    // x < width, and y < height for any index inside the raster
    ((index % width) as u32, (index / width) as u32)
}

impl From<&ImageBuffer<Luma<u16>, Vec<u16>>> for LabelRaster {
    fn from(mask: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        Self {
            width: mask.width(),
            height: mask.height(),
            labels: mask.pixels().map(|p| Label::from(p.0[0])).collect(),
        }
    }
}

/// Render `raster` into an RGB image using the catalog colors.
///
/// Fails on the first pixel (row-major) whose label is not in the catalog.
pub fn colorize(raster: &LabelRaster, catalog: &RegionCatalog) -> Result<RgbImage, RegionError> {
    let mut colored = RgbImage::new(raster.width(), raster.height());

    // Masks hold few distinct labels; remember the last one to skip most lookups
    let mut last: Option<(Label, Color)> = None;

    for (x, y, label) in raster.enumerate() {
        let color = match last {
            Some((cached, color)) if cached == label => color,
            _ => {
                let color = catalog
                    .lookup(label)
                    .map_err(|_| RegionError::UnknownLabel {
                        label,
                        position: Some((x, y)),
                    })?
                    .color;
                last = Some((label, color));
                color
            }
        };
        colored.put_pixel(x, y, Rgb(color.to_array()));
    }

    Ok(colored)
}
