//! Annotate pipeline
//!
//! Takes one label raster and produces:
//! - An annotation document listing every region found, in discovery order,
//!   with its pixel area
//! - Optionally, the colorized mask as an RGB PNG

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::annotation::{AnnotationDocument, AnnotationError};
use crate::config::PipelineConfig;
use crate::region::{Label, LabelRaster, RegionCatalog, RegionError, colorize};
use crate::run_log::measure_execution_time;

/// Errors that can occur while processing one image
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid input path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Files and counts produced for one image
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Label raster that was processed
    pub source: PathBuf,
    /// Written annotation document
    pub document_path: PathBuf,
    /// Written colorized mask, if enabled
    pub colorized_path: Option<PathBuf>,
    /// Number of distinct regions recorded
    pub region_count: usize,
    /// Wall-clock processing time
    pub elapsed: Duration,
}

/// Pixel count per label, in row-major first-appearance order
pub fn region_areas(raster: &LabelRaster) -> IndexMap<Label, u64> {
    let mut areas: IndexMap<Label, u64> = IndexMap::new();
    for &label in raster.labels() {
        *areas.entry(label).or_insert(0) += 1;
    }
    areas
}

/// Annotate pipeline
pub struct AnnotatePipeline {
    config: PipelineConfig,
    catalog: Arc<RegionCatalog>,
    write_colorized: bool,
}

impl AnnotatePipeline {
    pub fn new(config: PipelineConfig, catalog: Arc<RegionCatalog>) -> Self {
        Self {
            config,
            catalog,
            write_colorized: true,
        }
    }

    /// Set whether `run` writes the colorized mask
    pub fn with_colorized_output(mut self, enabled: bool) -> Self {
        self.write_colorized = enabled;
        self
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Build the annotation document for `raster`
    pub fn annotate(&self, raster: &LabelRaster) -> Result<AnnotationDocument, AnnotationError> {
        let areas = region_areas(raster);
        debug!(
            "Annotating {}x{} raster: {} distinct labels",
            raster.width(),
            raster.height(),
            areas.len()
        );

        let mut document = AnnotationDocument::new();
        for (&label, &area) in &areas {
            document.add_region(label, &self.catalog)?;
            document.upsert_measurement(label, &self.config.area_measurement, area as f64)?;
        }
        Ok(document)
    }

    /// Process the label raster at `path`, writing results into `output_dir`
    pub fn run(&self, path: &Path, output_dir: &Path) -> Result<PipelineOutput, PipelineError> {
        let (result, elapsed) = measure_execution_time(|| self.run_inner(path, output_dir));
        let mut output = result?;
        output.elapsed = elapsed;

        info!(
            "Processed {}: {} regions in {:.1} ms",
            path.display(),
            output.region_count,
            elapsed.as_secs_f64() * 1000.0
        );
        Ok(output)
    }

    fn run_inner(&self, path: &Path, output_dir: &Path) -> Result<PipelineOutput, PipelineError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PipelineError::InvalidPath(path.to_path_buf()))?;

        let raster = LabelRaster::open(path)?;

        // Colorize first: it validates every pixel against the catalog
        let colored = colorize(&raster, &self.catalog)?;
        let mut document = self.annotate(&raster)?;

        std::fs::create_dir_all(output_dir)?;

        let colorized_path = if self.write_colorized {
            let colorized_path = output_dir.join(format!("{}_colored.png", stem));
            colored.save(&colorized_path)?;
            debug!("Wrote colorized mask {}", colorized_path.display());
            Some(colorized_path)
        } else {
            None
        };

        let document_path = output_dir.join(format!("{}.xml", stem));
        document.write_to(&document_path)?;

        Ok(PipelineOutput {
            source: path.to_path_buf(),
            document_path,
            colorized_path,
            region_count: document.len(),
            elapsed: Duration::ZERO,
        })
    }
}
