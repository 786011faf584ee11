//! Region Annotations Library
//!
//! Region catalog, label hierarchy, mask colorization and per-image
//! annotation documents. Exported for the `region-annotate` binary,
//! integration tests and external tooling.

pub mod annotation;
pub mod config;
pub mod pipeline;
pub mod region;
pub mod run_log;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use annotation::{AnnotationDocument, AnnotationError, DocumentState};
pub use pipeline::{AnnotatePipeline, PipelineError, PipelineOutput};
pub use region::{Color, Label, LabelRaster, RegionCatalog, RegionDefinition, RegionError};
