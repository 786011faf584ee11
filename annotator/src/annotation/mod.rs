//! Annotation document module
//!
//! Builds, serializes and reads back the per-image record of found regions
//! and their measurements.

pub mod document;
pub mod parser;
pub mod types;

pub use document::AnnotationDocument;
pub use parser::parse;
pub use types::{AnnotationError, DocumentState, MeasurementEntry, RegionEntry};
