//! Per-image annotation document
//!
//! Holds the regions found in one image, in discovery order, together with
//! the measurements computed for each of them. The document is serialized
//! once processing is finished; after that it rejects further changes.

use std::io::Cursor;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use crate::region::{Label, RegionCatalog, is_subregion};

use super::types::{
    AnnotationError, DocumentState, RegionEntry, fields, is_valid_measurement_name,
};

/// Annotation tree for one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationDocument {
    regions: Vec<RegionEntry>,
    finalized: bool,
}

impl AnnotationDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_regions(regions: Vec<RegionEntry>) -> Self {
        Self {
            regions,
            finalized: false,
        }
    }

    pub fn state(&self) -> DocumentState {
        if self.finalized {
            DocumentState::Finalized
        } else if self.regions.is_empty() {
            DocumentState::Empty
        } else {
            DocumentState::Populated
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in document order
    pub fn regions(&self) -> impl Iterator<Item = &RegionEntry> {
        self.regions.iter()
    }

    /// First region entry with `label`, scanning in document order
    pub fn find_region(&self, label: Label) -> Option<&RegionEntry> {
        self.position(label).map(|index| &self.regions[index])
    }

    /// Recorded regions that fall inside `parent`'s label range
    pub fn subregions(&self, parent: Label) -> impl Iterator<Item = &RegionEntry> {
        self.regions
            .iter()
            .filter(move |entry| is_subregion(parent, entry.label))
    }

    fn position(&self, label: Label) -> Option<usize> {
        self.regions.iter().position(|entry| entry.label == label)
    }

    fn ensure_mutable(&self) -> Result<(), AnnotationError> {
        if self.finalized {
            return Err(AnnotationError::DocumentFinalized);
        }
        Ok(())
    }

    /// Record `label` if it is not already present.
    ///
    /// Name and color are copied from the catalog. Adding a label twice is a
    /// no-op.
    pub fn add_region(&mut self, label: Label, catalog: &RegionCatalog) -> Result<(), AnnotationError> {
        self.ensure_mutable()?;

        if self.position(label).is_some() {
            return Ok(());
        }

        let definition = catalog.lookup(label)?;
        self.regions.push(RegionEntry::new(
            label,
            definition.name.clone(),
            definition.color,
        ));
        debug!("Added region {} ({})", label, definition.name);
        Ok(())
    }

    /// Set measurement `name` of region `label` to `value`.
    ///
    /// An existing measurement of the same name is discarded and the new one
    /// appended after the remaining measurements.
    pub fn upsert_measurement(
        &mut self,
        label: Label,
        name: &str,
        value: f64,
    ) -> Result<(), AnnotationError> {
        self.ensure_mutable()?;

        if !is_valid_measurement_name(name) {
            return Err(AnnotationError::InvalidMeasurementName(name.to_string()));
        }

        let index = self
            .position(label)
            .ok_or(AnnotationError::RegionNotFound(label))?;
        self.regions[index].replace_measurement(name, value);
        Ok(())
    }

    /// Serialize the document and mark it finalized.
    ///
    /// Output is deterministic; serializing a finalized document again yields
    /// the same bytes.
    pub fn serialize(&mut self) -> Result<Vec<u8>, AnnotationError> {
        let bytes = self.render()?;
        self.finalized = true;
        Ok(bytes)
    }

    /// Serialize and write to `path`
    pub fn write_to(&mut self, path: &Path) -> Result<(), AnnotationError> {
        let bytes = self.render()?;
        std::fs::write(path, &bytes)?;
        self.finalized = true;
        debug!(
            "Wrote annotation document {} ({} regions)",
            path.display(),
            self.regions.len()
        );
        Ok(())
    }

    fn render(&self) -> Result<Vec<u8>, AnnotationError> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
            .map_err(write_error)?;

        writer
            .write_event(Event::Start(BytesStart::new(fields::IMAGE)))
            .map_err(write_error)?;

        for region in &self.regions {
            writer
                .write_event(Event::Start(BytesStart::new(fields::REGION)))
                .map_err(write_error)?;

            write_text_element(&mut writer, fields::NAME, &region.name)?;
            write_text_element(&mut writer, fields::IDENTIFIER, &region.label.to_string())?;
            write_text_element(&mut writer, fields::COLOR_R, &region.color.red.to_string())?;
            write_text_element(&mut writer, fields::COLOR_G, &region.color.green.to_string())?;
            write_text_element(&mut writer, fields::COLOR_B, &region.color.blue.to_string())?;

            for measurement in region.measurements() {
                write_text_element(&mut writer, &measurement.name, &measurement.value.to_string())?;
            }

            writer
                .write_event(Event::End(BytesEnd::new(fields::REGION)))
                .map_err(write_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(fields::IMAGE)))
            .map_err(write_error)?;

        Ok(buffer)
    }
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), AnnotationError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)?;
    Ok(())
}

fn write_error(e: impl std::fmt::Display) -> AnnotationError {
    AnnotationError::WriteError(e.to_string())
}
