//! Annotation document parser
//!
//! Reads documents produced by [`AnnotationDocument::serialize`] back into
//! memory. Region names and colors are taken from the file as written; the
//! catalog is not consulted.
//!
//! Text is never trimmed: whitespace-only text between structural elements is
//! skipped, leaf element text is kept exactly as written.

use std::collections::HashSet;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::region::{Color, Label};

use super::document::AnnotationDocument;
use super::types::{
    AnnotationError, MeasurementEntry, RegionEntry, fields, is_valid_measurement_name,
};

/// Parse a serialized annotation document
pub fn parse(bytes: &[u8]) -> Result<AnnotationDocument, AnnotationError> {
    let text = std::str::from_utf8(bytes).map_err(parse_error)?;
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => {
                expect_name(&e, fields::IMAGE)?;
                let regions = read_regions(&mut reader)?;
                expect_end_of_input(&mut reader)?;
                return Ok(AnnotationDocument::from_regions(regions));
            }
            Event::Empty(e) => {
                expect_name(&e, fields::IMAGE)?;
                expect_end_of_input(&mut reader)?;
                return Ok(AnnotationDocument::new());
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Text(t) if is_blank(&t) => {}
            Event::Eof => {
                return Err(AnnotationError::ParseError(
                    "missing <image> root element".to_string(),
                ));
            }
            other => {
                return Err(AnnotationError::ParseError(format!(
                    "unexpected content before root element: {:?}",
                    other
                )));
            }
        }
    }
}

/// Read `<region>` children of the root up to `</image>`
fn read_regions(reader: &mut Reader<&[u8]>) -> Result<Vec<RegionEntry>, AnnotationError> {
    let mut regions: Vec<RegionEntry> = Vec::new();

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => {
                expect_name(&e, fields::REGION)?;
                let region = read_region(reader)?;
                if regions.iter().any(|r| r.label == region.label) {
                    return Err(AnnotationError::ParseError(format!(
                        "duplicate region identifier {}",
                        region.label
                    )));
                }
                regions.push(region);
            }
            Event::End(_) => return Ok(regions),
            Event::Comment(_) => {}
            Event::Text(t) if is_blank(&t) => {}
            Event::Eof => return Err(unexpected_eof()),
            other => {
                return Err(AnnotationError::ParseError(format!(
                    "unexpected content in <image>: {:?}",
                    other
                )));
            }
        }
    }
}

/// Read the children of one `<region>` up to `</region>`
fn read_region(reader: &mut Reader<&[u8]>) -> Result<RegionEntry, AnnotationError> {
    let mut name: Option<String> = None;
    let mut label: Option<Label> = None;
    let mut red: Option<u8> = None;
    let mut green: Option<u8> = None;
    let mut blue: Option<u8> = None;
    let mut measurements: Vec<MeasurementEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        let (field, value) = match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => {
                let field = element_name(&e)?;
                (field, read_text(reader)?)
            }
            Event::Empty(e) => (element_name(&e)?, String::new()),
            Event::End(_) => break,
            Event::Comment(_) => continue,
            Event::Text(t) if is_blank(&t) => continue,
            Event::Eof => return Err(unexpected_eof()),
            other => {
                return Err(AnnotationError::ParseError(format!(
                    "unexpected content in <region>: {:?}",
                    other
                )));
            }
        };

        if !seen.insert(field.clone()) {
            return Err(AnnotationError::ParseError(format!(
                "duplicate <{}> in region",
                field
            )));
        }

        match field.as_str() {
            fields::NAME => name = Some(value),
            fields::IDENTIFIER => label = Some(parse_label(&value)?),
            fields::COLOR_R => red = Some(parse_number(&field, &value)?),
            fields::COLOR_G => green = Some(parse_number(&field, &value)?),
            fields::COLOR_B => blue = Some(parse_number(&field, &value)?),
            _ => {
                if !is_valid_measurement_name(&field) {
                    return Err(AnnotationError::ParseError(format!(
                        "invalid measurement name <{}>",
                        field
                    )));
                }
                let value = parse_number(&field, &value)?;
                measurements.push(MeasurementEntry { name: field, value });
            }
        }
    }

    let missing = |field: &str| AnnotationError::ParseError(format!("region without <{}>", field));
    let mut entry = RegionEntry::new(
        label.ok_or_else(|| missing(fields::IDENTIFIER))?,
        name.ok_or_else(|| missing(fields::NAME))?,
        Color::new(
            red.ok_or_else(|| missing(fields::COLOR_R))?,
            green.ok_or_else(|| missing(fields::COLOR_G))?,
            blue.ok_or_else(|| missing(fields::COLOR_B))?,
        ),
    );
    entry.measurements = measurements;
    Ok(entry)
}

/// Collect the text of a leaf element up to its end tag
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, AnnotationError> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(parse_error)?),
            Event::CData(c) => text.push_str(std::str::from_utf8(&c).map_err(parse_error)?),
            Event::End(_) => return Ok(text),
            Event::Comment(_) => {}
            Event::Eof => return Err(unexpected_eof()),
            other => {
                return Err(AnnotationError::ParseError(format!(
                    "unexpected nested content: {:?}",
                    other
                )));
            }
        }
    }
}

/// Whitespace-only text, i.e. indentation between elements
fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn element_name(e: &BytesStart<'_>) -> Result<String, AnnotationError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(parse_error)
}

fn expect_name(e: &BytesStart<'_>, expected: &str) -> Result<(), AnnotationError> {
    let name = element_name(e)?;
    if name != expected {
        return Err(AnnotationError::ParseError(format!(
            "expected <{}>, found <{}>",
            expected, name
        )));
    }
    Ok(())
}

fn expect_end_of_input(reader: &mut Reader<&[u8]>) -> Result<(), AnnotationError> {
    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::PI(_) => {}
            Event::Text(t) if is_blank(&t) => {}
            other => {
                return Err(AnnotationError::ParseError(format!(
                    "unexpected content after root element: {:?}",
                    other
                )));
            }
        }
    }
}

fn parse_label(value: &str) -> Result<Label, AnnotationError> {
    let label: Label = parse_number(fields::IDENTIFIER, value)?;
    if label.to_string() != value {
        return Err(AnnotationError::ParseError(format!(
            "non-canonical region identifier '{}'",
            value
        )));
    }
    Ok(label)
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, AnnotationError> {
    value.parse().map_err(|_| {
        AnnotationError::ParseError(format!("invalid value '{}' for <{}>", value, field))
    })
}

fn parse_error(e: impl std::fmt::Display) -> AnnotationError {
    AnnotationError::ParseError(e.to_string())
}

fn unexpected_eof() -> AnnotationError {
    AnnotationError::ParseError("unexpected end of document".to_string())
}
