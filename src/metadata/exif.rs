use anyhow::{Context, Result};
use img_parts::Bytes;
use nom_exif::*;
use std::io::Cursor;

/// Read the EXIF `ImageDescription` tag from an in-memory image.
///
/// Returns `Ok(None)` when the tag is missing or blank. Only the IFD0
/// description is looked up; no maker notes or sub-IFD detail is requested.
pub fn read_image_description(bytes: Bytes) -> Result<Option<String>> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::seekable(Cursor::new(bytes)).context("Failed to open EXIF stream")?;

    let iter: ExifIter = parser
        .parse(ms)
        .map_err(|e| anyhow::anyhow!("Failed to decode EXIF: {e}"))?;
    let exif: Exif = iter.into();

    Ok(exif.get(ExifTag::ImageDescription).and_then(entry_to_string))
}

/// Convert an EntryValue to an Option<String>.
///
/// Text is taken as stored, minus surrounding whitespace and NUL padding.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let text = match val {
        EntryValue::Text(s) => s.clone(),
        other => other.to_string(),
    };
    let s = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if s.is_empty() { None } else { Some(s.to_string()) }
}
