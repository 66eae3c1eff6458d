//! Caption and keyword extraction from JPEG streams.
//!
//! [`read_metadata`] buffers a file once and decodes both metadata blocks
//! from that buffer:
//!
//! - EXIF `ImageDescription` (via `nom-exif`) is the preferred caption.
//! - IPTC-IIM `Caption/Abstract` (2:120) is the fallback caption, and IPTC
//!   `Keywords` (2:25) always supplies the keyword list.
//!
//! Missing metadata is the normal case and never an error. A stream that is
//! not a JPEG at all yields empty metadata; a JPEG whose structure or EXIF
//! block cannot be decoded is an error.

mod exif;
mod iptc;

pub use exif::read_image_description;
pub use iptc::{IptcData, read_iptc};

use anyhow::{Context, Result};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::io::Read;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Caption and keywords found in one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub caption: Option<String>,
    pub keywords: Vec<String>,
}

impl ImageMetadata {
    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.keywords.is_empty()
    }
}

/// Read caption and keywords from an open image stream.
///
/// The stream is consumed to the end; EXIF and IPTC are both decoded from
/// the same buffer, so local files and network-share files behave alike.
pub fn read_metadata<R: Read>(mut reader: R) -> Result<ImageMetadata> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .context("Failed to read image stream")?;
    read_metadata_from_bytes(Bytes::from(buf))
}

/// Read caption and keywords from an in-memory image.
pub fn read_metadata_from_bytes(bytes: Bytes) -> Result<ImageMetadata> {
    if !bytes.starts_with(&JPEG_SOI) {
        log::debug!("Stream is not a JPEG; no metadata to read");
        return Ok(ImageMetadata::default());
    }

    let jpeg = Jpeg::from_bytes(bytes.clone())
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    // Only hand the stream to the EXIF decoder when an APP1 Exif block exists
    let exif_caption = if jpeg.exif().is_some() {
        read_image_description(bytes)?
    } else {
        None
    };

    let iptc = read_iptc(&jpeg)?;

    Ok(ImageMetadata {
        caption: exif_caption.or(iptc.caption),
        keywords: iptc.keywords,
    })
}
