//! JPEG fixtures with hand-built EXIF and IPTC blocks.

#![allow(dead_code)]

use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;
use std::path::Path;

const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
const FORMAT_ASCII: u16 = 2;
const APP13: u8 = 0xED;

/// Metadata to embed in a fixture JPEG.
#[derive(Debug, Default, Clone)]
pub struct Fixture<'a> {
    pub exif_description: Option<&'a str>,
    pub iptc_caption: Option<&'a str>,
    pub keywords: &'a [&'a str],
}

/// A small, valid JPEG with no metadata beyond the JFIF header.
pub fn plain_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// A JPEG carrying the requested EXIF description and IPTC fields.
pub fn jpeg_with(fixture: &Fixture) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(plain_jpeg())).unwrap();

    if let Some(desc) = fixture.exif_description {
        jpeg.set_exif(Some(Bytes::from(tiff_with_description(desc))));
    }

    if fixture.iptc_caption.is_some() || !fixture.keywords.is_empty() {
        let contents = app13_contents(fixture.iptc_caption, fixture.keywords);
        let segment = JpegSegment::new_with_contents(APP13, Bytes::from(contents));
        let segments = jpeg.segments_mut();
        let pos = segments.len().min(1);
        segments.insert(pos, segment);
    }

    jpeg.encoder().bytes().to_vec()
}

pub fn write_jpeg(path: &Path, fixture: &Fixture) {
    std::fs::write(path, jpeg_with(fixture)).unwrap();
}

/// Little-endian TIFF with a single IFD0 ImageDescription entry.
fn tiff_with_description(desc: &str) -> Vec<u8> {
    let mut value = desc.as_bytes().to_vec();
    value.push(0);
    let count = value.len() as u32;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    // IFD0: one entry, then next-IFD offset
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&TAG_IMAGE_DESCRIPTION.to_le_bytes());
    tiff.extend_from_slice(&FORMAT_ASCII.to_le_bytes());
    tiff.extend_from_slice(&count.to_le_bytes());
    if value.len() <= 4 {
        let mut inline = [0u8; 4];
        inline[..value.len()].copy_from_slice(&value);
        tiff.extend_from_slice(&inline);
        tiff.extend_from_slice(&0u32.to_le_bytes());
    } else {
        let data_offset = 8 + 2 + 12 + 4;
        tiff.extend_from_slice(&(data_offset as u32).to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&value);
    }
    tiff
}

/// Photoshop 3.0 APP13 contents holding one IPTC-IIM resource.
fn app13_contents(caption: Option<&str>, keywords: &[&str]) -> Vec<u8> {
    let mut iim = Vec::new();
    // Record version (2:0)
    iim.extend_from_slice(&[0x1C, 0x02, 0x00, 0x00, 0x02, 0x00, 0x04]);
    for k in keywords {
        push_dataset(&mut iim, 25, k.as_bytes());
    }
    if let Some(c) = caption {
        push_dataset(&mut iim, 120, c.as_bytes());
    }

    let mut out = b"Photoshop 3.0\0".to_vec();
    out.extend_from_slice(b"8BIM");
    out.extend_from_slice(&0x0404u16.to_be_bytes());
    out.extend_from_slice(&[0x00, 0x00]);
    out.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    out.extend_from_slice(&iim);
    if iim.len() % 2 != 0 {
        out.push(0x00);
    }
    out
}

fn push_dataset(iim: &mut Vec<u8>, dataset: u8, value: &[u8]) {
    iim.extend_from_slice(&[0x1C, 0x02, dataset]);
    iim.extend_from_slice(&(value.len() as u16).to_be_bytes());
    iim.extend_from_slice(value);
}
