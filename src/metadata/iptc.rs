use anyhow::Result;
use img_parts::jpeg::Jpeg;

// IPTC-IIM lives in APP13 as Photoshop 3.0 image resource 0x0404
const APP13: u8 = 0xED;
const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const RESOURCE_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

const TAG_MARKER: u8 = 0x1C;
const APPLICATION_RECORD: u8 = 2;
const DATASET_KEYWORDS: u8 = 25;
const DATASET_CAPTION: u8 = 120;

/// IPTC application-record fields relevant to the audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcData {
    /// Caption/Abstract (2:120).
    pub caption: Option<String>,
    /// Keywords (2:25), in file order.
    pub keywords: Vec<String>,
}

/// Read IPTC caption and keywords from a parsed JPEG.
///
/// A JPEG without an APP13 IPTC resource yields empty data. A resource or
/// dataset whose declared length runs past its segment is an error.
pub fn read_iptc(jpeg: &Jpeg) -> Result<IptcData> {
    for segment in jpeg.segments().iter().filter(|s| s.marker() == APP13) {
        if let Some(iim) = find_iim_resource(segment.contents())? {
            return parse_iim(iim);
        }
    }
    Ok(IptcData::default())
}

/// Locate the IPTC-IIM resource inside APP13 contents.
fn find_iim_resource(contents: &[u8]) -> Result<Option<&[u8]>> {
    let Some(data) = contents.strip_prefix(PHOTOSHOP_HEADER) else {
        return Ok(None);
    };

    let mut pos = 0;
    while pos + 4 <= data.len() && &data[pos..pos + 4] == RESOURCE_MARKER {
        // "8BIM" (4) + resource id (2) + pascal name padded to even + size (4) + data
        let id_at = pos + 4;
        if id_at + 3 > data.len() {
            anyhow::bail!("Truncated Photoshop resource header");
        }
        let resource_id = u16::from_be_bytes([data[id_at], data[id_at + 1]]);
        let name_len = data[id_at + 2] as usize;
        // Length byte plus name, padded to even
        let name_padded = (name_len + 2) & !1;

        let size_at = id_at + 2 + name_padded;
        if size_at + 4 > data.len() {
            anyhow::bail!("Truncated Photoshop resource header");
        }
        let size = u32::from_be_bytes([
            data[size_at],
            data[size_at + 1],
            data[size_at + 2],
            data[size_at + 3],
        ]) as usize;

        let start = size_at + 4;
        let end = start + size;
        if end > data.len() {
            anyhow::bail!("Photoshop resource 0x{resource_id:04X} overruns APP13 segment");
        }

        if resource_id == IPTC_RESOURCE_ID {
            return Ok(Some(&data[start..end]));
        }

        pos = end + size % 2;
    }

    Ok(None)
}

/// Decode IIM datasets, keeping caption and keywords from record 2.
fn parse_iim(data: &[u8]) -> Result<IptcData> {
    let mut result = IptcData::default();
    let mut pos = 0;

    // Trailing padding ends the dataset stream
    while pos + 5 <= data.len() && data[pos] == TAG_MARKER {
        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let declared = u16::from_be_bytes([data[pos + 3], data[pos + 4]]);
        pos += 5;

        let length = if declared & 0x8000 != 0 {
            // Extended dataset: low bits give the width of the real length field
            let width = (declared & 0x7FFF) as usize;
            if width > 4 || pos + width > data.len() {
                anyhow::bail!("Invalid extended IPTC dataset length");
            }
            let length = data[pos..pos + width]
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize);
            pos += width;
            length
        } else {
            declared as usize
        };

        if pos + length > data.len() {
            anyhow::bail!("IPTC dataset {record}:{dataset} overruns its resource");
        }
        let value = &data[pos..pos + length];
        pos += length;

        if record != APPLICATION_RECORD {
            continue;
        }

        match dataset {
            DATASET_KEYWORDS => {
                let keyword = decode_text(value);
                if !keyword.is_empty() {
                    result.keywords.push(keyword);
                }
            }
            DATASET_CAPTION if result.caption.is_none() => {
                let caption = decode_text(value);
                if !caption.is_empty() {
                    result.caption = Some(caption);
                }
            }
            _ => {}
        }
    }

    Ok(result)
}

/// IIM text is UTF-8 in modern files and Latin-1 in older ones.
fn decode_text(value: &[u8]) -> String {
    let text = match std::str::from_utf8(value) {
        Ok(s) => s.to_string(),
        Err(_) => value.iter().map(|&b| b as char).collect(),
    };
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string()
}
