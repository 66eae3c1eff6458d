use crate::config::Requirement;

/// Substrings that mark video files commonly found next to photos.
const EXCLUDED_MEDIA: &[&str] = &[".avi", ".mp4", ".mov"];

/// How a file is treated by the audit, decided from its name alone.
///
/// The check is a case-insensitive *substring* match on the whole path, not
/// an extension match: `holiday.jpg.txt` is treated as a JPEG and
/// `clip.mov.bak` is skipped as media.
///
/// # Example
///
/// ```rust
/// use jpeg_audit::classify::FileKind;
///
/// assert_eq!(FileKind::sniff("/photos/IMG_0001.JPG"), FileKind::Jpeg);
/// assert_eq!(FileKind::sniff("/photos/clip.MP4"), FileKind::ExcludedMedia);
/// assert_eq!(FileKind::sniff("/photos/notes.txt"), FileKind::NotImage);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Reported as "Not a JPEG" and counted as an exception.
    NotImage,
    /// Video file; skipped without any output.
    ExcludedMedia,
    /// Metadata is read, exported to CSV, and checked.
    Jpeg,
}

impl FileKind {
    pub fn sniff(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.contains("jpg") || lower.contains("jpeg") {
            Self::Jpeg
        } else if EXCLUDED_MEDIA.iter().any(|ext| lower.contains(ext)) {
            Self::ExcludedMedia
        } else {
            Self::NotImage
        }
    }
}

impl Requirement {
    /// Decide whether a JPEG with this caption and keyword list is an exception.
    pub fn is_exception(&self, caption: Option<&str>, keywords: &[String]) -> bool {
        let missing_caption = caption.is_none();
        let missing_keywords = keywords.is_empty();
        match self {
            Self::Both => missing_caption || missing_keywords,
            Self::Either => missing_caption && missing_keywords,
        }
    }
}

/// Outcome of auditing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub kind: FileKind,
    pub caption: Option<String>,
    pub keywords: Vec<String>,
    /// Whether the file produced an exceptions report line.
    pub exception: bool,
}

impl FileRecord {
    /// A record for a file whose metadata was never read.
    pub fn unread(path: &str, kind: FileKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
            caption: None,
            keywords: Vec::new(),
            exception: kind == FileKind::NotImage,
        }
    }
}
