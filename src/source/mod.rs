//! Directory traversal and file access backends.
//!
//! The audit only needs two capabilities from wherever the photos live:
//! enumerate directories with their files, and open a file for reading.
//! [`TreeSource`] captures exactly that, with a local filesystem backend
//! ([`LocalSource`]) and a network share backend (`SmbSource`, behind the
//! `smb` feature).

mod local;
mod smb;

pub use local::LocalSource;
pub use smb::ShareRoot;
#[cfg(feature = "smb")]
pub use smb::SmbSource;

use anyhow::Result;
use std::io::Read;
use std::path::PathBuf;

use crate::config::RunConfig;

/// A file found by a walk.
///
/// `path` is what the report and CSV show; it may be a lossy rendering of
/// the real name. `location` is what the backend needs to open the file
/// again, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub location: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            location: location.into(),
        }
    }
}

/// One directory and the files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Directory path as shown in progress output.
    pub dir: String,
    /// Files in `dir`, ordered by file name.
    pub files: Vec<FileEntry>,
}

/// A tree of files that can be walked and read.
pub trait TreeSource {
    /// The root as shown in the report header.
    fn root(&self) -> &str;

    /// Lazily enumerate directories, starting with the root.
    ///
    /// Directories come in the backend's natural top-down order; files within
    /// each listing are sorted by name. Each call restarts the walk.
    fn walk(&self) -> Box<dyn Iterator<Item = Result<DirListing>> + '_>;

    /// Open a file previously returned in a [`DirListing`].
    fn open(&self, file: &FileEntry) -> Result<Box<dyn Read + '_>>;
}

/// Convert backslash separators to forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join a directory and a file name with a single `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = normalize_separators(dir);
    if dir.is_empty() || dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Open the backend the configuration asks for.
///
/// Credentials select the network share backend; otherwise `root` is a local
/// directory. Fails if the root cannot be reached.
pub fn open_source(config: &RunConfig) -> Result<Box<dyn TreeSource>> {
    match &config.credentials {
        None => Ok(Box::new(LocalSource::new(&config.root)?)),
        #[cfg(feature = "smb")]
        Some(credentials) => Ok(Box::new(SmbSource::connect(&config.root, credentials)?)),
        #[cfg(not(feature = "smb"))]
        Some(_) => anyhow::bail!(
            "Network share support is not compiled in. Rebuild with `--features smb`."
        ),
    }
}
