use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{DirListing, FileEntry, TreeSource};

/// Photos on a local (or locally mounted) filesystem.
///
/// Directories are walked top-down without following symlinks. Every
/// non-directory entry, whatever its type, is listed as a file.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    root_display: String,
}

impl LocalSource {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            anyhow::bail!("Root folder does not exist: {}", root.display());
        }
        let root_display = root.to_string_lossy().into_owned();
        Ok(Self { root, root_display })
    }
}

impl TreeSource for LocalSource {
    fn root(&self) -> &str {
        &self.root_display
    }

    fn walk(&self) -> Box<dyn Iterator<Item = Result<DirListing>> + '_> {
        let dirs = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter(|entry| match entry {
                Ok(e) => e.file_type().is_dir(),
                Err(_) => true,
            })
            .map(|entry| {
                let entry = entry.context("Failed to walk directory tree")?;
                list_directory(entry.path())
            });
        Box::new(dirs)
    }

    fn open(&self, file: &FileEntry) -> Result<Box<dyn Read + '_>> {
        let handle = File::open(&file.location)
            .with_context(|| format!("Failed to open {}", file.path))?;
        Ok(Box::new(handle))
    }
}

/// List the files directly inside `dir`, sorted by name.
fn list_directory(dir: &Path) -> Result<DirListing> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        // Symlinked directories are neither walked nor counted as files
        if entry.path().is_dir() {
            continue;
        }
        let path = entry.path();
        files.push(FileEntry::new(path.to_string_lossy(), path));
    }

    Ok(DirListing {
        dir: dir.to_string_lossy().into_owned(),
        files,
    })
}
