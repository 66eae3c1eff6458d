use anyhow::Result;
use std::path::Path;

use super::{join_path, normalize_separators};

/// A network share location written as `host/share[/dir...]`.
///
/// Leading `smb://`, `//` or `\\` prefixes are accepted, and backslashes
/// anywhere are treated as separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRoot {
    pub host: String,
    pub share: String,
    /// Directory inside the share, `/`-rooted (`/` for the share itself).
    pub path: String,
}

impl ShareRoot {
    pub fn parse(root: &str) -> Result<Self> {
        let normalized = normalize_separators(root.trim());
        let trimmed = normalized
            .strip_prefix("smb://")
            .unwrap_or(&normalized)
            .trim_start_matches('/');

        let mut parts = trimmed.splitn(3, '/');
        let host = parts.next().unwrap_or_default();
        let share = parts.next().unwrap_or_default();
        if host.is_empty() || share.is_empty() {
            anyhow::bail!("Network root must look like host/share[/folder], got `{root}`");
        }

        let rest = parts.next().unwrap_or_default().trim_end_matches('/');
        let path = if rest.is_empty() {
            "/".to_string()
        } else {
            format!("/{rest}")
        };

        Ok(Self {
            host: host.to_string(),
            share: share.to_string(),
            path,
        })
    }

    /// Path prefix shared by every file reported from this share.
    pub fn display_prefix(&self) -> String {
        format!("{}/{}", self.host, self.share)
    }

    /// Turn a share-relative path into the form used in reports.
    pub fn display_path(&self, share_path: &str) -> String {
        let share_path = normalize_separators(share_path);
        let rel = share_path.trim_matches('/');
        if rel.is_empty() {
            self.display_prefix()
        } else {
            join_path(&self.display_prefix(), rel)
        }
    }

    /// Whether a user-entered root is written like a network share rather
    /// than a local folder.
    ///
    /// `smb://`, `//` and `\\` prefixes always mean a share. A bare
    /// `host/share` form counts only when it is relative and names no
    /// existing local path.
    pub fn looks_like_share(root: &str) -> bool {
        let root = root.trim();
        let explicit =
            root.starts_with("smb://") || root.starts_with("//") || root.starts_with(r"\\");
        if !explicit && (root.starts_with('/') || Path::new(root).exists()) {
            return false;
        }
        Self::parse(root).is_ok()
    }
}

#[cfg(feature = "smb")]
pub use client::SmbSource;

#[cfg(feature = "smb")]
mod client {
    use anyhow::{Context, Result};
    use pavao::{SmbClient, SmbCredentials, SmbDirentType, SmbOpenOptions, SmbOptions};
    use std::io::Read;

    use super::ShareRoot;
    use crate::config::Credentials;
    use crate::source::{DirListing, FileEntry, TreeSource, join_path};

    /// Photos on an SMB/CIFS share, read through libsmbclient.
    ///
    /// The session is opened once with the supplied credentials and reused
    /// for every listing and read. There is no reconnect; a dropped
    /// connection fails the run.
    pub struct SmbSource {
        client: SmbClient,
        root: ShareRoot,
        root_display: String,
    }

    impl SmbSource {
        pub fn connect(root: &str, credentials: &Credentials) -> Result<Self> {
            let root = ShareRoot::parse(root)?;

            let mut creds = SmbCredentials::default()
                .server(format!("smb://{}", root.host))
                .share(format!("/{}", root.share))
                .username(&credentials.username)
                .password(&credentials.password);
            if let Some(workgroup) = &credentials.workgroup {
                creds = creds.workgroup(workgroup);
            }

            let client = SmbClient::new(creds, SmbOptions::default().one_share_per_server(true))
                .with_context(|| format!("Failed to connect to {}", root.display_prefix()))?;
            log::debug!("Connected to smb://{}/{}", root.host, root.share);

            let root_display = root.display_path(&root.path);
            Ok(Self {
                client,
                root,
                root_display,
            })
        }

        /// List one share directory: its report listing and its subdirectories.
        fn list(&self, share_dir: &str) -> Result<(DirListing, Vec<String>)> {
            let mut entries = self
                .client
                .list_dir(share_dir)
                .with_context(|| format!("Failed to list {}", self.root.display_path(share_dir)))?;
            entries.retain(|e| e.name() != "." && e.name() != "..");

            let mut subdirs = Vec::new();
            let mut names = Vec::new();
            for entry in &entries {
                match entry.get_type() {
                    SmbDirentType::Dir => subdirs.push(join_path(share_dir, entry.name())),
                    _ => names.push(entry.name().to_string()),
                }
            }
            names.sort();

            let dir = self.root.display_path(share_dir);
            let files = names
                .iter()
                .map(|name| FileEntry::new(join_path(&dir, name), join_path(share_dir, name)))
                .collect();
            Ok((DirListing { dir, files }, subdirs))
        }
    }

    impl TreeSource for SmbSource {
        fn root(&self) -> &str {
            &self.root_display
        }

        fn walk(&self) -> Box<dyn Iterator<Item = Result<DirListing>> + '_> {
            Box::new(SmbWalk {
                source: self,
                pending: vec![self.root.path.clone()],
            })
        }

        fn open(&self, file: &FileEntry) -> Result<Box<dyn Read + '_>> {
            let share_path = file
                .location
                .to_str()
                .with_context(|| format!("Share path is not valid UTF-8: {}", file.path))?;
            let handle = self
                .client
                .open_with(share_path, SmbOpenOptions::default().read(true))
                .with_context(|| format!("Failed to open {}", file.path))?;
            Ok(Box::new(handle))
        }
    }

    /// Pre-order walk over share directories, listing each one on demand.
    struct SmbWalk<'a> {
        source: &'a SmbSource,
        pending: Vec<String>,
    }

    impl Iterator for SmbWalk<'_> {
        type Item = Result<DirListing>;

        fn next(&mut self) -> Option<Self::Item> {
            let dir = self.pending.pop()?;
            Some(self.source.list(&dir).map(|(listing, subdirs)| {
                self.pending.extend(subdirs.into_iter().rev());
                listing
            }))
        }
    }
}
