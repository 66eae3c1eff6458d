use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Parameters for one audit run.
///
/// Built once at startup (from a config file, CLI flags, interactive
/// prompts, or any mix of them) and never mutated while the tree is walked.
///
/// # Loading
///
/// ```rust,no_run
/// use jpeg_audit::config::RunConfig;
///
/// // From a JSON file
/// let config = RunConfig::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = RunConfig::default();
/// config.root = "/home/me/Pictures".into();
/// config.report_path = "/tmp/excp.txt".into();
/// config.require_both = true;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Local directory, or `host/share[/dir...]` for a network share.
    pub root: String,
    /// Exceptions report file. The CSV export is written next to it.
    pub report_path: PathBuf,
    /// Flag files missing either caption or keywords instead of only those missing both.
    #[serde(default)]
    pub require_both: bool,
    /// Network share credentials. When present, `root` is read over SMB.
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Login for a network share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub workgroup: Option<String>,
}

/// Which metadata must be present for a JPEG to pass the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Flag only files with neither a caption nor keywords.
    #[default]
    Either,
    /// Flag files missing a caption or keywords.
    Both,
}

impl Requirement {
    /// Interpret the single-character mode answer: `b`/`B` means both,
    /// anything else (including an empty answer) means either.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("b") {
            Self::Both
        } else {
            Self::Either
        }
    }

    /// Value shown on the report's mode line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Both => "B",
            Self::Either => "No",
        }
    }
}

impl RunConfig {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: RunConfig =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    pub fn requirement(&self) -> Requirement {
        if self.require_both {
            Requirement::Both
        } else {
            Requirement::Either
        }
    }

    /// The CSV export path: the report path with `.csv` appended.
    pub fn csv_path(&self) -> PathBuf {
        let mut name = OsString::from(self.report_path.as_os_str());
        name.push(".csv");
        PathBuf::from(name)
    }

    pub fn is_network(&self) -> bool {
        self.credentials.is_some()
    }

    /// Check that the fields needed to start a run are filled in.
    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            anyhow::bail!("No root folder specified.");
        }
        if self.report_path.as_os_str().is_empty() {
            anyhow::bail!("No exceptions report path specified.");
        }
        if let Some(creds) = &self.credentials {
            if creds.username.is_empty() {
                anyhow::bail!("Network share credentials are missing a username.");
            }
        }
        Ok(())
    }
}
