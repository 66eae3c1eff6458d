use anyhow::Result;
use clap::Parser;
use dialoguer::{Input, Password};
use std::path::PathBuf;

use jpeg_audit::config::{Requirement, RunConfig};
use jpeg_audit::source::ShareRoot;
use jpeg_audit::{pipeline, report, source};

#[derive(Parser, Debug)]
#[command(
    name = "jpeg-audit",
    version,
    about = "Report JPEGs missing captions or keywords, and export every JPEG's metadata to CSV"
)]
struct Cli {
    /// Top-level photo folder, or host/share[/folder] for a network share
    #[arg(value_name = "ROOT")]
    root: Option<String>,

    /// Exceptions report file (the CSV export is written to <FILE>.csv)
    #[arg(short = 'o', long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Require BOTH a caption and keywords (default: either one is enough)
    #[arg(short, long)]
    both: bool,

    /// Username for the network share (switches ROOT to SMB)
    #[arg(short, long)]
    username: Option<String>,

    /// Password for the network share (prompted for when omitted)
    #[arg(long)]
    password: Option<String>,

    /// Workgroup/domain for the network share
    #[arg(long)]
    workgroup: Option<String>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = RunConfig::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => RunConfig::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let json = cli.json;
    let config = resolve_config(cli)?;
    config.validate()?;

    let tree = source::open_source(&config)?;
    let summary = pipeline::run(&config, tree.as_ref())?;

    // JSON output
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("{}", report::summary_line(&summary.counters));
    println!();
    println!("Processing complete");

    Ok(())
}

/// Config file, overridden by flags, with anything still missing prompted for.
fn resolve_config(cli: Cli) -> Result<RunConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => RunConfig::load(Some(path))?,
        None => {
            let default_path = RunConfig::config_path()?;
            if default_path.exists() {
                RunConfig::load(Some(&default_path))?
            } else {
                RunConfig::default()
            }
        }
    };

    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(report) = cli.report {
        config.report_path = report;
    }
    if cli.both {
        config.require_both = true;
    }
    if cli.username.is_some() || cli.password.is_some() || cli.workgroup.is_some() {
        let creds = config.credentials.get_or_insert_with(Default::default);
        if let Some(username) = cli.username {
            creds.username = username;
        }
        if let Some(password) = cli.password {
            creds.password = password;
        }
        if cli.workgroup.is_some() {
            creds.workgroup = cli.workgroup;
        }
    }

    let interactive = config.root.trim().is_empty();
    if interactive {
        config.root = if config.is_network() {
            prompt("Enter network path to jpegs root folder (e.g., 192.168.0.55/Photos Master)")?
        } else {
            prompt("Enter top level folder path for photos to analyze (e.g., /home/david/Pictures)")?
        };
        // A prompted host/share root still needs credentials
        if config.credentials.is_none() && ShareRoot::looks_like_share(&config.root) {
            config.credentials = Some(Default::default());
        }
    }

    if config.report_path.as_os_str().is_empty() {
        config.report_path = PathBuf::from(prompt(
            "Enter exceptions report file path and name (e.g., /home/david/Documents/Results/excp.txt)",
        )?);
    }

    if let Some(creds) = config.credentials.as_mut() {
        if creds.username.is_empty() {
            creds.username = prompt("Enter username for Samba share")?;
        }
        if creds.password.is_empty() {
            creds.password = Password::new()
                .with_prompt("Enter password for Samba share")
                .allow_empty_password(true)
                .interact()?;
        }
    }

    // Mode is only asked for in a fully interactive session
    if interactive && !config.require_both {
        let answer: String = Input::new()
            .with_prompt("Enter b or B to require BOTH captions and tags, otherwise just press Enter")
            .allow_empty(true)
            .interact_text()?;
        config.require_both = Requirement::from_flag(&answer) == Requirement::Both;
    }

    log::debug!(
        "Auditing {} ({} mode)",
        config.root,
        if config.require_both { "require both" } else { "require either" }
    );
    Ok(config)
}

fn prompt(text: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(text).interact_text()?;
    Ok(value.trim().to_string())
}
