use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::classify::{FileKind, FileRecord};
use crate::config::{Requirement, RunConfig};
use crate::metadata;
use crate::report::ReportWriter;
use crate::source::{FileEntry, TreeSource};

/// Timestamp format used in the report header and footer.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Running totals for one audit. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Directories visited, including the root.
    pub directories: u64,
    /// Directory entries visited, whatever their kind.
    pub files: u64,
    /// Report lines written for non-JPEGs and JPEGs missing metadata.
    pub exceptions: u64,
}

/// What a completed run did, for console and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: String,
    pub report_path: PathBuf,
    pub csv_path: PathBuf,
    pub require_both: bool,
    pub started: String,
    pub ended: String,
    #[serde(flatten)]
    pub counters: RunCounters,
}

/// Classify one file and write its report and CSV lines.
///
/// - Videos (`.avi`, `.mp4`, `.mov`) produce no output.
/// - Other non-JPEG names get a "Not a JPEG" report line.
/// - JPEG names always get a CSV row, plus a report line when the
///   `requirement` is not met.
///
/// Metadata read failures are logged and returned; the file is not skipped.
pub fn classify_file<S, W>(
    file: &FileEntry,
    requirement: Requirement,
    source: &S,
    report: &mut ReportWriter<W>,
    counters: &mut RunCounters,
) -> Result<FileRecord>
where
    S: TreeSource + ?Sized,
    W: Write,
{
    let path = file.path.as_str();
    let kind = FileKind::sniff(path);
    match kind {
        FileKind::ExcludedMedia => {
            log::debug!("Skipping media file: {path}");
            return Ok(FileRecord::unread(path, kind));
        }
        FileKind::NotImage => {
            report.not_a_jpeg(path)?;
            counters.exceptions += 1;
            log::debug!("Not a JPEG: {path}");
            return Ok(FileRecord::unread(path, kind));
        }
        FileKind::Jpeg => {}
    }

    let data = source
        .open(file)
        .and_then(metadata::read_metadata)
        .map_err(|e| {
            log::error!("Failed to read metadata from {path}: {e:#}");
            e
        })
        .with_context(|| format!("Failed to read metadata from {path}"))?;

    let exception = requirement.is_exception(data.caption.as_deref(), &data.keywords);
    let record = FileRecord {
        path: path.to_string(),
        kind,
        caption: data.caption,
        keywords: data.keywords,
        exception,
    };

    report.csv_row(&record)?;
    if exception {
        report.metadata_exception(&record)?;
        counters.exceptions += 1;
    }

    log::debug!(
        "{path}: caption={:?} keywords={} exception={exception}",
        record.caption,
        record.keywords.len()
    );
    Ok(record)
}

/// Walk every directory of `source`, auditing each file in name order.
pub fn audit<S, W>(
    source: &S,
    requirement: Requirement,
    report: &mut ReportWriter<W>,
) -> Result<RunCounters>
where
    S: TreeSource + ?Sized,
    W: Write,
{
    let mut counters = RunCounters::default();

    for listing in source.walk() {
        let listing = listing?;
        counters.directories += 1;
        log::info!("Processing directory: {}", listing.dir);

        for file in &listing.files {
            counters.files += 1;
            classify_file(file, requirement, source, report, &mut counters)?;
        }
    }

    Ok(counters)
}

/// Run a full audit: create both outputs, write the header, walk the tree,
/// write the footer, and close the files.
///
/// # Example
///
/// ```rust,no_run
/// use jpeg_audit::config::RunConfig;
/// use jpeg_audit::pipeline::run;
/// use jpeg_audit::source::LocalSource;
///
/// # fn example() -> anyhow::Result<()> {
/// let mut config = RunConfig::default();
/// config.root = "/home/me/Pictures".into();
/// config.report_path = "/tmp/excp.txt".into();
///
/// let source = LocalSource::new(&config.root)?;
/// let summary = run(&config, &source)?;
/// println!("{} exceptions", summary.counters.exceptions);
/// # Ok(())
/// # }
/// ```
pub fn run<S>(config: &RunConfig, source: &S) -> Result<RunSummary>
where
    S: TreeSource + ?Sized,
{
    let requirement = config.requirement();
    let mut report = ReportWriter::create(config)?;

    let started = now();
    report.write_header(source.root(), requirement, &started)?;

    let counters = audit(source, requirement, &mut report)?;

    let ended = now();
    report.write_footer(&counters, &ended)?;
    report.finish()?;

    Ok(RunSummary {
        root: config.root.clone(),
        report_path: config.report_path.clone(),
        csv_path: config.csv_path(),
        require_both: config.require_both,
        started,
        ended,
        counters,
    })
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
