use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::classify::FileRecord;
use crate::config::{Requirement, RunConfig};
use crate::pipeline::RunCounters;

/// Rendered in place of a missing caption.
pub const NO_CAPTION: &str = "None";

/// Writer for the exceptions report and its companion CSV export.
///
/// Both outputs are append-only and line oriented. CSV fields are wrapped in
/// double quotes but not escaped, so a caption containing `"` produces a row
/// that strict CSV readers will split differently.
pub struct ReportWriter<W: Write> {
    report: W,
    csv: W,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) the report file and `<report>.csv`.
    pub fn create(config: &RunConfig) -> Result<Self> {
        let report = File::create(&config.report_path).with_context(|| {
            format!("Failed to create report file {}", config.report_path.display())
        })?;
        let csv_path = config.csv_path();
        let csv = File::create(&csv_path)
            .with_context(|| format!("Failed to create CSV file {}", csv_path.display()))?;
        Ok(Self::new(BufWriter::new(report), BufWriter::new(csv)))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(report: W, csv: W) -> Self {
        Self { report, csv }
    }

    /// Report preamble and CSV header row.
    pub fn write_header(
        &mut self,
        root: &str,
        requirement: Requirement,
        started: &str,
    ) -> Result<()> {
        writeln!(self.report, "JPEG metadata exceptions for all files starting at root :  {root}")?;
        writeln!(self.report, "Lists non-jpegs, or where caption and/or keywords are missing")?;
        writeln!(
            self.report,
            "Require (B)oth captions and keywords (default = not)? -  {}",
            requirement.label()
        )?;
        writeln!(self.report, "{}", "=".repeat(80))?;
        writeln!(self.report, " ")?;
        writeln!(self.report, "Started:  {started}")?;
        writeln!(self.report, " ")?;

        writeln!(self.csv, "\"Filename\",\"Caption\",\"Keywords\"")?;
        Ok(())
    }

    pub fn not_a_jpeg(&mut self, path: &str) -> Result<()> {
        writeln!(self.report, "{path} - Not a JPEG")?;
        Ok(())
    }

    pub fn metadata_exception(&mut self, record: &FileRecord) -> Result<()> {
        writeln!(
            self.report,
            "{} - Caption:  {}  - Keywords:  {}",
            record.path,
            caption_text(record.caption.as_deref()),
            keyword_list(&record.keywords)
        )?;
        Ok(())
    }

    pub fn csv_row(&mut self, record: &FileRecord) -> Result<()> {
        writeln!(
            self.csv,
            "\"{}\",\"{}\",\"{}\"",
            record.path,
            caption_text(record.caption.as_deref()),
            keyword_list(&record.keywords)
        )?;
        Ok(())
    }

    /// Summary counts and end time.
    pub fn write_footer(&mut self, counters: &RunCounters, ended: &str) -> Result<()> {
        writeln!(self.report)?;
        writeln!(self.report, "{}", summary_line(counters))?;
        writeln!(self.report)?;
        writeln!(self.report, "Ended:  {ended}")?;
        writeln!(self.report)?;
        writeln!(self.report, "Processing complete")?;
        Ok(())
    }

    /// Flush both outputs and hand back the underlying writers.
    pub fn finish(mut self) -> Result<(W, W)> {
        self.report.flush().context("Failed to flush report file")?;
        self.csv.flush().context("Failed to flush CSV file")?;
        Ok((self.report, self.csv))
    }
}

/// `Directories :  n \t Files :  n \t Exceptions :  n`
pub fn summary_line(counters: &RunCounters) -> String {
    format!(
        "Directories :  {} \t Files :  {} \t Exceptions :  {}",
        counters.directories, counters.files, counters.exceptions
    )
}

pub fn caption_text(caption: Option<&str>) -> &str {
    caption.unwrap_or(NO_CAPTION)
}

/// Render keywords as a bracketed, quoted list: `['beach', 'sunset']`.
pub fn keyword_list(keywords: &[String]) -> String {
    let quoted: Vec<String> = keywords.iter().map(|k| format!("'{k}'")).collect();
    format!("[{}]", quoted.join(", "))
}
