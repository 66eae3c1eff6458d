//! # jpeg-audit
//!
//! Audit a photo library for missing descriptive metadata. Every file under a
//! root folder (local, or on an SMB network share) is checked; JPEGs have their
//! caption and keywords read from EXIF and IPTC, and two files are written:
//!
//! - an **exceptions report** listing non-JPEGs and JPEGs missing a caption
//!   and/or keywords, with a summary footer, and
//! - a **CSV export** (`<report>.csv`) with the path, caption and keywords of
//!   every JPEG.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jpeg_audit::config::RunConfig;
//! use jpeg_audit::pipeline::run;
//! use jpeg_audit::source::open_source;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RunConfig {
//!         root: "/home/me/Pictures".into(),
//!         report_path: "/tmp/excp.txt".into(),
//!         require_both: false,
//!         credentials: None,
//!     };
//!     config.validate()?;
//!
//!     let source = open_source(&config)?;
//!     let summary = run(&config, source.as_ref())?;
//!     println!(
//!         "Directories : {}  Files : {}  Exceptions : {}",
//!         summary.counters.directories, summary.counters.files, summary.counters.exceptions
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Classification
//!
//! | File name contains | Result |
//! |--------------------|--------|
//! | `jpg` or `jpeg` (any case) | Metadata read, CSV row, report line if requirement unmet |
//! | `.avi`, `.mp4` or `.mov` | Skipped silently |
//! | anything else | "Not a JPEG" report line |
//!
//! With `require_both = false` a JPEG is flagged only when it has neither a
//! caption nor keywords; with `require_both = true` it is flagged when either
//! is missing.
//!
//! ## Modules
//!
//! - [`classify`] — Name-based file classification and the exception rule
//! - [`config`] — Run configuration, loading/saving
//! - [`metadata`] — EXIF/IPTC caption and keyword reading
//! - [`pipeline`] — Tree walk, per-file audit, and the full run
//! - [`report`] — Exceptions report and CSV writers
//! - [`source`] — Local and network-share traversal backends

pub mod classify;
pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod source;
