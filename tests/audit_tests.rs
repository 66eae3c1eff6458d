mod common;

use common::{Fixture, jpeg_with, plain_jpeg, write_jpeg};
use jpeg_audit::config::RunConfig;
use jpeg_audit::metadata::read_metadata;
use jpeg_audit::pipeline::run;
use jpeg_audit::source::{LocalSource, open_source};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_for(root: &Path, out: &TempDir, require_both: bool) -> RunConfig {
    RunConfig {
        root: root.to_string_lossy().into_owned(),
        report_path: out.path().join("excp.txt"),
        require_both,
        credentials: None,
    }
}

/// Report body without the two timestamp lines.
fn report_body(config: &RunConfig) -> String {
    fs::read_to_string(&config.report_path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with("Started:") && !l.starts_with("Ended:"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn p(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

/// One directory: a.jpg (caption + keyword), b.JPEG (nothing), c.txt, d.mp4.
fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_jpeg(
        &dir.path().join("a.jpg"),
        &Fixture {
            exif_description: Some("Sunset"),
            keywords: &["beach"],
            ..Default::default()
        },
    );
    fs::write(dir.path().join("b.JPEG"), plain_jpeg()).unwrap();
    fs::write(dir.path().join("c.txt"), b"irrelevant").unwrap();
    fs::write(dir.path().join("d.mp4"), b"irrelevant").unwrap();
    dir
}

// ── Metadata reading ─────────────────────────────────────────────────

#[test]
fn exif_description_is_caption() {
    let bytes = jpeg_with(&Fixture {
        exif_description: Some("Sunset over the bay"),
        ..Default::default()
    });
    let data = read_metadata(&bytes[..]).unwrap();
    assert_eq!(data.caption.as_deref(), Some("Sunset over the bay"));
    assert!(data.keywords.is_empty());
}

#[test]
fn iptc_caption_is_fallback() {
    let bytes = jpeg_with(&Fixture {
        iptc_caption: Some("Harbour at dawn"),
        keywords: &["boats", "harbour"],
        ..Default::default()
    });
    let data = read_metadata(&bytes[..]).unwrap();
    assert_eq!(data.caption.as_deref(), Some("Harbour at dawn"));
    assert_eq!(data.keywords, vec!["boats", "harbour"]);
}

#[test]
fn exif_caption_wins_over_iptc() {
    let bytes = jpeg_with(&Fixture {
        exif_description: Some("From EXIF"),
        iptc_caption: Some("From IPTC"),
        keywords: &["kept"],
    });
    let data = read_metadata(&bytes[..]).unwrap();
    assert_eq!(data.caption.as_deref(), Some("From EXIF"));
    assert_eq!(data.keywords, vec!["kept"]);
}

#[test]
fn quoted_exif_caption_is_kept_verbatim() {
    let tree = TempDir::new().unwrap();
    write_jpeg(
        &tree.path().join("q.jpg"),
        &Fixture {
            exif_description: Some("\"Quoted\" title"),
            ..Default::default()
        },
    );
    let bytes = fs::read(tree.path().join("q.jpg")).unwrap();
    let data = read_metadata(&bytes[..]).unwrap();
    assert_eq!(data.caption.as_deref(), Some("\"Quoted\" title"));

    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, true);
    run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();

    let report = fs::read_to_string(&config.report_path).unwrap();
    assert!(report.contains("q.jpg - Caption:  \"Quoted\" title  - Keywords:  []\n"));
}

#[test]
fn plain_jpeg_has_no_metadata() {
    let bytes = plain_jpeg();
    let data = read_metadata(&bytes[..]).unwrap();
    assert!(data.caption.is_none());
    assert!(data.keywords.is_empty());
}

// ── Full runs ────────────────────────────────────────────────────────

#[test]
fn sample_tree_require_either() {
    let tree = sample_tree();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);

    let source = LocalSource::new(tree.path()).unwrap();
    let summary = run(&config, &source).unwrap();

    assert_eq!(summary.counters.directories, 1);
    assert_eq!(summary.counters.files, 4);
    assert_eq!(summary.counters.exceptions, 2);

    let report = fs::read_to_string(&config.report_path).unwrap();
    let b = p(tree.path(), "b.JPEG");
    let c = p(tree.path(), "c.txt");
    assert!(report.contains(&format!("{b} - Caption:  None  - Keywords:  []\n")));
    assert!(report.contains(&format!("{c} - Not a JPEG\n")));
    assert!(!report.contains("a.jpg"));
    assert!(!report.contains("d.mp4"));
    assert!(report.contains("Directories :  1 \t Files :  4 \t Exceptions :  2"));
    assert!(report.ends_with("Processing complete\n"));

    let csv = fs::read_to_string(config.csv_path()).unwrap();
    let a = p(tree.path(), "a.jpg");
    assert_eq!(
        csv,
        format!(
            "\"Filename\",\"Caption\",\"Keywords\"\n\"{a}\",\"Sunset\",\"['beach']\"\n\"{b}\",\"None\",\"[]\"\n"
        )
    );
}

#[test]
fn sample_tree_require_both() {
    let tree = sample_tree();
    write_jpeg(
        &tree.path().join("e.jpg"),
        &Fixture {
            iptc_caption: Some("Caption only"),
            ..Default::default()
        },
    );
    let out = TempDir::new().unwrap();

    let either = config_for(tree.path(), &out, false);
    let summary = run(&either, &LocalSource::new(tree.path()).unwrap()).unwrap();
    assert_eq!(summary.counters.exceptions, 2);

    let both = config_for(tree.path(), &out, true);
    let summary = run(&both, &LocalSource::new(tree.path()).unwrap()).unwrap();
    assert_eq!(summary.counters.files, 5);
    assert_eq!(summary.counters.exceptions, 3);

    let report = fs::read_to_string(&both.report_path).unwrap();
    assert!(report.contains("(default = not)? -  B\n"));
    let e = p(tree.path(), "e.jpg");
    assert!(report.contains(&format!("{e} - Caption:  Caption only  - Keywords:  []\n")));

    let csv = fs::read_to_string(both.csv_path()).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn files_emitted_in_name_order() {
    let tree = TempDir::new().unwrap();
    for name in ["z.jpg", "a.jpg", "m.jpg"] {
        fs::write(tree.path().join(name), plain_jpeg()).unwrap();
    }
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);
    run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();

    let csv = fs::read_to_string(config.csv_path()).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("a.jpg"));
    assert!(rows[1].contains("m.jpg"));
    assert!(rows[2].contains("z.jpg"));

    let report = report_body(&config);
    let a = report.find("a.jpg").unwrap();
    let m = report.find("m.jpg").unwrap();
    let z = report.find("z.jpg").unwrap();
    assert!(a < m && m < z);
}

#[test]
fn nested_directories_are_counted() {
    let tree = TempDir::new().unwrap();
    let year = tree.path().join("2023");
    let month = year.join("06");
    fs::create_dir_all(&month).unwrap();
    fs::create_dir(tree.path().join("empty")).unwrap();
    fs::write(tree.path().join("top.jpg"), plain_jpeg()).unwrap();
    fs::write(year.join("notes.txt"), b"x").unwrap();
    write_jpeg(
        &month.join("beach.jpg"),
        &Fixture {
            keywords: &["beach"],
            ..Default::default()
        },
    );

    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);
    let summary = run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();

    assert_eq!(summary.counters.directories, 4);
    assert_eq!(summary.counters.files, 3);
    // top.jpg has nothing; notes.txt is not a JPEG; beach.jpg has keywords
    assert_eq!(summary.counters.exceptions, 2);
}

#[test]
fn rerun_is_byte_identical_apart_from_timestamps() {
    let tree = sample_tree();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, true);
    let source = LocalSource::new(tree.path()).unwrap();

    run(&config, &source).unwrap();
    let first_report = report_body(&config);
    let first_csv = fs::read(config.csv_path()).unwrap();

    run(&config, &source).unwrap();
    assert_eq!(report_body(&config), first_report);
    assert_eq!(fs::read(config.csv_path()).unwrap(), first_csv);
}

#[test]
fn text_file_named_like_a_jpeg_is_treated_as_one() {
    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join("my.jpg.description.txt"), b"a caption, in prose").unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);

    let summary = run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();
    assert_eq!(summary.counters.exceptions, 1);

    let csv = fs::read_to_string(config.csv_path()).unwrap();
    assert!(csv.contains("my.jpg.description.txt\",\"None\",\"[]\""));
    let report = fs::read_to_string(&config.report_path).unwrap();
    assert!(!report.contains("Not a JPEG"));
}

#[test]
fn malformed_jpeg_aborts_run() {
    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join("a.jpg"), plain_jpeg()).unwrap();
    fs::write(
        tree.path().join("broken.jpg"),
        [0xFF, 0xD8, 0xFF, 0xE1, 0x40, 0x00, b'E', b'x'],
    )
    .unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);

    let err = run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("broken.jpg"));
}

#[cfg(unix)]
#[test]
fn non_utf8_file_name_is_audited() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tree = TempDir::new().unwrap();
    write_jpeg(
        &tree.path().join(OsStr::from_bytes(b"caf\xe9.jpg")),
        &Fixture {
            keywords: &["coffee"],
            ..Default::default()
        },
    );
    fs::write(tree.path().join("ok.jpg"), plain_jpeg()).unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);

    let summary = run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();
    assert_eq!(summary.counters.files, 2);
    // ok.jpg has nothing; the Latin-1 named file has a keyword
    assert_eq!(summary.counters.exceptions, 1);

    let csv = fs::read_to_string(config.csv_path()).unwrap();
    assert!(csv.contains("caf\u{FFFD}.jpg\",\"None\",\"['coffee']\""));
}

#[test]
fn open_source_selects_local_backend() {
    let tree = sample_tree();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);

    let source = open_source(&config).unwrap();
    assert_eq!(source.root(), config.root);
    let summary = run(&config, source.as_ref()).unwrap();
    assert_eq!(summary.counters.files, 4);
}

#[test]
fn summary_serializes_counts() {
    let tree = sample_tree();
    let out = TempDir::new().unwrap();
    let config = config_for(tree.path(), &out, false);
    let summary = run(&config, &LocalSource::new(tree.path()).unwrap()).unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["directories"], 1);
    assert_eq!(json["files"], 4);
    assert_eq!(json["exceptions"], 2);
    assert_eq!(json["require_both"], false);
}
