use std::fs;
use std::path::PathBuf;

use wc22_dashboard::dataset::load_matches;
use wc22_dashboard::export::export_metrics_workbook;
use wc22_dashboard::metrics::compute_metrics;
use wc22_dashboard::page::{render_page, write_page};
use wc22_dashboard::figures::build_dashboard;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wc22_dashboard_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

#[test]
fn workbook_has_one_offense_row_per_team_and_category() {
    let rows = load_matches(&fixture_path("matches_small.csv")).unwrap();
    let metrics = compute_metrics(&rows);
    let out = scratch_dir("export").join("metrics.xlsx");

    let report = export_metrics_workbook(&out, &rows, &metrics).expect("export should succeed");
    assert_eq!(report.matches, 5);
    assert_eq!(report.offense_rows, 18);

    let bytes = fs::read(&out).unwrap();
    // xlsx is a zip container.
    assert_eq!(&bytes[..2], b"PK");
    let _ = fs::remove_file(&out);
}

#[test]
fn page_write_replaces_existing_file() {
    let rows = load_matches(&fixture_path("matches_small.csv")).unwrap();
    let metrics = compute_metrics(&rows);
    let html = render_page(&build_dashboard(&rows, &metrics), "/plotly.js").unwrap();
    let out = scratch_dir("page").join("nested").join("dashboard.html");

    write_page(&out, "stale").unwrap();
    write_page(&out, &html).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), html);
    assert!(!out.with_extension("html.tmp").exists());
    let _ = fs::remove_file(&out);
}
