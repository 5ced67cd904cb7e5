//! CLI integration tests
//!
//! Drive the built `internlog` binary end to end: create a file, edit it the
//! way the persistence layer would, then check, digest and export it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn internlog() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_internlog"));
    cmd.env_remove("INTERNLOG_OUT_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Create a one-week internship file and log a single day into it
fn logged_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("internship.json");
    let output = internlog()
        .args(["init", "--location", "Acme Labs", "--start", "2024-01-01", "--weeks", "1"])
        .args(["--full-name", "Ada Lovelace", "--username", "ada"])
        .arg("--output")
        .arg(&path)
        .output()
        .expect("failed to execute internlog");
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    let raw = std::fs::read_to_string(&path).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["internship"]["weeks"][0]["days"][0]["log"]["Tasks Completed"] = "Reviewed PR".into();
    doc["internship"]["weeks"][0]["summary"] = "Productive week".into();
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}

fn export(file: &Path, out_dir: &Path, extra: &[&str]) -> Output {
    internlog()
        .arg("export")
        .arg(file)
        .arg("--out-dir")
        .arg(out_dir)
        .args(extra)
        .output()
        .expect("failed to execute internlog")
}

#[test]
fn init_writes_blank_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.json");
    let output = internlog()
        .args(["init", "--location", "Berlin", "--start", "2024-03-04", "--weeks", "3"])
        .args(["--field", "Learned", "--field", "Blockers"])
        .arg("-o")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["internship"]["totalWeeks"], 3);
    assert_eq!(doc["internship"]["startDate"], "2024-03-04");
    assert_eq!(doc["internship"]["logFields"], serde_json::json!(["Learned", "Blockers"]));
    assert_eq!(doc["internship"]["weeks"].as_array().unwrap().len(), 3);
    assert_eq!(doc["internship"]["weeks"][2]["days"][6]["date"], "2024-03-24");
}

#[test]
fn init_rejects_zero_weeks() {
    let dir = tempfile::tempdir().unwrap();
    let output = internlog()
        .args(["init", "--location", "Berlin", "--start", "2024-03-04", "--weeks", "0"])
        .arg("-o")
        .arg(dir.path().join("x.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn check_reports_contents() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);

    let output = internlog().arg("check").arg(&file).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "OK: Acme Labs - 1 weeks, 2 log fields, 1 logged days, 1 summaries"
    );
}

#[test]
fn check_fails_on_inconsistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);
    let raw = std::fs::read_to_string(&file).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["internship"]["totalWeeks"] = 2.into();
    std::fs::write(&file, doc.to_string()).unwrap();

    let output = internlog().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("declares 2 weeks but contains 1"));
}

#[test]
fn export_writes_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);
    let out = dir.path().join("reports");

    let output = export(&file, &out, &[]);
    assert!(output.status.success(), "{}", stderr(&output));

    let html = std::fs::read_to_string(out.join("Internship_Report_Acme_Labs.html")).unwrap();
    assert!(html.contains("Week 1 Summary: Productive week"));
    assert!(html.contains("Reviewed PR"));

    let xlsx = std::fs::read(out.join("Internship_Report_Acme_Labs.xlsx")).unwrap();
    assert_eq!(&xlsx[0..2], b"PK");
    assert!(stdout(&output).contains("2 rows"));
}

#[test]
fn export_single_week_spreadsheet() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);
    let out = dir.path().join("reports");

    let output = export(&file, &out, &["--week", "1", "--format", "spreadsheet"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(out.join("Internship_Report_Week_1.xlsx").exists());
    assert!(!out.join("Internship_Report_Week_1.html").exists());
}

#[test]
fn export_missing_week_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);
    let out = dir.path().join("reports");

    let output = export(&file, &out, &["--week", "2"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Week 2 not found"));
    assert!(!out.exists());
}

#[test]
fn export_rejects_inconsistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);
    let raw = std::fs::read_to_string(&file).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["internship"]["totalWeeks"] = 50_000_000.into();
    std::fs::write(&file, doc.to_string()).unwrap();
    let out = dir.path().join("reports");

    let output = export(&file, &out, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("is not a valid internship file"));
    assert!(!stderr(&output).contains("panicked"));
    assert!(!out.exists());

    let output = internlog().arg("digest").arg(&file).args(["--week", "1"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn digest_prints_logged_activity() {
    let dir = tempfile::tempdir().unwrap();
    let file = logged_file(&dir);

    let output = internlog().arg("digest").arg(&file).args(["--week", "1"]).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "- Mon:\n  - Tasks Completed: Reviewed PR");

    let output = internlog()
        .arg("digest")
        .arg(&file)
        .args(["--week", "1", "--prompt"])
        .output()
        .unwrap();
    assert!(stdout(&output).starts_with("Based on the following structured daily logs"));
}
