use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn space_hogs() -> Command {
    Command::cargo_bin("space-hogs").unwrap()
}

fn write_file(path: &Path, len: usize) {
    let mut file = File::create(path).unwrap();
    file.write_all(&vec![b'x'; len]).unwrap();
}

/// A small tree with a known ranking:
/// media/video.mkv (300) > logs/app.log (120) > report.pdf (100) > notes.txt (40)
fn create_test_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_file(&root.join("report.pdf"), 100);
    write_file(&root.join("notes.txt"), 40);
    fs::create_dir(root.join("media")).unwrap();
    write_file(&root.join("media").join("video.mkv"), 300);
    fs::create_dir(root.join("logs")).unwrap();
    write_file(&root.join("logs").join("app.log"), 120);

    dir
}

#[test]
fn shows_help() {
    space_hogs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("largest files"));
}

#[test]
fn shows_version() {
    space_hogs()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn reports_both_rankings() {
    let tree = create_test_tree();

    space_hogs()
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 10 largest files:"))
        .stdout(predicate::str::contains("Top 10 largest directories:"))
        .stdout(predicate::str::contains("video.mkv"))
        .stdout(predicate::str::contains("Scanned 4 files in 3 directories"));
}

#[test]
fn largest_entries_rank_first() {
    let tree = create_test_tree();

    let assert = space_hogs().arg(tree.path()).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    let video = stdout.find("video.mkv").unwrap();
    let log = stdout.find("app.log").unwrap();
    let pdf = stdout.find("report.pdf").unwrap();
    let notes = stdout.find("notes.txt").unwrap();
    assert!(video < log && log < pdf && pdf < notes);

    // Directory ranking: media (300) before logs (120).
    let media = stdout.rfind("media").unwrap();
    let logs = stdout.rfind("logs").unwrap();
    assert!(media < logs);
}

#[test]
fn top_flag_limits_rows() {
    let tree = create_test_tree();

    space_hogs()
        .args(["-n", "2"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 2 largest files:"))
        .stdout(predicate::str::contains("video.mkv"))
        .stdout(predicate::str::contains("app.log"))
        .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn single_worker_still_scans_everything() {
    let tree = create_test_tree();

    space_hogs()
        .args(["--jobs", "1"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Scanned 4 files in 3 directories"));
}

#[test]
fn json_output_is_parseable() {
    let tree = create_test_tree();

    let assert = space_hogs()
        .arg("--json")
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
    let stdout = assert.get_output().stdout.clone();

    let value: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(value["stats"]["files"], 4);
    assert_eq!(value["stats"]["dirs"], 3);
    assert_eq!(value["stats"]["bytes"], 560);
    assert_eq!(value["top_files"][0]["size"], 300);
    assert_eq!(value["top_dirs"][0]["size"], 560);
    assert!(value["root"].as_str().unwrap().len() > 1);
}

#[test]
fn missing_path_fails() {
    space_hogs()
        .arg("/nonexistent/space-hogs-root")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn file_path_fails() {
    let tree = create_test_tree();

    space_hogs()
        .arg(tree.path().join("report.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn empty_directory_reports_zero() {
    let dir = TempDir::new().unwrap();

    space_hogs()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 10 largest directories:"))
        .stdout(predicate::str::contains("0 B"))
        .stdout(predicate::str::contains("Scanned 0 files in 1 directories"));
}

#[test]
fn scans_relative_path() {
    let tree = create_test_tree();

    space_hogs()
        .current_dir(tree.path())
        .arg(".")
        .assert()
        .success()
        .stdout(predicate::str::contains("video.mkv"));
}

#[test]
fn quiet_flag_still_prints_report() {
    let tree = create_test_tree();

    space_hogs()
        .arg("-q")
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 10 largest files:"));
}

#[test]
fn config_file_sets_ranking_size() {
    let tree = create_test_tree();
    let config = tree.path().join("hogs.toml");
    fs::write(&config, "[report]\ntop = 1\n").unwrap();

    space_hogs()
        .args(["--config"])
        .arg(&config)
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 1 largest files:"))
        .stdout(predicate::str::contains("app.log").not());
}

#[test]
fn config_color_always_emits_ansi() {
    let tree = create_test_tree();
    let config = tree.path().join("hogs.toml");
    fs::write(&config, "[report]\ncolor = \"always\"\n").unwrap();

    space_hogs()
        .args(["--config"])
        .arg(&config)
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}["));
}

#[test]
fn no_color_flag_overrides_config() {
    let tree = create_test_tree();
    let config = tree.path().join("hogs.toml");
    fs::write(&config, "[report]\ncolor = \"always\"\n").unwrap();

    space_hogs()
        .args(["--no-color", "--config"])
        .arg(&config)
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}").not());
}

#[test]
fn invalid_config_path_fails() {
    space_hogs()
        .args(["--config", "/nonexistent/path.toml", "."])
        .assert()
        .failure();
}

#[test]
fn generates_shell_completions() {
    space_hogs()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("space-hogs"));
}
