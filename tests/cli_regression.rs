// Regression tests for the snapshotter binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

fn write_golden(dir: &Path, file: &str, body: &str) -> PathBuf {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();
    path
}

const GREETING: &str = r#"[
  {
    "name": "greeting",
    "values": [
      "hello\nworld"
    ]
  },
  {
    "name": "count",
    "values": [
      3
    ]
  }
]
"#;

#[test]
fn cli_lists_entries() {
    let tmp = TempDir::new().unwrap();
    write_golden(tmp.path(), "suite--greet.snapshots.json", GREETING);

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("list").arg(tmp.path());
    cmd.assert()
        .success()
        .stdout(contains("suite--greet.snapshots.json"))
        .stdout(contains("  - greeting (1 value)"))
        .stdout(contains("  - count (1 value)"));
}

#[test]
fn cli_show_prints_strings_raw() {
    let tmp = TempDir::new().unwrap();
    let path = write_golden(tmp.path(), "greet.snapshots.json", GREETING);

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("show").arg(&path);
    cmd.assert()
        .success()
        .stdout(contains("--- greeting ---\nhello\nworld\n"))
        .stdout(contains("--- count ---\n[\n  3\n]\n"));
}

#[test]
fn cli_check_reports_broken_files() {
    let tmp = TempDir::new().unwrap();
    write_golden(tmp.path(), "good.snapshots.json", GREETING);
    write_golden(tmp.path(), "nested/bad.snapshots.json", "{\"name\": 1}");

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("check").arg(tmp.path());
    cmd.assert()
        .failure()
        .stdout(contains("checked 2 snapshot files, 1 failed"))
        .stderr(contains("snapshotter::decode").or(contains("bad.snapshots.json")));
}

#[test]
fn cli_check_passes_clean_directory() {
    let tmp = TempDir::new().unwrap();
    write_golden(tmp.path(), "good.snapshots.json", GREETING);

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("check").arg(tmp.path());
    cmd.assert()
        .success()
        .stdout(contains("checked 1 snapshot files, 0 failed"));
}

#[test]
fn cli_diff_shows_first_difference() {
    let tmp = TempDir::new().unwrap();
    let expected = write_golden(tmp.path(), "expected.snapshots.json", GREETING);
    let received = write_golden(
        tmp.path(),
        "received.snapshots.json",
        &GREETING.replace("world", "there").replace("3", "4"),
    );

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("diff").arg(&expected).arg(&received);
    cmd.assert()
        .failure()
        .stdout(contains("snapshot greeting differs:"))
        .stdout(contains("-world\n+there\n"))
        .stdout(contains("count").not());
}

#[test]
fn cli_diff_identical_files_succeeds() {
    let tmp = TempDir::new().unwrap();
    let a = write_golden(tmp.path(), "a.snapshots.json", GREETING);
    let b = write_golden(tmp.path(), "b.snapshots.json", GREETING);

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("diff").arg(&a).arg(&b);
    cmd.assert().success().stdout(contains("differs").not());
}

#[test]
fn cli_reports_miette_diagnostics_on_missing_file() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("snapshotter").unwrap();
    cmd.arg("show").arg(tmp.path().join("absent.snapshots.json"));
    cmd.assert().failure().stderr(
        contains("snapshotter::io::not_found")
            .or(contains("does not exist"))
            .or(contains("help:")),
    );
}
