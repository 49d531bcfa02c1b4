//! Tests for the np binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let tags = temp.path().join("tags");
    fs::create_dir_all(tags.join("people")).unwrap();
    fs::write(tags.join("style.yml"), "masterpiece\n").unwrap();
    fs::write(
        tags.join("people/char.yml"),
        "hair: [long hair]\neyes:\n  left: blue eyes\n",
    )
    .unwrap();
    fs::write(temp.path().join("config.yml"), "log-level: error\n").unwrap();
    temp
}

fn np(temp: &Path) -> Command {
    let mut cmd = Command::cargo_bin("np").unwrap();
    cmd.current_dir(temp)
        .arg("--config")
        .arg(temp.join("config.yml"))
        .arg("--tags")
        .arg(temp.join("tags"))
        .arg("--seed")
        .arg("7");
    cmd
}

#[test]
fn test_expand_arguments() {
    let temp = fixture();
    np(temp.path())
        .args(["expand", "a @style@ car", "@2$$char:hair@", "no directives"])
        .assert()
        .success()
        .stdout("a masterpiece car\nlong hair\nno directives\n");
}

#[test]
fn test_expand_stdin_lines() {
    let temp = fixture();
    np(temp.path())
        .arg("expand")
        .write_stdin("@char:eyes@\n@char:missing@ end\n")
        .assert()
        .success()
        .stdout("blue eyes\n end\n");
}

#[test]
fn test_paths_lists_pools() {
    let temp = fixture();
    np(temp.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("@char@"))
        .stdout(predicate::str::contains("@char:hair@"))
        .stdout(predicate::str::contains("@char:eyes@"))
        .stdout(predicate::str::contains("@style@").not());
}

#[test]
fn test_paths_prefix_filter() {
    let temp = fixture();
    np(temp.path())
        .args(["paths", "char:h"])
        .assert()
        .success()
        .stdout("@char:hair@\n");
}

#[test]
fn test_files_lists_sources() {
    let temp = fixture();
    np(temp.path())
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("style.yml"))
        .stdout(predicate::str::contains("char.yml"));
}

#[test]
fn test_show_prints_subtree() {
    let temp = fixture();
    np(temp.path())
        .args(["show", "char:eyes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left: blue eyes"));
}

#[test]
fn test_show_missing_path_fails() {
    let temp = fixture();
    np(temp.path())
        .args(["show", "char:nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_batch_reports_changed_channels() {
    let temp = fixture();
    let batch = temp.path().join("batch.yml");
    fs::write(&batch, "primary:\n  - a car\nnegative:\n  - \"@style@, lowres\"\n").unwrap();

    np(temp.path())
        .arg("batch")
        .arg(&batch)
        .assert()
        .success()
        .stdout(predicate::str::contains("masterpiece, lowres"))
        .stdout(predicate::str::contains("primary: false"))
        .stdout(predicate::str::contains("negative: true"));
}

#[test]
fn test_batch_json_output() {
    let temp = fixture();
    let batch = temp.path().join("batch.yml");
    fs::write(&batch, "hires-primary:\n  - \"@style@\"\n").unwrap();

    np(temp.path())
        .arg("batch")
        .arg(&batch)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hires-primary\""))
        .stdout(predicate::str::contains("\"masterpiece\""));
}

#[test]
fn test_batch_rejects_unknown_channel() {
    let temp = fixture();
    let batch = temp.path().join("batch.yml");
    fs::write(&batch, "positive:\n  - a car\n").unwrap();

    np(temp.path()).arg("batch").arg(&batch).assert().failure();
}
