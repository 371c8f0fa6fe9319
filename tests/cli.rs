use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("tubeset")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn build_fails_when_input_table_is_missing() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("tubeset")
        .unwrap()
        .args([
            "--quiet",
            "build",
            "--input",
            &dir.path().join("no-such-file.csv").to_string_lossy(),
            "--output",
            &dir.path().join("dataset.csv").to_string_lossy(),
            "--video-dir",
            &dir.path().join("mp4").to_string_lossy(),
            "--audio-dir",
            &dir.path().join("mp3").to_string_lossy(),
            "--transcript-dir",
            &dir.path().join("txt").to_string_lossy(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-file.csv"));
}

#[test]
fn build_rejects_zero_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("videos.csv");
    std::fs::write(&input, "url\n").unwrap();

    Command::cargo_bin("tubeset")
        .unwrap()
        .args([
            "build",
            "--input",
            &input.to_string_lossy(),
            "--output",
            &dir.path().join("dataset.csv").to_string_lossy(),
            "--video-dir",
            &dir.path().join("mp4").to_string_lossy(),
            "--audio-dir",
            &dir.path().join("mp3").to_string_lossy(),
            "--transcript-dir",
            &dir.path().join("txt").to_string_lossy(),
            "--pairs",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pair_count"));
}
