// e2e/cli.rs: the `qatcodec` binary as a black box.
//
// Most cases do not need libqatzip: they point `--library` at a file that
// does not exist and check the reporting. The file round trip runs only when
// the real library can be loaded.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

const MISSING: &str = "/nonexistent/libqatzip-for-tests.so";

fn qatcodec_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_qatcodec") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("qatcodec");
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(qatcodec_bin())
        .args(args)
        .env_remove("QATCODEC_LIBRARY")
        .output()
        .expect("failed to run qatcodec")
}

fn library_available() -> bool {
    run(&["check"]).status.success()
}

#[test]
fn version_and_help() {
    let out = run(&["--version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));

    let out = run(&["--help"]);
    assert!(out.status.success());
    let help = String::from_utf8_lossy(&out.stdout);
    for sub in ["check", "compress", "decompress"] {
        assert!(help.contains(sub), "help should list {}", sub);
    }
}

#[test]
fn check_reports_missing_library() {
    let out = run(&["--library", MISSING, "check"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Native library checking:\n"));
    assert!(stdout.contains("qat:     false"));
}

#[test]
fn check_verbose_explains_the_failure() {
    let out = run(&["-v", "--library", MISSING, "check"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains(MISSING));
}

#[test]
fn compress_without_library_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "AAAAAAAAAA").unwrap();
    let output = dir.path().join("out.qat");
    let out = run(&[
        "--library",
        MISSING,
        "compress",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Can't load"));
    assert!(!output.exists());
}

#[test]
fn quiet_suppresses_error_output() {
    let out = run(&["-qq", "--library", MISSING, "decompress", "a", "b"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stderr.is_empty());
}

#[test]
fn bad_block_size_is_a_usage_error() {
    let out = run(&["compress", "a", "b", "-B", "12"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn file_round_trip_on_real_library() {
    if !library_available() {
        eprintln!("libqatzip not available; skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let packed = dir.path().join("input.qat");
    let restored = dir.path().join("restored.txt");
    let content = "Hello, QAT!\n".repeat(50_000);
    fs::write(&input, &content).unwrap();

    let out = run(&["compress", input.to_str().unwrap(), packed.to_str().unwrap(), "-l", "3", "-B", "64K"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let out = run(&["decompress", packed.to_str().unwrap(), restored.to_str().unwrap(), "-B", "64K"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&restored).unwrap(), content);
}
