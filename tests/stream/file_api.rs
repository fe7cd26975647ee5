// Integration tests for src/file.rs: compress_file / decompress_file on real
// files in a temporary directory.

use std::fs;
use std::io;

use qatcodec::file::{compress_file, decompress_file, FileOptions, Transfer};
use qatcodec::StreamOptions;
use tempfile::tempdir;

use crate::mock;

fn opts(block_size: usize) -> FileOptions {
    FileOptions { stream: StreamOptions::default().with_block_size(block_size), level: None }
}

#[test]
fn file_round_trip_reports_byte_counts() {
    let lib = mock::library();
    let dir = tempdir().unwrap();
    let src = dir.path().join("input.bin");
    let packed = dir.path().join("input.bin.qat");
    let restored = dir.path().join("restored.bin");
    let data = mock::sample(100_000);
    fs::write(&src, &data).unwrap();

    let c = compress_file(&lib, &src, &packed, &opts(32 * 1024)).unwrap();
    assert_eq!(c.bytes_in, data.len() as u64);
    assert_eq!(c.bytes_out, fs::metadata(&packed).unwrap().len());
    // Four blocks, each with a length prefix and the stand-in's header.
    assert_eq!(c.bytes_out, data.len() as u64 + 4 * (4 + mock::HEADER_LEN as u64));

    let d = decompress_file(&lib, &packed, &restored, &opts(32 * 1024)).unwrap();
    assert_eq!(d, Transfer { bytes_in: c.bytes_out, bytes_out: data.len() as u64 });
    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn empty_file_round_trip() {
    let lib = mock::library();
    let dir = tempdir().unwrap();
    let src = dir.path().join("empty");
    let packed = dir.path().join("empty.qat");
    let restored = dir.path().join("empty.out");
    fs::write(&src, b"").unwrap();

    let c = compress_file(&lib, &src, &packed, &FileOptions::default()).unwrap();
    assert_eq!(c, Transfer::default());
    assert_eq!(c.ratio(), 0.0);
    decompress_file(&lib, &packed, &restored, &FileOptions::default()).unwrap();
    assert!(fs::read(&restored).unwrap().is_empty());
}

#[test]
fn level_is_applied_before_compressing() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let dir = tempdir().unwrap();
    let src = dir.path().join("lvl");
    let packed = dir.path().join("lvl.qat");
    fs::write(&src, b"AAAAAAAAAA").unwrap();

    let opts = FileOptions { level: Some(7), ..opts(64 * 1024) };
    compress_file(&lib, &src, &packed, &opts).unwrap();
    let stream = fs::read(&packed).unwrap();
    assert_eq!(stream[4 + 3], 7);
    assert_eq!(lib.applied_defaults().map(|c| c.level), Some(7));
}

#[test]
fn missing_source_is_not_found() {
    let lib = mock::library();
    let dir = tempdir().unwrap();
    let err = compress_file(
        &lib,
        &dir.path().join("absent"),
        &dir.path().join("out"),
        &FileOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn truncated_stream_file_fails() {
    let lib = mock::library();
    let dir = tempdir().unwrap();
    let src = dir.path().join("t");
    let packed = dir.path().join("t.qat");
    fs::write(&src, mock::sample(5000)).unwrap();
    compress_file(&lib, &src, &packed, &opts(32 * 1024)).unwrap();
    let mut stream = fs::read(&packed).unwrap();
    stream.truncate(stream.len() - 1);
    fs::write(&packed, &stream).unwrap();

    let err = decompress_file(&lib, &packed, &dir.path().join("t.out"), &opts(32 * 1024)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
