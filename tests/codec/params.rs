// Integration tests for src/params.rs: process-wide defaults through
// qzGetDefaults / qzSetDefaults.
//
// Every test here holds mock::defaults_guard(), which serialises access to the
// stand-in's single set of defaults and resets them.

use std::thread;

use qatcodec::error::{CodecError, Operation};
use qatcodec::ffi::types::QZ_PARAMS;
use qatcodec::params::{DataFormat, Direction};
use qatcodec::{CodecConfig, Session};

use crate::mock;

#[test]
fn defaults_reflect_library_state() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let cfg = lib.defaults().unwrap();
    assert_eq!(cfg, CodecConfig::default());
    assert_eq!(cfg.direction, Direction::Both);
    assert_eq!(cfg.data_format, DataFormat::GzipExt);
    assert!(lib.applied_defaults().is_none());
}

#[test]
fn set_compression_level_changes_only_the_level() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let before = lib.defaults().unwrap();
    lib.set_compression_level(6).unwrap();
    let after = lib.defaults().unwrap();
    assert_eq!(after.level, 6);
    assert_eq!(after, before.with_level(6));
    assert_eq!(lib.applied_defaults(), Some(after));
    assert_eq!(mock::current_level(), 6);
}

#[test]
fn out_of_range_level_is_rejected_by_the_library() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let err = lib.set_compression_level(42).unwrap_err();
    assert_eq!(err, CodecError::InvalidParameters { op: Operation::SetDefaults, code: QZ_PARAMS });
    assert_eq!(lib.defaults().unwrap().level, 1);
    assert!(lib.applied_defaults().is_none());
}

#[test]
fn new_sessions_pick_up_the_level() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let mut early = Session::new(&lib);
    early.compress_to_vec(b"set up at level 1").unwrap();

    lib.set_compression_level(9).unwrap();
    let mut late = Session::new(&lib);
    let out = late.compress_to_vec(b"set up at level 9").unwrap();
    assert_eq!(out[3], 9);

    // Already set up: keeps the level it started with.
    let out = early.compress_to_vec(b"still level 1").unwrap();
    assert_eq!(out[3], 1);
}

#[test]
fn update_defaults_edits_several_fields() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let written = lib
        .update_defaults(|c| {
            c.level = 4;
            c.sw_backup = false;
            c.hw_buffer_size = 128 * 1024;
        })
        .unwrap();
    let read = lib.defaults().unwrap();
    assert_eq!(read, written);
    assert!(!read.sw_backup);
    assert_eq!(read.hw_buffer_size, 128 * 1024);
}

#[test]
fn concurrent_writers_never_lose_the_whole_update() {
    let _g = mock::defaults_guard();
    let lib = mock::library();
    let lib = &lib;
    thread::scope(|scope| {
        for level in 1..=8 {
            scope.spawn(move || {
                for _ in 0..50 {
                    lib.update_defaults(|c| {
                        c.level = level;
                        c.poll_sleep = level as u32 * 10;
                    })
                    .unwrap();
                }
            });
        }
    });
    // Each write is a whole read-modify-write: the two fields always agree.
    let cfg = lib.defaults().unwrap();
    assert_eq!(cfg.poll_sleep, cfg.level as u32 * 10);
    assert_eq!(lib.applied_defaults(), Some(cfg));
}
