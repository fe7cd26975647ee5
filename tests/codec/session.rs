// Integration tests for src/session.rs: compress / decompress through an
// explicit Session against the in-process libqatzip stand-in.
//
// Coverage:
//   - round trip of "AAAAAAAAAA" and of larger buffers
//   - compressed length never exceeds max_compressed_length
//   - decompress honours a (offset, len) input view
//   - empty output region is OutOfMemory, too small output is OperationFailed
//   - truncated / corrupted input is OperationFailed with the raw status kept
//   - lazy setup, byte counters and teardown on drop
//   - two threads with their own sessions do not interfere

use std::sync::atomic::Ordering;
use std::thread;

use qatcodec::error::{CodecError, Operation};
use qatcodec::ffi::types::{QZ_BUF_ERROR, QZ_DATA_ERROR};
use qatcodec::{BufferView, BufferViewMut, Session};

use crate::mock;

#[test]
fn ten_a_round_trip() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let input = b"AAAAAAAAAA";
    let mut compressed = vec![0u8; lib.max_compressed_length(input.len()).unwrap()];
    let n = s.compress_slice(input, &mut compressed).unwrap();
    let mut restored = vec![0u8; input.len()];
    let m = s.decompress_slice(&compressed[..n], &mut restored).unwrap();
    assert_eq!(m, input.len());
    assert_eq!(&restored, input);
}

#[test]
fn compressed_length_is_within_bound() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    for len in [1usize, 100, 4096, 100_000] {
        let data = mock::sample(len);
        let out = s.compress_to_vec(&data).unwrap();
        assert!(out.len() <= lib.max_compressed_length(len).unwrap());
        assert_eq!(s.decompress_to_vec(&out, len).unwrap(), data);
    }
}

#[test]
fn decompress_reads_from_offset() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let compressed = s.compress_to_vec(b"offset payload").unwrap();

    let mut framed = vec![0xEEu8; 5];
    framed.extend_from_slice(&compressed);
    framed.extend_from_slice(&[0xEE; 3]);

    let input = BufferView::range(&framed, 5, compressed.len()).unwrap();
    let mut out = [0u8; 64];
    let n = s.decompress(input, BufferViewMut::new(&mut out)).unwrap();
    assert_eq!(&out[..n as usize], b"offset payload");
}

#[test]
fn compress_writes_into_output_offset() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let mut out = vec![0u8; 64];
    let n = s
        .compress(BufferView::new(b"xyz"), BufferViewMut::range(&mut out, 10, 40).unwrap())
        .unwrap() as usize;
    assert!(out[..10].iter().all(|&b| b == 0));
    assert_eq!(&out[10..13], mock::MAGIC);
    assert_eq!(s.decompress_to_vec(&out[10..10 + n], 3).unwrap(), b"xyz");
}

#[test]
fn empty_output_is_out_of_memory() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let mut empty: [u8; 0] = [];
    assert_eq!(
        s.compress_slice(b"data", &mut empty).unwrap_err(),
        CodecError::OutOfMemory { what: "compressor output buffer" }
    );
    assert_eq!(
        s.decompress_slice(b"data", &mut empty).unwrap_err(),
        CodecError::OutOfMemory { what: "decompressor output buffer" }
    );
}

#[test]
fn undersized_output_is_reported_by_the_library() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let mut small = [0u8; 4];
    let err = s.compress_slice(b"does not fit", &mut small).unwrap_err();
    assert_eq!(err, CodecError::OperationFailed { op: Operation::Compress, code: QZ_BUF_ERROR });
    assert_eq!(err.status(), Some(QZ_BUF_ERROR));

    let compressed = s.compress_to_vec(b"does not fit").unwrap();
    let err = s.decompress_slice(&compressed, &mut small).unwrap_err();
    assert_eq!(err.status(), Some(QZ_BUF_ERROR));
}

#[test]
fn truncated_input_fails_decompress() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let compressed = s.compress_to_vec(&mock::sample(1000)).unwrap();
    let mut out = vec![0u8; 1000];
    let err = s.decompress_slice(&compressed[..compressed.len() / 2], &mut out).unwrap_err();
    assert_eq!(err, CodecError::OperationFailed { op: Operation::Decompress, code: QZ_DATA_ERROR });
}

#[test]
fn corrupted_input_fails_decompress() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let mut compressed = s.compress_to_vec(b"AAAAAAAAAA").unwrap();
    compressed[0] ^= 0xFF;
    let mut out = [0u8; 16];
    assert!(matches!(
        s.decompress_slice(&compressed, &mut out),
        Err(CodecError::OperationFailed { op: Operation::Decompress, .. })
    ));
}

#[test]
fn session_is_set_up_lazily_and_counts_bytes() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    assert!(!s.is_initialized());
    assert_eq!(s.total_in(), 0);

    let out = s.compress_to_vec(&[7u8; 100]).unwrap();
    assert!(s.is_initialized());
    assert_eq!(s.total_in(), 100);
    assert_eq!(s.total_out(), out.len() as u64);
}

#[test]
fn drop_tears_down_only_used_sessions() {
    let lib = mock::library();
    let before = mock::TEARDOWNS.load(Ordering::SeqCst);
    drop(Session::new(&lib));
    let mut used = Session::new(&lib);
    used.compress_to_vec(b"x").unwrap();
    drop(used);
    // Other tests may tear down concurrently; at least ours happened.
    assert!(mock::TEARDOWNS.load(Ordering::SeqCst) > before);
}

#[test]
fn drop_without_teardown_symbol_is_quiet() {
    let mut symbols = mock::symbols();
    symbols.teardown_session = None;
    let lib = mock::library_with(symbols);
    let mut s = Session::new(&lib);
    s.compress_to_vec(b"leaks its mock state, nothing else").unwrap();
    drop(s);
}

#[test]
fn sessions_on_two_threads_do_not_interfere() {
    let lib = mock::library();
    let lib = &lib;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..2u8)
            .map(|t| {
                scope.spawn(move || {
                    let mut s = Session::new(lib);
                    for i in 0..200usize {
                        let data = vec![t.wrapping_mul(31).wrapping_add(i as u8); 512 + i];
                        let c = s.compress_to_vec(&data).unwrap();
                        assert_eq!(s.decompress_to_vec(&c, data.len()).unwrap(), data);
                    }
                    s.total_in()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap() > 0);
        }
    });
}

#[test]
fn session_can_move_between_threads() {
    let lib = mock::leaked_library();
    let mut s = Session::new(lib);
    s.compress_to_vec(b"first thread").unwrap();
    let s = thread::spawn(move || {
        let mut s = s;
        s.compress_to_vec(b"second thread").unwrap();
        s
    })
    .join()
    .unwrap();
    assert_eq!(s.total_in(), 25);
}
