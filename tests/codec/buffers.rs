// Native buffers: qzMalloc-backed QzBuffer, Scratch selection and the
// max_compressed_length bound.

use std::sync::atomic::Ordering;

use qatcodec::buffer::Scratch;
use qatcodec::error::CodecError;
use qatcodec::{AlignedBuffer, NativeBufferPrefs, Session};

use crate::mock;

#[test]
fn qz_malloc_buffer_is_zeroed_and_freed() {
    let lib = mock::library();
    let frees = mock::FREES.load(Ordering::SeqCst);
    {
        let mut buf = lib.malloc(4096, false, true).unwrap();
        assert_eq!(buf.capacity(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
        buf[0] = 1;
    }
    assert!(mock::FREES.load(Ordering::SeqCst) > frees);
}

#[test]
fn qz_malloc_failure_is_out_of_memory() {
    let mut symbols = mock::symbols();
    symbols.malloc = mock::malloc_fails;
    let lib = mock::library_with(symbols);
    assert_eq!(
        lib.malloc(64, false, true).unwrap_err(),
        CodecError::OutOfMemory { what: "qzMalloc buffer" }
    );
    assert!(lib.malloc(0, false, false).is_err());
}

#[test]
fn scratch_follows_prefs() {
    let lib = mock::library();
    let heap = Scratch::allocate(&lib, 128, &NativeBufferPrefs::default()).unwrap();
    assert!(matches!(heap, Scratch::Heap(_)));
    assert_eq!(heap.len(), 128);

    let prefs = NativeBufferPrefs { use_qz_malloc: true, ..Default::default() };
    let pinned = Scratch::allocate(&lib, 128, &prefs).unwrap();
    assert!(matches!(pinned, Scratch::Pinned(_)));
    assert_eq!(pinned.len(), 128);
}

#[test]
fn codec_runs_on_native_buffers() {
    let lib = mock::library();
    let mut s = Session::new(&lib);
    let mut src = lib.malloc(1024, false, true).unwrap();
    src.copy_from_slice(&mock::sample(1024));
    let mut dst = AlignedBuffer::new(lib.max_compressed_length(1024).unwrap(), 64).unwrap();
    let n = s.compress_slice(&src, &mut dst).unwrap();
    let mut back = AlignedBuffer::new(1024, 4096).unwrap();
    assert_eq!(s.decompress_slice(&dst[..n], &mut back).unwrap(), 1024);
    assert_eq!(&back[..], &src[..]);
}

#[test]
fn max_compressed_length_rejects_lengths_past_u32() {
    let lib = mock::library();
    assert_eq!(lib.max_compressed_length(10).unwrap(), 10 + mock::HEADER_LEN);
    if usize::BITS > 32 {
        let len = u32::MAX as usize + 1;
        assert_eq!(lib.max_compressed_length(len).unwrap_err(), CodecError::TooLarge { len });
    }
}
