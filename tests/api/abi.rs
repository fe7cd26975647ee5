// C-ABI shims (feature `c-abi`): return codes, null handling and the
// per-thread last-error message.

use std::os::raw::c_char;

use qatcodec::abi::*;

use crate::installed;

fn last_error() -> String {
    let mut buf = [0 as c_char; 256];
    let len = unsafe { qatcodec_last_error(buf.as_mut_ptr(), buf.len()) };
    let bytes: Vec<u8> = buf[..len.min(255)].iter().map(|&c| c as u8).collect();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn abi_round_trip() {
    installed();
    assert_eq!(qatcodec_init(), 0);
    let src = b"AAAAAAAAAA";
    let bound = qatcodec_max_compressed_length(src.len());
    assert!(bound >= src.len() as _);

    let mut c = vec![0u8; bound as usize];
    let n = unsafe {
        qatcodec_compress(src.as_ptr().cast(), src.len(), c.as_mut_ptr().cast(), c.len())
    };
    assert!(n > 0);

    let mut d = [0u8; 10];
    let m = unsafe {
        qatcodec_decompress(c.as_ptr().cast(), 0, n as usize, d.as_mut_ptr().cast(), d.len())
    };
    assert_eq!(m, 10);
    assert_eq!(&d, src);
}

#[test]
fn null_destination_is_enomem() {
    installed();
    let src = b"abc";
    let rc = unsafe { qatcodec_compress(src.as_ptr().cast(), 3, std::ptr::null_mut(), 64) };
    assert_eq!(rc, QATCODEC_ENOMEM as _);
    assert_eq!(last_error(), "Can't get compressor output buffer");
}

#[test]
fn corrupt_input_is_efail_with_message() {
    installed();
    let src = b"not a compressed block";
    let mut d = [0u8; 64];
    let rc = unsafe {
        qatcodec_decompress(src.as_ptr().cast(), 0, src.len(), d.as_mut_ptr().cast(), d.len())
    };
    assert_eq!(rc, QATCODEC_EFAIL as _);
    assert!(last_error().starts_with("Could not decompress data. Function did not succeed"));
}

#[test]
fn aligned_alloc_and_free() {
    let p = qatcodec_alloc_aligned(4096, 256);
    assert!(!p.is_null());
    assert_eq!(p as usize % 256, 0);
    unsafe { qatcodec_free_aligned(p, 4096, 256) };

    assert!(qatcodec_alloc_aligned(0, 64).is_null());
    assert!(last_error().contains("aligned native buffer"));
}

#[test]
fn last_error_truncates_to_capacity() {
    installed();
    unsafe { qatcodec_compress(std::ptr::null(), 5, std::ptr::null_mut(), 0) };
    let mut small = [0x7f as c_char; 8];
    let full = unsafe { qatcodec_last_error(small.as_mut_ptr(), small.len()) };
    assert!(full > 7);
    assert_eq!(small[7], 0);
    assert_eq!(unsafe { qatcodec_last_error(std::ptr::null_mut(), 0) }, full);
}

#[test]
fn null_empty_input_is_not_a_missing_buffer() {
    installed();
    let mut d = [0u8; 16];
    let rc = unsafe { qatcodec_decompress(std::ptr::null(), 0, 0, d.as_mut_ptr().cast(), d.len()) };
    assert_ne!(rc, QATCODEC_ENOMEM as _);
    assert!(!last_error().contains("input buffer"));

    let rc = unsafe { qatcodec_decompress(std::ptr::null(), 0, 4, d.as_mut_ptr().cast(), d.len()) };
    assert_eq!(rc, QATCODEC_ENOMEM as _);
    assert_eq!(last_error(), "Can't get decompressor input buffer");
}
