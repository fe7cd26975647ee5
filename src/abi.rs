//! C-ABI shims over the host facade in [`crate::api`].
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! Every function returns a non-negative value on success and one of the
//! negative `QATCODEC_E*` codes on failure. The message of the last failure
//! on the calling thread is available through `qatcodec_last_error`.

use std::cell::RefCell;
use std::os::raw::{c_char, c_int, c_long, c_void};
use std::slice;

use crate::api;
use crate::buffer::AlignedBuffer;
use crate::error::{CodecError, QatError};

pub const QATCODEC_ELINK: c_int = -1;
pub const QATCODEC_EPARAMS: c_int = -2;
pub const QATCODEC_EFAIL: c_int = -3;
pub const QATCODEC_ENOMEM: c_int = -4;
pub const QATCODEC_EUNKNOWN: c_int = -5;
pub const QATCODEC_ERANGE: c_int = -6;

// ─── helpers ─────────────────────────────────────────────────────────────────

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

fn error_code(e: &QatError) -> c_int {
    match e {
        QatError::Link(_) => QATCODEC_ELINK,
        QatError::Codec(c) => match c {
            CodecError::InvalidParameters { .. } => QATCODEC_EPARAMS,
            CodecError::OperationFailed { .. } => QATCODEC_EFAIL,
            CodecError::OutOfMemory { .. } => QATCODEC_ENOMEM,
            CodecError::UnrecognizedCode { .. } => QATCODEC_EUNKNOWN,
            CodecError::OutOfRange { .. } | CodecError::TooLarge { .. } => QATCODEC_ERANGE,
        },
    }
}

/// Record `e` for `qatcodec_last_error` and return its code.
fn fail(e: QatError) -> c_int {
    let code = error_code(&e);
    LAST_ERROR.with(|m| *m.borrow_mut() = e.to_string());
    code
}

fn out_of_memory(what: &'static str) -> c_int {
    fail(CodecError::OutOfMemory { what }.into())
}

fn len_or_fail(r: Result<usize, QatError>) -> c_long {
    match r {
        Ok(n) => n as c_long,
        Err(e) => fail(e) as c_long,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// int qatcodec_init(void);
//
// Loads libqatzip. Returns 0, or QATCODEC_ELINK.
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub extern "C" fn qatcodec_init() -> c_int {
    match api::init() {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// long qatcodec_compress(const char *src, size_t src_len,
//                        char *dst, size_t dst_capacity);
//
// Returns the compressed length, or a negative error code.
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub unsafe extern "C" fn qatcodec_compress(
    src: *const c_char,
    src_len: usize,
    dst: *mut c_char,
    dst_capacity: usize,
) -> c_long {
    if src.is_null() && src_len != 0 {
        return out_of_memory("compressor input buffer") as c_long;
    }
    if dst.is_null() || dst_capacity == 0 {
        return out_of_memory("compressor output buffer") as c_long;
    }
    let src_slice = if src_len == 0 { &[][..] } else { slice::from_raw_parts(src as *const u8, src_len) };
    let dst_slice = slice::from_raw_parts_mut(dst as *mut u8, dst_capacity);
    len_or_fail(api::compress(src_slice, src_len, dst_slice))
}

// ─────────────────────────────────────────────────────────────────────────────
// long qatcodec_decompress(const char *src, size_t src_off, size_t src_len,
//                          char *dst, size_t dst_capacity);
//
// Decompresses src[src_off .. src_off + src_len]. Returns the decompressed
// length, or a negative error code.
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub unsafe extern "C" fn qatcodec_decompress(
    src: *const c_char,
    src_off: usize,
    src_len: usize,
    dst: *mut c_char,
    dst_capacity: usize,
) -> c_long {
    if src.is_null() && src_len != 0 {
        return out_of_memory("decompressor input buffer") as c_long;
    }
    if dst.is_null() || dst_capacity == 0 {
        return out_of_memory("decompressor output buffer") as c_long;
    }
    let Some(end) = src_off.checked_add(src_len) else {
        return fail(CodecError::TooLarge { len: usize::MAX }.into()) as c_long;
    };
    let src_slice = if src.is_null() || end == 0 { &[][..] } else { slice::from_raw_parts(src as *const u8, end) };
    let dst_slice = slice::from_raw_parts_mut(dst as *mut u8, dst_capacity);
    len_or_fail(api::decompress(src_slice, src_off, src_len, dst_slice))
}

// ─────────────────────────────────────────────────────────────────────────────
// long qatcodec_max_compressed_length(size_t src_len);
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub extern "C" fn qatcodec_max_compressed_length(src_len: usize) -> c_long {
    len_or_fail(api::max_compressed_length(src_len))
}

// ─────────────────────────────────────────────────────────────────────────────
// void *qatcodec_alloc_aligned(size_t capacity, size_t alignment);
// void  qatcodec_free_aligned(void *p, size_t capacity, size_t alignment);
//
// Zeroed, aligned memory. NULL on failure (see qatcodec_last_error). The
// capacity and alignment passed to free must match the allocation.
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub extern "C" fn qatcodec_alloc_aligned(capacity: usize, alignment: usize) -> *mut c_void {
    match api::allocate_aligned_buffer(capacity, alignment) {
        Ok(buf) => buf.into_raw().cast(),
        Err(e) => {
            fail(e);
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn qatcodec_free_aligned(p: *mut c_void, capacity: usize, alignment: usize) {
    drop(AlignedBuffer::from_raw(p.cast(), capacity, alignment));
}

// ─────────────────────────────────────────────────────────────────────────────
// int qatcodec_set_compression_level(int level);
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub extern "C" fn qatcodec_set_compression_level(level: c_int) -> c_int {
    match api::set_compression_level(level) {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// size_t qatcodec_last_error(char *buf, size_t capacity);
//
// Copies the last failure message of this thread into buf, NUL-terminated and
// truncated to capacity. Returns the full message length (without NUL).
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub unsafe extern "C" fn qatcodec_last_error(buf: *mut c_char, capacity: usize) -> usize {
    LAST_ERROR.with(|m| {
        let msg = m.borrow();
        if !buf.is_null() && capacity > 0 {
            let n = msg.len().min(capacity - 1);
            let out = slice::from_raw_parts_mut(buf as *mut u8, capacity);
            out[..n].copy_from_slice(&msg.as_bytes()[..n]);
            out[n] = 0;
        }
        msg.len()
    })
}
