//! Raw libqatzip ABI: structure layouts, status codes and the typed
//! function-pointer table the loader fills in.
//!
//! Nothing in here is safe to call directly; [`crate::session::Session`] and
//! [`crate::loader::QzLibrary`] wrap every entry point.

pub mod types;

use std::os::raw::{c_int, c_uchar, c_uint, c_void};

pub use types::{QzSession, QzSessionParams};

/// `int qzCompress(QzSession_T *sess, const unsigned char *src, unsigned int *src_len,
///                 unsigned char *dest, unsigned int *dest_len, unsigned int last)`
pub type QzCompressFn = unsafe extern "C" fn(
    sess: *mut QzSession,
    src: *const c_uchar,
    src_len: *mut c_uint,
    dest: *mut c_uchar,
    dest_len: *mut c_uint,
    last: c_uint,
) -> c_int;

/// `int qzDecompress(QzSession_T *sess, const unsigned char *src, unsigned int *src_len,
///                   unsigned char *dest, unsigned int *dest_len)`
pub type QzDecompressFn = unsafe extern "C" fn(
    sess: *mut QzSession,
    src: *const c_uchar,
    src_len: *mut c_uint,
    dest: *mut c_uchar,
    dest_len: *mut c_uint,
) -> c_int;

/// `int qzGetDefaults(QzSessionParams_T *defaults)`
pub type QzGetDefaultsFn = unsafe extern "C" fn(defaults: *mut QzSessionParams) -> c_int;

/// `int qzSetDefaults(QzSessionParams_T *defaults)`
pub type QzSetDefaultsFn = unsafe extern "C" fn(defaults: *mut QzSessionParams) -> c_int;

/// `unsigned int qzMaxCompressedLength(unsigned int src_sz)`
pub type QzMaxCompressedLengthFn = unsafe extern "C" fn(src_sz: c_uint) -> c_uint;

/// `void *qzMalloc(size_t sz, int numa, int force_pinned)`
pub type QzMallocFn =
    unsafe extern "C" fn(sz: libc::size_t, numa: c_int, force_pinned: c_int) -> *mut c_void;

/// `void qzFree(void *m)`
pub type QzFreeFn = unsafe extern "C" fn(m: *mut c_void);

/// `int qzTeardownSession(QzSession_T *sess)`
pub type QzTeardownSessionFn = unsafe extern "C" fn(sess: *mut QzSession) -> c_int;

/// Symbols that must be present for the library to be usable.
pub const REQUIRED_SYMBOLS: [&str; 6] = [
    "qzCompress",
    "qzDecompress",
    "qzGetDefaults",
    "qzSetDefaults",
    "qzMaxCompressedLength",
    "qzMalloc",
];

/// Symbols bound when the library exports them.
pub const OPTIONAL_SYMBOLS: [&str; 2] = ["qzFree", "qzTeardownSession"];

/// Typed function-pointer table for one loaded copy of libqatzip.
///
/// Built by the loader from `dlsym` results, or directly by callers that link
/// libqatzip statically (or supply stand-ins in tests).
#[derive(Clone, Copy, Debug)]
pub struct QzSymbols {
    pub compress: QzCompressFn,
    pub decompress: QzDecompressFn,
    pub get_defaults: QzGetDefaultsFn,
    pub set_defaults: QzSetDefaultsFn,
    pub max_compressed_length: QzMaxCompressedLengthFn,
    pub malloc: QzMallocFn,
    pub free: Option<QzFreeFn>,
    pub teardown_session: Option<QzTeardownSessionFn>,
}
