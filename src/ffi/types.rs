//! `#[repr(C)]` mirrors of the structures and constants published in
//! `qatzip.h` (QATzip 1.0 ABI).
//!
//! These layouts are dictated by libqatzip and must not be rearranged. Enum
//! fields are stored as raw `c_uint` so that a value written by the library
//! that this crate does not know about can never produce an invalid Rust enum;
//! the typed view lives in [`crate::params::CodecConfig`].

use std::os::raw::{c_int, c_long, c_uchar, c_uint, c_ulong, c_void};
use std::ptr;

// ─────────────────────────────────────────────────────────────────────────────
// Status codes (qatzip.h "QATZIP Session Status definitions and function return codes")
// ─────────────────────────────────────────────────────────────────────────────

pub const QZ_OK: c_int = 0;
pub const QZ_DUPLICATE: c_int = 1;
pub const QZ_FORCE_SW: c_int = 2;
pub const QZ_PARAMS: c_int = -1;
pub const QZ_FAIL: c_int = -2;
pub const QZ_BUF_ERROR: c_int = -3;
pub const QZ_DATA_ERROR: c_int = -4;
pub const QZ_TIMEOUT: c_int = -5;
pub const QZ_INTEG: c_int = -100;
pub const QZ_NO_HW: c_int = 11;
pub const QZ_NO_MDRV: c_int = 12;
pub const QZ_NO_INST_ATTACH: c_int = 13;
pub const QZ_LOW_MEM: c_int = 14;
pub const QZ_LOW_DEST_MEM: c_int = 15;
pub const QZ_UNSUPPORTED_FMT: c_int = 16;
pub const QZ_NONE: c_int = 100;
pub const QZ_NOSW_NO_HW: c_int = -101;
pub const QZ_NOSW_NO_MDRV: c_int = -102;
pub const QZ_NOSW_NO_INST_ATTACH: c_int = -103;
pub const QZ_NOSW_LOW_MEM: c_int = -104;
pub const QZ_NO_SW_AVAIL: c_int = -105;
pub const QZ_NOSW_UNSUPPORTED_FMT: c_int = -116;
pub const QZ_POST_PROCESS_ERROR: c_int = -117;

// ─────────────────────────────────────────────────────────────────────────────
// Parameter enumerations (QzHuffmanHdr_T, QzDirection_T, QzDataFormat_T)
// ─────────────────────────────────────────────────────────────────────────────

pub const QZ_DYNAMIC_HDR: c_uint = 0;
pub const QZ_STATIC_HDR: c_uint = 1;

pub const QZ_DIR_COMPRESS: c_uint = 0;
pub const QZ_DIR_DECOMPRESS: c_uint = 1;
pub const QZ_DIR_BOTH: c_uint = 2;

pub const QZ_DEFLATE_4B: c_uint = 0;
pub const QZ_DEFLATE_GZIP: c_uint = 1;
pub const QZ_DEFLATE_GZIP_EXT: c_uint = 2;
pub const QZ_DEFLATE_RAW: c_uint = 3;

/// `QZ_DEFLATE` in `qatzip.h`; the only algorithm libqatzip implements.
pub const QZ_DEFLATE: c_uchar = 8;

// ─────────────────────────────────────────────────────────────────────────────
// QzSession_T
// ─────────────────────────────────────────────────────────────────────────────

/// Mirrors `QzSession_T`.
///
/// Zero-initialised (`internal == NULL`) means "not set up yet"; libqatzip
/// lazily initialises the session on its first compress/decompress call.
#[repr(C)]
#[derive(Debug)]
pub struct QzSession {
    pub hw_session_stat: c_long,
    pub thd_sess_stat: c_int,
    pub internal: *mut c_void,
    pub total_in: c_ulong,
    pub total_out: c_ulong,
}

impl QzSession {
    /// The empty initial state every session starts from.
    pub const fn empty() -> Self {
        QzSession {
            hw_session_stat: 0,
            thd_sess_stat: 0,
            internal: ptr::null_mut(),
            total_in: 0,
            total_out: 0,
        }
    }
}

impl Default for QzSession {
    fn default() -> Self {
        Self::empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// QzSessionParams_T
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes reserved after [`QzSessionParams`]'s last field.
///
/// Later libqatzip releases append fields (`polling_mode`, ...). The tail
/// keeps `qzGetDefaults` from writing past the end of a Rust-owned value when
/// a newer library is loaded.
pub const PARAMS_RESERVED_TAIL: usize = 64;

/// Mirrors `QzSessionParams_T`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QzSessionParams {
    pub huffman_hdr: c_uint,
    pub direction: c_uint,
    pub data_fmt: c_uint,
    pub comp_lvl: c_uint,
    pub comp_algorithm: c_uchar,
    pub poll_sleep: c_uint,
    pub max_forks: c_uint,
    pub sw_backup: c_uchar,
    pub hw_buff_sz: c_uint,
    pub strm_buff_sz: c_uint,
    pub input_sz_thrshold: c_uint,
    pub req_cnt_thrshold: c_uint,
    pub wait_cnt_thrshold: c_uint,
    pub reserved: [c_uchar; PARAMS_RESERVED_TAIL],
}

impl QzSessionParams {
    /// The values libqatzip itself ships as defaults (`qatzip_internal.h`).
    pub const fn library_defaults() -> Self {
        QzSessionParams {
            huffman_hdr: QZ_DYNAMIC_HDR,
            direction: QZ_DIR_BOTH,
            data_fmt: QZ_DEFLATE_GZIP_EXT,
            comp_lvl: 1,
            comp_algorithm: QZ_DEFLATE,
            poll_sleep: 10,
            max_forks: 3,
            sw_backup: 1,
            hw_buff_sz: 64 * 1024,
            strm_buff_sz: 64 * 1024,
            input_sz_thrshold: 1024,
            req_cnt_thrshold: 32,
            wait_cnt_thrshold: 8,
            reserved: [0; PARAMS_RESERVED_TAIL],
        }
    }
}

impl Default for QzSessionParams {
    fn default() -> Self {
        Self::library_defaults()
    }
}
