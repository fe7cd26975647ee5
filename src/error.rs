//! Error types and libqatzip status-code translation.
//!
//! Two layers, mirroring where a failure can originate:
//!
//! - [`LinkError`]: the shared library or one of its symbols could not be
//!   bound, or a codec call arrived before [`crate::loader::init`].
//! - [`CodecError`]: a bound entry point reported failure, or the caller's
//!   buffers could not be handed to it.
//!
//! [`QatError`] unifies both for the host-facing facade. Every variant that
//! originates in libqatzip keeps the raw status code.

use std::fmt;
use std::io;
use std::os::raw::c_int;

use crate::ffi::types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Operation labels
// ─────────────────────────────────────────────────────────────────────────────

/// The libqatzip entry point a status code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
    GetDefaults,
    SetDefaults,
    TeardownSession,
}

impl Operation {
    fn what(self) -> &'static str {
        match self {
            Operation::Compress => "compress data",
            Operation::Decompress => "decompress data",
            Operation::GetDefaults => "read session defaults",
            Operation::SetDefaults => "write session defaults",
            Operation::TeardownSession => "tear down session",
        }
    }
}

/// Symbolic name of a libqatzip status code, or `"unknown"`.
pub fn status_name(code: c_int) -> &'static str {
    match code {
        QZ_OK => "QZ_OK",
        QZ_DUPLICATE => "QZ_DUPLICATE",
        QZ_FORCE_SW => "QZ_FORCE_SW",
        QZ_PARAMS => "QZ_PARAMS",
        QZ_FAIL => "QZ_FAIL",
        QZ_BUF_ERROR => "QZ_BUF_ERROR",
        QZ_DATA_ERROR => "QZ_DATA_ERROR",
        QZ_TIMEOUT => "QZ_TIMEOUT",
        QZ_INTEG => "QZ_INTEG",
        QZ_NO_HW => "QZ_NO_HW",
        QZ_NO_MDRV => "QZ_NO_MDRV",
        QZ_NO_INST_ATTACH => "QZ_NO_INST_ATTACH",
        QZ_LOW_MEM => "QZ_LOW_MEM",
        QZ_LOW_DEST_MEM => "QZ_LOW_DEST_MEM",
        QZ_UNSUPPORTED_FMT => "QZ_UNSUPPORTED_FMT",
        QZ_NONE => "QZ_NONE",
        QZ_NOSW_NO_HW => "QZ_NOSW_NO_HW",
        QZ_NOSW_NO_MDRV => "QZ_NOSW_NO_MDRV",
        QZ_NOSW_NO_INST_ATTACH => "QZ_NOSW_NO_INST_ATTACH",
        QZ_NOSW_LOW_MEM => "QZ_NOSW_LOW_MEM",
        QZ_NO_SW_AVAIL => "QZ_NO_SW_AVAIL",
        QZ_NOSW_UNSUPPORTED_FMT => "QZ_NOSW_UNSUPPORTED_FMT",
        QZ_POST_PROCESS_ERROR => "QZ_POST_PROCESS_ERROR",
        _ => "unknown",
    }
}

/// Translate a libqatzip return code into `Ok(())` or a categorised error.
///
/// `QZ_PARAMS` is a caller/session misuse; the negative "did not succeed"
/// family (`QZ_FAIL`, `QZ_BUF_ERROR`, `QZ_DATA_ERROR`, timeouts, the
/// `QZ_NOSW_*` codes) is an operation failure; anything else, including the
/// positive informational codes, is unrecognised for a codec call.
pub fn check_status(op: Operation, code: c_int) -> Result<(), CodecError> {
    match code {
        QZ_OK => Ok(()),
        QZ_PARAMS => Err(CodecError::InvalidParameters { op, code }),
        QZ_FAIL | QZ_BUF_ERROR | QZ_DATA_ERROR | QZ_TIMEOUT | QZ_INTEG
        | QZ_POST_PROCESS_ERROR | QZ_NOSW_NO_HW | QZ_NOSW_NO_MDRV | QZ_NOSW_NO_INST_ATTACH
        | QZ_NOSW_LOW_MEM | QZ_NO_SW_AVAIL | QZ_NOSW_UNSUPPORTED_FMT => {
            Err(CodecError::OperationFailed { op, code })
        }
        _ => Err(CodecError::UnrecognizedCode { op, code }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LinkError
// ─────────────────────────────────────────────────────────────────────────────

/// The library could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The platform loader rejected the file; `reason` is its diagnostic.
    LibraryNotFound { library: String, reason: String },
    /// The library loaded but does not export a required entry point.
    MissingSymbol { library: String, symbol: &'static str },
    /// Dynamic loading is not available on this target.
    Unsupported { library: String },
    /// A codec call was made before [`crate::loader::init`] succeeded.
    NotInitialized,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::LibraryNotFound { library, reason } => {
                write!(f, "Can't load {} due to {}", library, reason)
            }
            LinkError::MissingSymbol { library, symbol } => {
                write!(f, "Failed to load {} from {}", symbol, library)
            }
            LinkError::Unsupported { library } => {
                write!(f, "Can't load {}: dynamic loading is not supported on this platform", library)
            }
            LinkError::NotInitialized => {
                f.write_str("libqatzip is not initialized; call qatcodec::init() first")
            }
        }
    }
}

impl std::error::Error for LinkError {}

// ─────────────────────────────────────────────────────────────────────────────
// CodecError
// ─────────────────────────────────────────────────────────────────────────────

/// A codec call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// `QZ_PARAMS`: the session or a parameter member is invalid.
    InvalidParameters { op: Operation, code: c_int },
    /// The library declined the operation (`QZ_FAIL` and relatives).
    OperationFailed { op: Operation, code: c_int },
    /// A buffer address was unavailable (null pointer or empty output region).
    OutOfMemory { what: &'static str },
    /// A return code this layer does not categorise.
    UnrecognizedCode { op: Operation, code: c_int },
    /// `offset + len` reaches past the end of the buffer.
    OutOfRange { offset: usize, len: usize, capacity: usize },
    /// A length does not fit libqatzip's 32-bit length fields.
    TooLarge { len: usize },
}

impl CodecError {
    /// Raw libqatzip status, when the error came from the library.
    pub fn status(&self) -> Option<c_int> {
        match *self {
            CodecError::InvalidParameters { code, .. }
            | CodecError::OperationFailed { code, .. }
            | CodecError::UnrecognizedCode { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CodecError::InvalidParameters { op, code } => write!(
                f,
                "Could not {}. *sess is NULL or member of params is invalid ({}, {})",
                op.what(),
                status_name(code),
                code
            ),
            CodecError::OperationFailed { op, code } => write!(
                f,
                "Could not {}. Function did not succeed ({}, {})",
                op.what(),
                status_name(code),
                code
            ),
            CodecError::OutOfMemory { what } => write!(f, "Can't get {}", what),
            CodecError::UnrecognizedCode { op, code } => {
                write!(f, "Could not {}. Return error code {}", op.what(), code)
            }
            CodecError::OutOfRange { offset, len, capacity } => write!(
                f,
                "range {}..{} is outside a buffer of {} bytes",
                offset,
                offset.saturating_add(len),
                capacity
            ),
            CodecError::TooLarge { len } => {
                write!(f, "length {} exceeds the 32-bit limit of libqatzip", len)
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for io::Error {
    fn from(e: CodecError) -> Self {
        let kind = match e {
            CodecError::OutOfMemory { .. } => io::ErrorKind::OutOfMemory,
            CodecError::InvalidParameters { .. }
            | CodecError::OutOfRange { .. }
            | CodecError::TooLarge { .. } => io::ErrorKind::InvalidInput,
            CodecError::OperationFailed { op: Operation::Decompress, .. } => {
                io::ErrorKind::InvalidData
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// QatError
// ─────────────────────────────────────────────────────────────────────────────

/// Any failure of the host-facing facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QatError {
    Link(LinkError),
    Codec(CodecError),
}

impl fmt::Display for QatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QatError::Link(e) => e.fmt(f),
            QatError::Codec(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for QatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QatError::Link(e) => Some(e),
            QatError::Codec(e) => Some(e),
        }
    }
}

impl From<LinkError> for QatError {
    fn from(e: LinkError) -> Self {
        QatError::Link(e)
    }
}

impl From<CodecError> for QatError {
    fn from(e: CodecError) -> Self {
        QatError::Codec(e)
    }
}

impl From<QatError> for io::Error {
    fn from(e: QatError) -> Self {
        match e {
            QatError::Link(l) => io::Error::new(io::ErrorKind::NotFound, l),
            QatError::Codec(c) => c.into(),
        }
    }
}
