//! `qatcodec check`: report whether libqatzip is usable.
//!
//! Output follows the native library checker of the Hadoop integration:
//!
//! ```text
//! Native library checking:
//! qat:     true /usr/lib64/libqatzip.so
//! ```
//!
//! The check fails (exit code 1) when the library cannot be bound, or with
//! `-a` when a small round trip through it does not reproduce its input.

use std::fmt::Write as _;

use crate::error::{CodecError, LinkError, Operation, QatError};
use crate::ffi::types::QZ_DATA_ERROR;
use crate::loader::QzLibrary;
use crate::session::Session;

const PROBE: &[u8] = b"AAAAAAAAAA qatcodec library check qatcodec library check AAAAAAAAAA";

/// Outcome of one library check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub loaded: bool,
    /// Resolved path when loaded, otherwise empty.
    pub library: String,
    /// Why loading failed.
    pub link_error: Option<String>,
    /// Round-trip outcome; `None` when not requested or not loaded.
    pub round_trip: Option<Result<(), String>>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.loaded && !matches!(self.round_trip, Some(Err(_)))
    }

    /// The text printed on stdout.
    pub fn render(&self) -> String {
        let mut out = String::from("Native library checking:\n");
        let _ = writeln!(out, "qat:     {} {}", self.loaded, self.library);
        match &self.round_trip {
            Some(Ok(())) => out.push_str("round trip: ok\n"),
            Some(Err(e)) => {
                let _ = writeln!(out, "round trip: failed ({})", e);
            }
            None => {}
        }
        out
    }
}

/// Compress and decompress a fixed probe through a fresh session.
pub fn round_trip(lib: &QzLibrary) -> Result<(), QatError> {
    let mut session = Session::new(lib);
    let compressed = session.compress_to_vec(PROBE)?;
    let restored = session.decompress_to_vec(&compressed, PROBE.len())?;
    if restored != PROBE {
        // Treated as corrupt output of the library.
        return Err(CodecError::OperationFailed { op: Operation::Decompress, code: QZ_DATA_ERROR }.into());
    }
    Ok(())
}

/// Build a report from the result of binding the library.
pub fn check_with(bound: Result<&QzLibrary, LinkError>, all: bool) -> CheckReport {
    match bound {
        Ok(lib) => CheckReport {
            loaded: true,
            library: lib.library_path(),
            link_error: None,
            round_trip: all.then(|| round_trip(lib).map_err(|e| e.to_string())),
        },
        Err(e) => CheckReport {
            loaded: false,
            library: String::new(),
            link_error: Some(e.to_string()),
            round_trip: None,
        },
    }
}

/// Open `name` through the process-wide loader and check it.
pub fn check_library(name: &str, all: bool) -> CheckReport {
    check_with(crate::loader::init_from(name), all)
}
