// Status translation at the session boundary: every failing libqatzip code
// surfaces as the right CodecError category with the raw code and wording.

use qatcodec::error::{CodecError, Operation, QatError};
use qatcodec::ffi::types::{QZ_FAIL, QZ_PARAMS};
use qatcodec::Session;

use crate::mock;

#[test]
fn qz_fail_is_operation_failed() {
    let mut symbols = mock::symbols();
    symbols.compress = mock::compress_fails;
    let lib = mock::library_with(symbols);
    let mut s = Session::new(&lib);
    let err = s.compress_to_vec(b"AAAAAAAAAA").unwrap_err();
    assert_eq!(err, CodecError::OperationFailed { op: Operation::Compress, code: QZ_FAIL });
    assert_eq!(err.to_string(), "Could not compress data. Function did not succeed (QZ_FAIL, -2)");
}

#[test]
fn qz_params_is_invalid_parameters() {
    let mut symbols = mock::symbols();
    symbols.compress = mock::compress_bad_params;
    let lib = mock::library_with(symbols);
    let mut s = Session::new(&lib);
    let err = s.compress_to_vec(b"x").unwrap_err();
    assert_eq!(err, CodecError::InvalidParameters { op: Operation::Compress, code: QZ_PARAMS });
    assert!(err.to_string().contains("member of params is invalid"));
}

#[test]
fn unknown_code_is_kept_verbatim() {
    let mut symbols = mock::symbols();
    symbols.decompress = mock::decompress_returns_42;
    let lib = mock::library_with(symbols);
    let mut s = Session::new(&lib);
    let mut out = [0u8; 8];
    let err = s.decompress_slice(b"whatever", &mut out).unwrap_err();
    assert_eq!(err, CodecError::UnrecognizedCode { op: Operation::Decompress, code: 42 });
    assert_eq!(err.status(), Some(42));
    assert_eq!(err.to_string(), "Could not decompress data. Return error code 42");
}

#[test]
fn codec_errors_lift_into_qat_error() {
    let err: QatError = CodecError::OutOfMemory { what: "compressor output buffer" }.into();
    assert!(matches!(err, QatError::Codec(CodecError::OutOfMemory { .. })));
    assert_eq!(err.to_string(), "Can't get compressor output buffer");
    assert!(std::error::Error::source(&err).is_some());
}
