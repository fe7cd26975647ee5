//! Codec session: one `QzSession_T` and the calls that run through it.
//!
//! libqatzip sets a zeroed session up lazily on its first compress or
//! decompress call, using the process-wide defaults in force at that moment.
//! A session must never be used from two threads at once; every codec call
//! here takes `&mut self`, and `Session` is `Send` but not `Sync`.

use std::marker::PhantomData;

use crate::buffer::{BufferView, BufferViewMut};
use crate::displaylevel;
use crate::error::{check_status, CodecError, Operation};
use crate::ffi::QzSession;
use crate::loader::QzLibrary;

/// A libqatzip session bound to one loaded library.
pub struct Session<'lib> {
    lib: &'lib QzLibrary,
    // Boxed: libqatzip keeps pointers into the session between calls.
    state: Box<QzSession>,
    _not_sync: PhantomData<std::cell::Cell<()>>,
}

// SAFETY: the session is only touched through &mut self, and libqatzip does
// not tie a session to the thread that set it up.
unsafe impl Send for Session<'_> {}

impl<'lib> Session<'lib> {
    /// A fresh, not yet set up session.
    pub fn new(lib: &'lib QzLibrary) -> Self {
        Session {
            lib,
            state: Box::new(QzSession::empty()),
            _not_sync: PhantomData,
        }
    }

    pub fn library(&self) -> &'lib QzLibrary {
        self.lib
    }

    /// True once libqatzip has set the session up.
    pub fn is_initialized(&self) -> bool {
        !self.state.internal.is_null()
    }

    /// Bytes consumed by this session so far, as counted by libqatzip.
    pub fn total_in(&self) -> u64 {
        self.state.total_in as u64
    }

    /// Bytes produced by this session so far, as counted by libqatzip.
    pub fn total_out(&self) -> u64 {
        self.state.total_out as u64
    }

    /// Compress all of `input` into `output` as one complete unit.
    ///
    /// The output capacity is not checked up front; a region that is too
    /// small comes back from the library as [`CodecError::OperationFailed`].
    /// Returns the number of bytes written at the start of `output`.
    pub fn compress(&mut self, input: BufferView<'_>, mut output: BufferViewMut<'_>) -> Result<u32, CodecError> {
        let (src, mut src_len) = input.raw()?;
        let (dst, mut dst_len) = output.raw_mut("compressor output buffer")?;
        // SAFETY: src/dst are valid for src_len/dst_len bytes for the whole
        // call (borrowed views), and the session lives in a stable Box.
        let rc = unsafe {
            (self.lib.symbols().compress)(&mut *self.state, src, &mut src_len, dst, &mut dst_len, 1)
        };
        check_status(Operation::Compress, rc)?;
        Ok(dst_len)
    }

    /// Decompress `input` into `output`; returns the number of bytes written.
    pub fn decompress(&mut self, input: BufferView<'_>, mut output: BufferViewMut<'_>) -> Result<u32, CodecError> {
        let (src, mut src_len) = input.raw()?;
        let (dst, mut dst_len) = output.raw_mut("decompressor output buffer")?;
        // SAFETY: as in `compress`.
        let rc = unsafe {
            (self.lib.symbols().decompress)(&mut *self.state, src, &mut src_len, dst, &mut dst_len)
        };
        check_status(Operation::Decompress, rc)?;
        Ok(dst_len)
    }

    /// [`Session::compress`] over whole slices.
    pub fn compress_slice(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.compress(BufferView::new(input), BufferViewMut::new(output)).map(|n| n as usize)
    }

    /// [`Session::decompress`] over whole slices.
    pub fn decompress_slice(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        self.decompress(BufferView::new(input), BufferViewMut::new(output)).map(|n| n as usize)
    }

    /// Compress `input` into a new vector sized by `qzMaxCompressedLength`.
    pub fn compress_to_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let bound = self.lib.max_compressed_length(input.len())?;
        let mut out = vec![0u8; bound.max(1)];
        let n = self.compress_slice(input, &mut out)?;
        out.truncate(n);
        Ok(out)
    }

    /// Decompress `input` into a new vector of at most `max_len` bytes.
    pub fn decompress_to_vec(&mut self, input: &[u8], max_len: usize) -> Result<Vec<u8>, CodecError> {
        let mut out = vec![0u8; max_len];
        let n = self.decompress_slice(input, &mut out)?;
        out.truncate(n);
        Ok(out)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.is_initialized() {
            return;
        }
        if let Some(teardown) = self.lib.symbols().teardown_session {
            // SAFETY: the session was set up by this library and is not used again.
            let rc = unsafe { teardown(&mut *self.state) };
            if let Err(e) = check_status(Operation::TeardownSession, rc) {
                displaylevel!(2, "qatcodec: {}\n", e);
            }
        }
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("library", &self.lib.name())
            .field("initialized", &self.is_initialized())
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .finish()
    }
}
