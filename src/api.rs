//! Host-facing facade over the process-wide library.
//!
//! This is the flat call surface a language binding expects: one `init`, then
//! stateless-looking `compress` / `decompress` calls. Each calling thread gets
//! its own [`Session`], created on first use and torn down when the thread
//! exits, so calls from different threads never share session state.
//!
//! Everything here fails with [`LinkError::NotInitialized`] (wrapped in
//! [`QatError`]) until [`init`] has succeeded.

use std::cell::RefCell;

use crate::buffer::{AlignedBuffer, BufferView, BufferViewMut};
use crate::error::{LinkError, QatError};
use crate::loader::{self, QzLibrary};
use crate::session::Session;

thread_local! {
    static SESSION: RefCell<Option<Session<'static>>> = const { RefCell::new(None) };
}

fn library() -> Result<&'static QzLibrary, LinkError> {
    loader::library()
}

/// Run `f` with this thread's session, creating it on first use.
pub fn with_session<T, F>(f: F) -> Result<T, QatError>
where
    F: FnOnce(&mut Session<'static>) -> Result<T, QatError>,
{
    let lib = library()?;
    SESSION.with(|cell| {
        let mut slot = cell.borrow_mut();
        let session = slot.get_or_insert_with(|| Session::new(lib));
        f(session)
    })
}

/// Load and bind libqatzip. Safe to call any number of times.
pub fn init() -> Result<(), QatError> {
    loader::init()?;
    Ok(())
}

/// Compress the first `src_len` bytes of `src` into `dst`.
///
/// Returns the compressed length.
pub fn compress(src: &[u8], src_len: usize, dst: &mut [u8]) -> Result<usize, QatError> {
    let input = BufferView::range(src, 0, src_len)?;
    with_session(|s| Ok(s.compress(input, BufferViewMut::new(dst))? as usize))
}

/// Decompress `src_len` bytes of `src` starting at `src_off` into `dst`.
///
/// Returns the decompressed length.
pub fn decompress(src: &[u8], src_off: usize, src_len: usize, dst: &mut [u8]) -> Result<usize, QatError> {
    let input = BufferView::range(src, src_off, src_len)?;
    with_session(|s| Ok(s.decompress(input, BufferViewMut::new(dst))? as usize))
}

/// Upper bound on the compressed size of `input_len` bytes.
pub fn max_compressed_length(input_len: usize) -> Result<usize, QatError> {
    Ok(library()?.max_compressed_length(input_len)?)
}

/// Zeroed heap buffer of `capacity` bytes aligned to `alignment`.
///
/// Does not touch libqatzip and so works before [`init`].
pub fn allocate_aligned_buffer(capacity: usize, alignment: usize) -> Result<AlignedBuffer, QatError> {
    Ok(AlignedBuffer::new(capacity, alignment)?)
}

/// [`allocate_aligned_buffer`] at the default 64-byte alignment.
pub fn allocate_buffer(capacity: usize) -> Result<AlignedBuffer, QatError> {
    Ok(AlignedBuffer::with_default_alignment(capacity)?)
}

/// Set the process-wide compression level for sessions set up afterwards.
pub fn set_compression_level(level: i32) -> Result<(), QatError> {
    Ok(library()?.set_compression_level(level)?)
}

/// Resolved path of the loaded library.
pub fn library_name() -> Result<String, QatError> {
    Ok(library()?.library_path())
}
