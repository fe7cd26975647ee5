//! Buffer marshaling between caller memory and libqatzip's flat-pointer
//! calling convention.
//!
//! Caller data is never owned here. A [`BufferView`] / [`BufferViewMut`]
//! borrows a caller slice (optionally a sub-range of it) for exactly one
//! native call; the borrow keeps the address stable for that call and any
//! bytes the library writes are visible to the caller once it returns.
//!
//! Two owning buffer types exist for callers that want native memory:
//! [`AlignedBuffer`] (heap memory with a caller-chosen alignment) and
//! [`QzBuffer`] (memory from `qzMalloc`, optionally pinned / NUMA-local).

use std::alloc::{self, Layout};
use std::ops::{Deref, DerefMut};
use std::os::raw::{c_uchar, c_uint};
use std::ptr::NonNull;
use std::slice;

use crate::config;
use crate::error::CodecError;
use crate::loader::QzLibrary;

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

fn check_range(capacity: usize, offset: usize, len: usize) -> Result<(), CodecError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(CodecError::OutOfRange { offset, len, capacity }),
    }
}

fn c_len(len: usize) -> Result<c_uint, CodecError> {
    c_uint::try_from(len).map_err(|_| CodecError::TooLarge { len })
}

/// Read-only (base, length, offset) view over caller memory.
#[derive(Clone, Copy, Debug)]
pub struct BufferView<'a> {
    buf: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> BufferView<'a> {
    /// View the whole slice.
    pub fn new(buf: &'a [u8]) -> Self {
        BufferView { buf, offset: 0, len: buf.len() }
    }

    /// View `len` bytes of `buf` starting at `offset`.
    pub fn range(buf: &'a [u8], offset: usize, len: usize) -> Result<Self, CodecError> {
        check_range(buf.len(), offset, len)?;
        Ok(BufferView { buf, offset, len })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The viewed bytes.
    pub fn as_slice(&self) -> &'a [u8] {
        let buf: &'a [u8] = self.buf;
        &buf[self.offset..self.offset + self.len]
    }

    /// Base address (already advanced by the offset) and 32-bit length.
    pub(crate) fn raw(&self) -> Result<(*const c_uchar, c_uint), CodecError> {
        let len = c_len(self.len)?;
        Ok((self.as_slice().as_ptr(), len))
    }
}

impl<'a> From<&'a [u8]> for BufferView<'a> {
    fn from(buf: &'a [u8]) -> Self {
        BufferView::new(buf)
    }
}

/// Writable (base, length, offset) view over caller memory.
#[derive(Debug)]
pub struct BufferViewMut<'a> {
    buf: &'a mut [u8],
    offset: usize,
    len: usize,
}

impl<'a> BufferViewMut<'a> {
    /// View the whole slice.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let len = buf.len();
        BufferViewMut { buf, offset: 0, len }
    }

    /// View `len` bytes of `buf` starting at `offset`.
    pub fn range(buf: &'a mut [u8], offset: usize, len: usize) -> Result<Self, CodecError> {
        check_range(buf.len(), offset, len)?;
        Ok(BufferViewMut { buf, offset, len })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.offset..self.offset + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[self.offset..self.offset + self.len]
    }

    /// Base address and 32-bit capacity of the destination region.
    ///
    /// An empty region has no usable address for the library to write to and
    /// is reported as `OutOfMemory` naming `what`.
    pub(crate) fn raw_mut(&mut self, what: &'static str) -> Result<(*mut c_uchar, c_uint), CodecError> {
        if self.len == 0 {
            return Err(CodecError::OutOfMemory { what });
        }
        let len = c_len(self.len)?;
        Ok((self.as_mut_slice().as_mut_ptr(), len))
    }
}

impl<'a> From<&'a mut [u8]> for BufferViewMut<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        BufferViewMut::new(buf)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AlignedBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Zero-initialised heap buffer with a caller-chosen alignment.
///
/// Equivalent of the wrappers' `allocNativeBuffer(capacity, align)`.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the buffer exclusively owns its allocation.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `capacity` bytes aligned to `alignment` (a power of two).
    ///
    /// A zero capacity, an invalid alignment or a failed allocation are all
    /// reported as `OutOfMemory`.
    pub fn new(capacity: usize, alignment: usize) -> Result<Self, CodecError> {
        const WHAT: &str = "aligned native buffer";
        if capacity == 0 {
            return Err(CodecError::OutOfMemory { what: WHAT });
        }
        let layout = Layout::from_size_align(capacity, alignment)
            .map_err(|_| CodecError::OutOfMemory { what: WHAT })?;
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(CodecError::OutOfMemory { what: WHAT })?;
        Ok(AlignedBuffer { ptr, layout })
    }

    /// Allocate `capacity` bytes at [`config::BUFFER_ALIGNMENT_DEFAULT`].
    pub fn with_default_alignment(capacity: usize) -> Result<Self, CodecError> {
        Self::new(capacity, config::BUFFER_ALIGNMENT_DEFAULT)
    }

    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Give up ownership; the memory must come back through [`AlignedBuffer::from_raw`].
    pub fn into_raw(self) -> *mut u8 {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// Reclaim a buffer released by [`AlignedBuffer::into_raw`].
    ///
    /// # Safety
    /// `ptr`, `capacity` and `alignment` must be exactly those of a buffer
    /// previously returned by `into_raw`, and it must not be reclaimed twice.
    pub unsafe fn from_raw(ptr: *mut u8, capacity: usize, alignment: usize) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        let layout = Layout::from_size_align(capacity, alignment).ok()?;
        Some(AlignedBuffer { ptr, layout })
    }
}

impl Deref for AlignedBuffer {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        // SAFETY: ptr is valid and initialised for layout.size() bytes.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated in `new` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("capacity", &self.capacity())
            .field("alignment", &self.alignment())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// QzBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Memory obtained from `qzMalloc`, zeroed on allocation.
///
/// Released with `qzFree` when the library exports it; otherwise the memory
/// stays with libqatzip until process exit.
pub struct QzBuffer<'lib> {
    ptr: NonNull<u8>,
    len: usize,
    lib: &'lib QzLibrary,
}

// SAFETY: the buffer exclusively owns its allocation; qzFree is thread-safe.
unsafe impl Send for QzBuffer<'_> {}
unsafe impl Sync for QzBuffer<'_> {}

impl<'lib> QzBuffer<'lib> {
    /// # Safety
    /// `ptr` must be a live `qzMalloc` allocation of at least `len` bytes
    /// from `lib`, not owned by anything else.
    pub(crate) unsafe fn from_qz_malloc(ptr: NonNull<u8>, len: usize, lib: &'lib QzLibrary) -> Self {
        std::ptr::write_bytes(ptr.as_ptr(), 0, len);
        QzBuffer { ptr, len, lib }
    }

    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }
}

impl Deref for QzBuffer<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        // SAFETY: zeroed in from_qz_malloc, valid for len bytes.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for QzBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for QzBuffer<'_> {
    fn drop(&mut self) {
        if let Some(free) = self.lib.symbols().free {
            // SAFETY: the pointer came from this library's qzMalloc.
            unsafe { free(self.ptr.as_ptr().cast()) }
        }
    }
}

impl std::fmt::Debug for QzBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QzBuffer").field("capacity", &self.len).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scratch
// ─────────────────────────────────────────────────────────────────────────────

/// Working buffer owned by the stream adapters: plain heap or `qzMalloc`.
#[derive(Debug)]
pub enum Scratch<'lib> {
    Heap(Vec<u8>),
    Pinned(QzBuffer<'lib>),
}

impl<'lib> Scratch<'lib> {
    /// Allocate `size` bytes according to `prefs`.
    pub fn allocate(
        lib: &'lib QzLibrary,
        size: usize,
        prefs: &crate::config::NativeBufferPrefs,
    ) -> Result<Self, CodecError> {
        if prefs.use_qz_malloc {
            lib.malloc(size, prefs.numa, prefs.force_pinned).map(Scratch::Pinned)
        } else {
            Ok(Scratch::Heap(vec![0u8; size]))
        }
    }
}

impl Deref for Scratch<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            Scratch::Heap(v) => v,
            Scratch::Pinned(b) => b,
        }
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Scratch::Heap(v) => v,
            Scratch::Pinned(b) => b,
        }
    }
}
