//! Library loader: binds libqatzip at run time and owns the resulting
//! function-pointer table.
//!
//! The shared object is opened with `dlopen(name, RTLD_LAZY | RTLD_GLOBAL)`
//! and each entry point is looked up by its exact exported name. A missing
//! library or a missing required symbol is a [`LinkError`]; nothing is
//! retried. The handle is never closed: libqatzip keeps process-wide
//! hardware state that outlives any one caller.
//!
//! Process-wide use goes through [`init`] (idempotent) and [`library`]
//! (which reports [`LinkError::NotInitialized`] until `init` succeeded).
//! Callers that link libqatzip themselves, or want an isolated table, build a
//! [`QzLibrary`] directly with [`QzLibrary::open`] or
//! [`QzLibrary::from_symbols`].

use std::os::raw::c_void;
use std::ptr::{self, NonNull};
use std::sync::{Mutex, OnceLock};

use crate::buffer::QzBuffer;
use crate::config;
use crate::displaylevel;
use crate::error::{CodecError, LinkError};
use crate::ffi::QzSymbols;
use crate::params::CodecConfig;

/// One bound copy of libqatzip.
pub struct QzLibrary {
    name: String,
    handle: *mut c_void,
    symbols: QzSymbols,
    /// Single-writer lock for the process-wide defaults, holding the last
    /// configuration this crate applied.
    pub(crate) defaults: Mutex<Option<CodecConfig>>,
}

// SAFETY: the dlopen handle is only used for identification, the symbol table
// is immutable after construction, and libqatzip's entry points may be called
// from any thread (sessions are never shared; see `Session`).
unsafe impl Send for QzLibrary {}
unsafe impl Sync for QzLibrary {}

impl std::fmt::Debug for QzLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QzLibrary")
            .field("name", &self.name)
            .field("dynamic", &!self.handle.is_null())
            .field("qzFree", &self.symbols.free.is_some())
            .field("qzTeardownSession", &self.symbols.teardown_session.is_some())
            .finish()
    }
}

impl QzLibrary {
    /// Wrap an already-resolved symbol table (static linking, stand-ins).
    pub fn from_symbols(name: impl Into<String>, symbols: QzSymbols) -> Self {
        QzLibrary {
            name: name.into(),
            handle: ptr::null_mut(),
            symbols,
            defaults: Mutex::new(None),
        }
    }

    /// Open the library named by `QATCODEC_LIBRARY`, or the platform default.
    pub fn open_default() -> Result<Self, LinkError> {
        Self::open(&config::library_name())
    }

    /// Open `name` through the platform loader and bind every entry point.
    #[cfg(unix)]
    pub fn open(name: &str) -> Result<Self, LinkError> {
        use std::ffi::CString;

        let c_name = CString::new(name).map_err(|_| LinkError::LibraryNotFound {
            library: name.to_owned(),
            reason: "file name contains a NUL byte".to_owned(),
        })?;
        // SAFETY: c_name is a valid NUL-terminated string.
        let handle = unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_LAZY | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(LinkError::LibraryNotFound {
                library: name.to_owned(),
                reason: dynamic::last_error(),
            });
        }

        // SAFETY: handle is a live dlopen handle.
        match unsafe { dynamic::resolve(handle, name) } {
            Ok(symbols) => {
                displaylevel!(4, "qatcodec: bound {} ({} optional symbols)\n", name,
                    symbols.free.is_some() as u8 + symbols.teardown_session.is_some() as u8);
                Ok(QzLibrary {
                    name: name.to_owned(),
                    handle,
                    symbols,
                    defaults: Mutex::new(None),
                })
            }
            Err(e) => {
                // SAFETY: nothing from this handle escaped.
                unsafe { libc::dlclose(handle) };
                Err(e)
            }
        }
    }

    #[cfg(not(unix))]
    pub fn open(name: &str) -> Result<Self, LinkError> {
        Err(LinkError::Unsupported { library: name.to_owned() })
    }

    /// The name this library was opened (or registered) under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &QzSymbols {
        &self.symbols
    }

    /// Resolved file path of the loaded shared object.
    ///
    /// Falls back to [`QzLibrary::name`] when the platform cannot tell.
    pub fn library_path(&self) -> String {
        #[cfg(has_dladdr)]
        {
            let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
            let addr = self.symbols.compress as *const c_void;
            // SAFETY: info is a valid out-parameter; addr is any address.
            let found = unsafe { libc::dladdr(addr, &mut info) };
            if found != 0 && !info.dli_fname.is_null() && !self.handle.is_null() {
                // SAFETY: dladdr returns a NUL-terminated path owned by the loader.
                let path = unsafe { std::ffi::CStr::from_ptr(info.dli_fname) };
                return path.to_string_lossy().into_owned();
            }
        }
        self.name.clone()
    }

    /// Upper bound on the compressed size of `input_len` bytes.
    pub fn max_compressed_length(&self, input_len: usize) -> Result<usize, CodecError> {
        let src_sz = u32::try_from(input_len).map_err(|_| CodecError::TooLarge { len: input_len })?;
        // SAFETY: plain value-in/value-out call.
        let bound = unsafe { (self.symbols.max_compressed_length)(src_sz) };
        Ok(bound as usize)
    }

    /// Allocate `size` bytes through `qzMalloc`.
    pub fn malloc(&self, size: usize, numa: bool, force_pinned: bool) -> Result<QzBuffer<'_>, CodecError> {
        const WHAT: &str = "qzMalloc buffer";
        if size == 0 {
            return Err(CodecError::OutOfMemory { what: WHAT });
        }
        // SAFETY: value-in call; the result is checked for NULL.
        let raw = unsafe { (self.symbols.malloc)(size, numa as i32, force_pinned as i32) };
        let ptr = NonNull::new(raw.cast::<u8>()).ok_or(CodecError::OutOfMemory { what: WHAT })?;
        // SAFETY: fresh allocation of `size` bytes from this library.
        Ok(unsafe { QzBuffer::from_qz_malloc(ptr, size, self) })
    }
}

#[cfg(unix)]
mod dynamic {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_void;

    use crate::error::LinkError;
    use crate::ffi::*;

    /// Text of the most recent loader failure.
    pub(super) fn last_error() -> String {
        // SAFETY: dlerror returns NULL or a NUL-terminated thread-local string.
        let err = unsafe { libc::dlerror() };
        if err.is_null() {
            "unknown error".to_owned()
        } else {
            unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
        }
    }

    unsafe fn lookup(handle: *mut c_void, symbol: &str) -> *mut c_void {
        let Ok(c_symbol) = CString::new(symbol) else {
            return std::ptr::null_mut();
        };
        libc::dlerror();
        libc::dlsym(handle, c_symbol.as_ptr())
    }

    macro_rules! bind {
        (required $handle:expr, $library:expr, $symbol:literal => $ty:ty) => {{
            let addr = lookup($handle, $symbol);
            if addr.is_null() {
                return Err(LinkError::MissingSymbol {
                    library: $library.to_owned(),
                    symbol: $symbol,
                });
            }
            std::mem::transmute::<*mut c_void, $ty>(addr)
        }};
        (optional $handle:expr, $symbol:literal => $ty:ty) => {{
            let addr = lookup($handle, $symbol);
            if addr.is_null() {
                None
            } else {
                Some(std::mem::transmute::<*mut c_void, $ty>(addr))
            }
        }};
    }

    /// Bind the required and optional entry points from `handle`.
    ///
    /// # Safety
    /// `handle` must be a live `dlopen` handle of a library exporting these
    /// names with the `qatzip.h` signatures.
    pub(super) unsafe fn resolve(handle: *mut c_void, library: &str) -> Result<QzSymbols, LinkError> {
        Ok(QzSymbols {
            compress: bind!(required handle, library, "qzCompress" => QzCompressFn),
            decompress: bind!(required handle, library, "qzDecompress" => QzDecompressFn),
            get_defaults: bind!(required handle, library, "qzGetDefaults" => QzGetDefaultsFn),
            set_defaults: bind!(required handle, library, "qzSetDefaults" => QzSetDefaultsFn),
            max_compressed_length: bind!(
                required handle, library, "qzMaxCompressedLength" => QzMaxCompressedLengthFn
            ),
            malloc: bind!(required handle, library, "qzMalloc" => QzMallocFn),
            free: bind!(optional handle, "qzFree" => QzFreeFn),
            teardown_session: bind!(optional handle, "qzTeardownSession" => QzTeardownSessionFn),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide library
// ─────────────────────────────────────────────────────────────────────────────

static LIBRARY: OnceLock<QzLibrary> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Load and bind libqatzip once per process.
///
/// Idempotent: after the first success every call returns the same library.
/// A failure is reported to the caller and leaves the process uninitialised,
/// so a later call may try again (for example after fixing the search path).
pub fn init() -> Result<&'static QzLibrary, LinkError> {
    init_from(&config::library_name())
}

/// [`init`] with an explicit library file name or path.
pub fn init_from(name: &str) -> Result<&'static QzLibrary, LinkError> {
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }
    let lib = QzLibrary::open(name)?;
    Ok(LIBRARY.get_or_init(|| lib))
}

/// Register an already-bound library as the process-wide one.
///
/// Returns the registered library, which is `lib` unless another library was
/// installed or loaded first.
pub fn install(lib: QzLibrary) -> &'static QzLibrary {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    LIBRARY.get_or_init(|| lib)
}

/// The process-wide library, or [`LinkError::NotInitialized`].
pub fn library() -> Result<&'static QzLibrary, LinkError> {
    LIBRARY.get().ok_or(LinkError::NotInitialized)
}

pub fn is_initialized() -> bool {
    LIBRARY.get().is_some()
}
