// qatcodec: Intel QuickAssist compression through a dynamically loaded libqatzip

pub mod display;
pub mod config;
pub mod ffi;
pub mod error;
pub mod buffer;
pub mod loader;
pub mod params;
pub mod session;
pub mod api;
pub mod stream;
pub mod parallel;
pub mod file;
pub mod cli;

#[cfg(feature = "c-abi")]
pub mod abi;

// ── Version constants ─────────────────────────────────────────────────────────
pub const QATCODEC_VERSION_MAJOR: u32 = 0;
pub const QATCODEC_VERSION_MINOR: u32 = 1;
pub const QATCODEC_VERSION_RELEASE: u32 = 0;
pub const QATCODEC_VERSION_NUMBER: u32 =
    QATCODEC_VERSION_MAJOR * 100 * 100 + QATCODEC_VERSION_MINOR * 100 + QATCODEC_VERSION_RELEASE;
pub const QATCODEC_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

pub fn version_number() -> u32 {
    QATCODEC_VERSION_NUMBER
}

pub fn version_string() -> &'static str {
    QATCODEC_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use buffer::{AlignedBuffer, BufferView, BufferViewMut, QzBuffer};
pub use config::NativeBufferPrefs;
pub use error::{CodecError, LinkError, Operation, QatError};
pub use loader::{init, init_from, install, is_initialized, library, QzLibrary};
pub use params::CodecConfig;
pub use session::Session;
pub use stream::{BlockReader, BlockWriter, StreamOptions};
