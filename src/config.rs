// config.rs: defaults and environment overrides.
//
// Every override has a testable `*_from(Option<&str>)` core so parsing can be
// exercised without touching the process environment. Unparsable values are
// ignored with a level-2 warning and the compiled default is used.

use crate::displaylevel;

/// File name handed to the platform loader when no override is present.
#[cfg(target_os = "macos")]
pub const QAT_LIBRARY_NAME: &str = "libqatzip.dylib";
#[cfg(not(target_os = "macos"))]
pub const QAT_LIBRARY_NAME: &str = "libqatzip.so";

/// Environment variable naming an alternate library file or absolute path.
pub const ENV_LIBRARY: &str = "QATCODEC_LIBRARY";
/// Environment variable overriding the default compression level.
pub const ENV_CLEVEL: &str = "QATCODEC_CLEVEL";
/// Environment variable overriding the stream block size.
pub const ENV_BLOCK_SIZE: &str = "QATCODEC_BLOCK_SIZE";

/// Default compression level, identical to libqatzip's own `comp_lvl` default.
pub const CLEVEL_DEFAULT: i32 = 1;

pub const KB: usize = 1 << 10;
pub const MB: usize = 1 << 20;

/// Default uncompressed block size for the block stream (256 KiB).
pub const BLOCK_SIZE_DEFAULT: usize = 256 * KB;
/// Smallest block size the block stream accepts.
pub const BLOCK_SIZE_MIN: usize = 32 * KB;
/// Largest block size; block lengths travel in 32-bit fields.
pub const BLOCK_SIZE_MAX: usize = 512 * MB;

/// Default alignment for [`crate::buffer::AlignedBuffer`].
pub const BUFFER_ALIGNMENT_DEFAULT: usize = 64;

/// How scratch buffers for the block stream are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBufferPrefs {
    /// Allocate through `qzMalloc` instead of the Rust heap.
    pub use_qz_malloc: bool,
    /// Ask `qzMalloc` for NUMA-local memory.
    pub numa: bool,
    /// Ask `qzMalloc` for pinned (DMA-able) memory.
    pub force_pinned: bool,
}

impl Default for NativeBufferPrefs {
    fn default() -> Self {
        NativeBufferPrefs { use_qz_malloc: false, numa: false, force_pinned: true }
    }
}

/// Parse a size with an optional `K`/`KB`/`KiB` or `M`/`MB`/`MiB` suffix.
///
/// Returns `None` when there are no leading digits, when anything follows the
/// suffix, or when the value overflows `usize`.
pub fn parse_size(s: &str) -> Option<usize> {
    let s = s.trim();
    let digits_end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    if digits_end == 0 {
        return None;
    }
    let value: usize = s[..digits_end].parse().ok()?;
    let shift = match &s[digits_end..] {
        "" => 0,
        "K" | "KB" | "KiB" => 10,
        "M" | "MB" | "MiB" => 20,
        _ => return None,
    };
    value.checked_mul(1usize << shift)
}

fn warn_ignored(var: &str, value: &str, why: &str) {
    displaylevel!(2, "Ignore environment variable setting {}={}: {} \n", var, value, why);
}

/// Library file name from `QATCODEC_LIBRARY`, or [`QAT_LIBRARY_NAME`].
pub fn library_name() -> String {
    library_name_from(std::env::var(ENV_LIBRARY).ok().as_deref())
}

/// Testable core of [`library_name`].
pub fn library_name_from(env_val: Option<&str>) -> String {
    match env_val.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => QAT_LIBRARY_NAME.to_owned(),
    }
}

/// Compression level from `QATCODEC_CLEVEL`, or [`CLEVEL_DEFAULT`].
pub fn init_c_level() -> i32 {
    init_c_level_from(std::env::var(ENV_CLEVEL).ok().as_deref())
}

/// Testable core of [`init_c_level`].
pub fn init_c_level_from(env_val: Option<&str>) -> i32 {
    if let Some(env) = env_val {
        match env.trim().parse::<i32>() {
            Ok(level) => return level,
            Err(_) => warn_ignored(ENV_CLEVEL, env, "not a valid integer"),
        }
    }
    CLEVEL_DEFAULT
}

/// Block size from `QATCODEC_BLOCK_SIZE`, or [`BLOCK_SIZE_DEFAULT`].
pub fn init_block_size() -> usize {
    init_block_size_from(std::env::var(ENV_BLOCK_SIZE).ok().as_deref())
}

/// Testable core of [`init_block_size`]. Out-of-range sizes are rejected, not clamped.
pub fn init_block_size_from(env_val: Option<&str>) -> usize {
    if let Some(env) = env_val {
        match parse_size(env) {
            Some(size) if (BLOCK_SIZE_MIN..=BLOCK_SIZE_MAX).contains(&size) => return size,
            Some(_) => warn_ignored(ENV_BLOCK_SIZE, env, "outside 32K..512M"),
            None => warn_ignored(ENV_BLOCK_SIZE, env, "not a valid size"),
        }
    }
    BLOCK_SIZE_DEFAULT
}
