//! Process-wide session defaults (`qzGetDefaults` / `qzSetDefaults`).
//!
//! libqatzip keeps one set of defaults per process; every session set up
//! afterwards picks them up. Changing them is a read-modify-write, so all
//! writers on a [`QzLibrary`] are serialised through its defaults lock and
//! the last configuration written is kept as a snapshot. Writers that bypass
//! this crate (another binding in the same process) can still race with it.
//!
//! Values are forwarded unvalidated; range checks are libqatzip's business
//! and surface as `QZ_PARAMS`.

use std::os::raw::c_uint;

use crate::error::{check_status, CodecError, Operation};
use crate::ffi::types::*;
use crate::ffi::QzSessionParams;
use crate::loader::QzLibrary;

/// Huffman header mode (`QzHuffmanHdr_T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanHeader {
    Dynamic,
    Static,
    Other(u32),
}

/// Which directions a session is set up for (`QzDirection_T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
    Both,
    Other(u32),
}

/// Output container format (`QzDataFormat_T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Deflate4B,
    Gzip,
    GzipExt,
    Raw,
    Other(u32),
}

impl From<c_uint> for HuffmanHeader {
    fn from(v: c_uint) -> Self {
        match v {
            QZ_DYNAMIC_HDR => HuffmanHeader::Dynamic,
            QZ_STATIC_HDR => HuffmanHeader::Static,
            other => HuffmanHeader::Other(other),
        }
    }
}

impl From<HuffmanHeader> for c_uint {
    fn from(v: HuffmanHeader) -> Self {
        match v {
            HuffmanHeader::Dynamic => QZ_DYNAMIC_HDR,
            HuffmanHeader::Static => QZ_STATIC_HDR,
            HuffmanHeader::Other(raw) => raw,
        }
    }
}

impl From<c_uint> for Direction {
    fn from(v: c_uint) -> Self {
        match v {
            QZ_DIR_COMPRESS => Direction::Compress,
            QZ_DIR_DECOMPRESS => Direction::Decompress,
            QZ_DIR_BOTH => Direction::Both,
            other => Direction::Other(other),
        }
    }
}

impl From<Direction> for c_uint {
    fn from(v: Direction) -> Self {
        match v {
            Direction::Compress => QZ_DIR_COMPRESS,
            Direction::Decompress => QZ_DIR_DECOMPRESS,
            Direction::Both => QZ_DIR_BOTH,
            Direction::Other(raw) => raw,
        }
    }
}

impl From<c_uint> for DataFormat {
    fn from(v: c_uint) -> Self {
        match v {
            QZ_DEFLATE_4B => DataFormat::Deflate4B,
            QZ_DEFLATE_GZIP => DataFormat::Gzip,
            QZ_DEFLATE_GZIP_EXT => DataFormat::GzipExt,
            QZ_DEFLATE_RAW => DataFormat::Raw,
            other => DataFormat::Other(other),
        }
    }
}

impl From<DataFormat> for c_uint {
    fn from(v: DataFormat) -> Self {
        match v {
            DataFormat::Deflate4B => QZ_DEFLATE_4B,
            DataFormat::Gzip => QZ_DEFLATE_GZIP,
            DataFormat::GzipExt => QZ_DEFLATE_GZIP_EXT,
            DataFormat::Raw => QZ_DEFLATE_RAW,
            DataFormat::Other(raw) => raw,
        }
    }
}

/// Typed view of `QzSessionParams_T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// `comp_lvl`. Signed so that out-of-range requests reach the library as-is.
    pub level: i32,
    pub huffman_header: HuffmanHeader,
    pub direction: Direction,
    pub data_format: DataFormat,
    pub algorithm: u8,
    pub poll_sleep: u32,
    pub max_forks: u32,
    /// Fall back to software deflate when no hardware instance is available.
    pub sw_backup: bool,
    pub hw_buffer_size: u32,
    pub stream_buffer_size: u32,
    pub input_size_threshold: u32,
    pub request_count_threshold: u32,
    pub wait_count_threshold: u32,
}

impl From<&QzSessionParams> for CodecConfig {
    fn from(p: &QzSessionParams) -> Self {
        CodecConfig {
            level: p.comp_lvl as i32,
            huffman_header: p.huffman_hdr.into(),
            direction: p.direction.into(),
            data_format: p.data_fmt.into(),
            algorithm: p.comp_algorithm,
            poll_sleep: p.poll_sleep,
            max_forks: p.max_forks,
            sw_backup: p.sw_backup != 0,
            hw_buffer_size: p.hw_buff_sz,
            stream_buffer_size: p.strm_buff_sz,
            input_size_threshold: p.input_sz_thrshold,
            request_count_threshold: p.req_cnt_thrshold,
            wait_count_threshold: p.wait_cnt_thrshold,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig::from(&QzSessionParams::library_defaults())
    }
}

impl CodecConfig {
    /// Overwrite the fields this view knows about, leaving the reserved tail intact.
    pub fn write_into(&self, p: &mut QzSessionParams) {
        p.comp_lvl = self.level as c_uint;
        p.huffman_hdr = self.huffman_header.into();
        p.direction = self.direction.into();
        p.data_fmt = self.data_format.into();
        p.comp_algorithm = self.algorithm;
        p.poll_sleep = self.poll_sleep;
        p.max_forks = self.max_forks;
        p.sw_backup = self.sw_backup as u8;
        p.hw_buff_sz = self.hw_buffer_size;
        p.strm_buff_sz = self.stream_buffer_size;
        p.input_sz_thrshold = self.input_size_threshold;
        p.req_cnt_thrshold = self.request_count_threshold;
        p.wait_cnt_thrshold = self.wait_count_threshold;
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }
}

impl QzLibrary {
    fn read_raw_defaults(&self) -> Result<QzSessionParams, CodecError> {
        let mut raw = QzSessionParams::library_defaults();
        // SAFETY: raw is a valid, writable QzSessionParams_T (plus reserved tail).
        let rc = unsafe { (self.symbols().get_defaults)(&mut raw) };
        check_status(Operation::GetDefaults, rc)?;
        Ok(raw)
    }

    /// Current process-wide defaults as reported by the library.
    pub fn defaults(&self) -> Result<CodecConfig, CodecError> {
        let _writer = self.defaults.lock().unwrap_or_else(|p| p.into_inner());
        self.read_raw_defaults().map(|raw| CodecConfig::from(&raw))
    }

    /// Read the defaults, let `f` edit them, and write them back, all under
    /// the single-writer lock. Returns the configuration written.
    pub fn update_defaults<F>(&self, f: F) -> Result<CodecConfig, CodecError>
    where
        F: FnOnce(&mut CodecConfig),
    {
        let mut applied = self.defaults.lock().unwrap_or_else(|p| p.into_inner());
        let mut raw = self.read_raw_defaults()?;
        let mut config = CodecConfig::from(&raw);
        f(&mut config);
        config.write_into(&mut raw);
        // SAFETY: raw is a valid QzSessionParams_T owned by this frame.
        let rc = unsafe { (self.symbols().set_defaults)(&mut raw) };
        check_status(Operation::SetDefaults, rc)?;
        *applied = Some(config);
        Ok(config)
    }

    /// Replace every known default with `config`.
    pub fn set_defaults(&self, config: &CodecConfig) -> Result<(), CodecError> {
        self.update_defaults(|c| *c = *config).map(|_| ())
    }

    /// Set the process-wide compression level. No range check is done here.
    pub fn set_compression_level(&self, level: i32) -> Result<(), CodecError> {
        self.update_defaults(|c| c.level = level).map(|_| ())
    }

    /// The last configuration successfully written through this library.
    pub fn applied_defaults(&self) -> Option<CodecConfig> {
        *self.defaults.lock().unwrap_or_else(|p| p.into_inner())
    }
}
