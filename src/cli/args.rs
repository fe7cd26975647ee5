//! Command-line arguments for the `qatcodec` binary.
//!
//! Parsing goes through clap's derive API; [`parse_args_from`] is the
//! testable entry that never touches `std::env`.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use crate::config;

#[derive(Debug, Parser)]
#[command(
    name = "qatcodec",
    version,
    about = "Check for and drive Intel QuickAssist compression through libqatzip"
)]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', long = "quiet", action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// libqatzip file name or path [default: $QATCODEC_LIBRARY or the platform name]
    #[arg(long = "library", value_name = "PATH", global = true)]
    pub library: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report whether libqatzip can be loaded
    Check {
        /// Also run a small compress/decompress round trip
        #[arg(short = 'a', long = "all")]
        all: bool,
    },
    /// Compress a file into the block stream format
    Compress {
        #[command(flatten)]
        files: FileArgs,
        /// Process-wide compression level [default: $QATCODEC_CLEVEL or 1]
        #[arg(short = 'l', long = "level", allow_negative_numbers = true)]
        level: Option<i32>,
    },
    /// Decompress a block stream file
    Decompress {
        #[command(flatten)]
        files: FileArgs,
    },
}

#[derive(Debug, Args)]
pub struct FileArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Uncompressed bytes per block, with optional K/M suffix [default: $QATCODEC_BLOCK_SIZE or 256K]
    #[arg(short = 'B', long = "block-size", value_parser = parse_block_size)]
    pub block_size: Option<usize>,
}

/// clap value parser for `-B`.
pub fn parse_block_size(s: &str) -> Result<usize> {
    let size = config::parse_size(s).ok_or_else(|| anyhow!("invalid block size '{}'", s))?;
    if !(config::BLOCK_SIZE_MIN..=config::BLOCK_SIZE_MAX).contains(&size) {
        return Err(anyhow!(
            "block size {} outside {}..={}",
            size,
            config::BLOCK_SIZE_MIN,
            config::BLOCK_SIZE_MAX
        ));
    }
    Ok(size)
}

impl Cli {
    /// Display level after applying `-v` / `-q` to the default of 2.
    pub fn display_level(&self) -> u32 {
        (2 + self.verbose as i64 - self.quiet as i64).clamp(0, 4) as u32
    }

    /// Library to open: `--library`, then the environment, then the platform name.
    pub fn library_name(&self) -> String {
        match &self.library {
            Some(name) => name.clone(),
            None => config::library_name(),
        }
    }
}

/// Parse `std::env::args()`.
pub fn parse_args() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

/// Parse an explicit argument list; `argv[0]` is the program name.
pub fn parse_args_from<I, T>(argv: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(argv)
}
