//! Command-line interface for the `qatcodec` binary.
//!
//! | Submodule | Responsibility |
//! |-----------|----------------|
//! | [`args`]  | clap definitions, verbosity and library-name resolution. |
//! | [`check`] | The `check` subcommand (library availability report). |
//!
//! [`run`] dispatches a parsed [`args::Cli`] and returns the process exit code.

pub mod args;
pub mod check;

use anyhow::{Context, Result};

use crate::config;
use crate::display::set_display_level;
use crate::{displaylevel, displayout};
use crate::file::{compress_file, decompress_file, FileOptions};
use crate::loader;
use crate::stream::StreamOptions;

use args::{Cli, Command, FileArgs};

fn stream_options(files: &FileArgs) -> StreamOptions {
    let opts = StreamOptions::from_env();
    match files.block_size {
        Some(block_size) => opts.with_block_size(block_size),
        None => opts,
    }
}

/// Execute the selected subcommand. `Ok(code)` is the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    set_display_level(cli.display_level());
    let library = cli.library_name();

    match cli.command {
        Command::Check { all } => {
            let report = check::check_library(&library, all);
            displayout!("{}", report.render());
            if let Some(e) = &report.link_error {
                displaylevel!(3, "{}\n", e);
            }
            Ok(if report.passed() { 0 } else { 1 })
        }
        Command::Compress { files, level } => {
            let lib = loader::init_from(&library)?;
            let opts = FileOptions {
                stream: stream_options(&files),
                level: Some(level.unwrap_or_else(config::init_c_level)),
            };
            displaylevel!(3, "Using {} (block size {})\n", lib.library_path(), opts.stream.block_size);
            compress_file(lib, &files.input, &files.output, &opts).with_context(|| {
                format!("{} -> {}", files.input.display(), files.output.display())
            })?;
            Ok(0)
        }
        Command::Decompress { files } => {
            let lib = loader::init_from(&library)?;
            let opts = FileOptions { stream: stream_options(&files), level: None };
            decompress_file(lib, &files.input, &files.output, &opts).with_context(|| {
                format!("{} -> {}", files.input.display(), files.output.display())
            })?;
            Ok(0)
        }
    }
}
