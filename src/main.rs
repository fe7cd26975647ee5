//! Binary entry point for the `qatcodec` command-line tool.
//!
//! 1. [`parse_args`] turns `argv` into a [`qatcodec::cli::args::Cli`].
//! 2. [`run`] loads libqatzip as needed and dispatches the subcommand.
//!
//! Usage errors exit with clap's code (2); failures reported by `run` exit
//! with 1 after printing the error chain at display level 1.

use qatcodec::cli::args::parse_args;
use qatcodec::cli::run;
use qatcodec::display::display_level;

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            if display_level() >= 1 {
                qatcodec::display!("qatcodec: {:#}\n", e);
            }
            1
        }
    };
    std::process::exit(code);
}
