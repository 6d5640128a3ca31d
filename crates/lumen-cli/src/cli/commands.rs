//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("lumen")
        .about("Inspect and run lumen lighting program images")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(dump_command())
        .subcommand(run_command())
}

/// Validate a program image.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a program image")
        .after_help(
            r#"EXAMPLES:
  lumen check effect.fxb              # full validation, CRC included
  lumen check effect.fxb --no-verify  # skip the CRC check"#,
        )
        .arg(image_path_arg())
        .arg(no_verify_arg())
}

/// Print a human-readable image listing.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Print a human-readable image listing")
        .after_help(
            r#"EXAMPLES:
  lumen dump effect.fxb               # header, tables, disassembly"#,
        )
        .arg(image_path_arg())
        .arg(no_verify_arg())
}

/// Load an image and run it offline.
pub fn run_command() -> Command {
    Command::new("run")
        .about("Load an image, run init plus N loop ticks, print the results")
        .after_help(
            r#"EXAMPLES:
  lumen run effect.fxb --ticks 60           # one second at 60 ticks
  lumen run effect.fxb --seed 7 --compact   # reproducible, one-line JSON
  lumen run effect.fxb --data               # include raw data memory"#,
        )
        .arg(image_path_arg())
        .arg(no_verify_arg())
        .arg(ticks_arg())
        .arg(seed_arg())
        .arg(data_arg())
        .arg(compact_arg())
}
