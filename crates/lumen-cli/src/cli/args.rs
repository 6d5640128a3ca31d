//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program image file (positional).
pub fn image_path_arg() -> Arg {
    Arg::new("image")
        .value_name("IMAGE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Program image file")
}

/// Skip CRC verification (--no-verify).
pub fn no_verify_arg() -> Arg {
    Arg::new("no_verify")
        .long("no-verify")
        .action(ArgAction::SetTrue)
        .help("Skip the image CRC check (trusted local files)")
}

/// Number of loop ticks to run (--ticks).
pub fn ticks_arg() -> Arg {
    Arg::new("ticks")
        .long("ticks")
        .value_name("N")
        .default_value("1")
        .value_parser(value_parser!(u32))
        .help("Loop ticks to run after init")
}

/// Pseudo-random seed override (--seed).
pub fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_name("SEED")
        .value_parser(value_parser!(u64))
        .help("Pseudo-random seed for reproducible runs (default: platform entropy)")
}

/// Include raw data memory in the output (--data).
pub fn data_arg() -> Arg {
    Arg::new("data")
        .long("data")
        .action(ArgAction::SetTrue)
        .help("Include data memory words in the output")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON (default: pretty)")
}
